//! CLI for the RxDesk back office.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rxdesk_core::config;
use rxdesk_core::purchase::LineItem;
use rxdesk_core::resource::{Backend, RecordId, Resource};
use std::path::PathBuf;

use commands::{
    run_browse, run_create, run_delete, run_download, run_get, run_list, run_purchase,
    run_update, run_upload, PurchaseArgs,
};

/// Top-level CLI for the RxDesk back office.
#[derive(Debug, Parser)]
#[command(name = "rxdesk")]
#[command(about = "RxDesk: pharmacy back-office console", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show one page of a resource.
    List {
        /// supplier, drug, manufacturer, storage, threshold or transaction.
        resource: Resource,
        #[arg(long, default_value = "1", value_name = "N")]
        page: u32,
        /// Rows per page (default from config).
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
        /// Filter as key=value; repeatable. Empty values are ignored.
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Show a single record as JSON.
    Get { resource: Resource, id: RecordId },

    /// Create a record from a JSON object.
    Create {
        resource: Resource,
        /// JSON file with the field values, or `-` for stdin.
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
        /// Attach a file to a file field as field=path; repeatable.
        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attachments: Vec<String>,
    },

    /// Update a record; fields not given keep their current values.
    Update {
        resource: Resource,
        id: RecordId,
        #[arg(long, value_name = "FILE")]
        json: PathBuf,
        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attachments: Vec<String>,
    },

    /// Delete a record after two confirmations.
    Delete {
        resource: Resource,
        id: RecordId,
        /// Skip both confirmation prompts.
        #[arg(long)]
        yes: bool,
    },

    /// Bulk-import a spreadsheet.
    Upload { resource: Resource, path: PathBuf },

    /// Export a resource to a spreadsheet.
    Download {
        resource: Resource,
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
        /// Target directory (default: config download_dir, else current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Interactive pager with filters and delete.
    Browse {
        resource: Resource,
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
    },

    /// Enter a purchase without a purchase order.
    Purchase {
        /// Supplier id.
        #[arg(long)]
        supplier: String,
        #[arg(long = "invoice", value_name = "NUMBER")]
        invoice_number: String,
        /// Invoice date, YYYY-MM-DD.
        #[arg(long = "date", value_name = "DATE")]
        invoice_date: String,
        /// cash, credit or cheque.
        #[arg(long)]
        payment_mode: Option<String>,
        /// Required when paying by cheque.
        #[arg(long)]
        cheque_number: Option<String>,
        /// Line as drug:batch:qty:rate[:discount[:gst]]; repeatable.
        #[arg(long = "item", value_name = "LINE", required = true)]
        items: Vec<LineItem>,
        /// Submit without asking.
        #[arg(long)]
        yes: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let backend = Backend::from_config(&cfg)?;
        let default_size = cfg.default_page_size;

        match cli.command {
            CliCommand::List {
                resource,
                page,
                page_size,
                filters,
            } => {
                let size = page_size.unwrap_or(default_size);
                run_list(&backend, resource, page, size, &filters).await?
            }
            CliCommand::Get { resource, id } => run_get(&backend, resource, id).await?,
            CliCommand::Create {
                resource,
                json,
                attachments,
            } => run_create(&backend, resource, &json, &attachments).await?,
            CliCommand::Update {
                resource,
                id,
                json,
                attachments,
            } => run_update(&backend, resource, id, &json, &attachments).await?,
            CliCommand::Delete { resource, id, yes } => {
                run_delete(&backend, resource, id, yes).await?
            }
            CliCommand::Upload { resource, path } => run_upload(&backend, resource, &path).await?,
            CliCommand::Download {
                resource,
                filters,
                dir,
            } => {
                let dir = match dir.or_else(|| cfg.download_dir.clone()) {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                run_download(&backend, resource, &filters, &dir).await?
            }
            CliCommand::Browse {
                resource,
                page_size,
            } => run_browse(&backend, resource, page_size.unwrap_or(default_size)).await?,
            CliCommand::Purchase {
                supplier,
                invoice_number,
                invoice_date,
                payment_mode,
                cheque_number,
                items,
                yes,
            } => {
                let args = PurchaseArgs {
                    supplier,
                    invoice_number,
                    invoice_date,
                    payment_mode,
                    cheque_number,
                    items,
                    yes,
                };
                run_purchase(&backend, args).await?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
