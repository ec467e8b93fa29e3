//! CLI command handlers. Network calls run on the blocking pool.

mod browse;
mod delete;
mod edit;
mod list;
mod prompt;
mod purchase;
mod table;
mod transfer;

pub use browse::run_browse;
pub use delete::run_delete;
pub use edit::{run_create, run_update};
pub use list::{run_get, run_list};
pub use purchase::{run_purchase, PurchaseArgs};
pub use transfer::{run_download, run_upload};

#[cfg(test)]
pub(crate) use browse::browse_loop;

use anyhow::{Context, Result};
use rxdesk_core::notice::Notice;
use rxdesk_core::page::FilterSet;
use rxdesk_core::resource::Resource;

/// `key=value` flags to a filter set. Keys the resource does not list are
/// passed through with a warning.
pub(crate) fn parse_filters(resource: Resource, raw: &[String]) -> Result<FilterSet> {
    let filters = FilterSet::from_assignments(raw).context("invalid --filter")?;
    for (key, _) in filters.active() {
        if !resource.known_filters().contains(&key) {
            tracing::warn!("{} is not a known {} filter; sending it anyway", key, resource);
        }
    }
    Ok(filters)
}

pub(crate) fn print_notices(notices: Vec<Notice>) {
    for n in notices {
        if n.is_failure() {
            eprintln!("{n}");
        } else {
            println!("{n}");
        }
    }
}
