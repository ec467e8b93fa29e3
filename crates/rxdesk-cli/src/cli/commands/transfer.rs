//! `rxdesk upload` and `rxdesk download`.

use super::parse_filters;
use anyhow::{Context, Result};
use rxdesk_core::resource::{Backend, Resource};
use rxdesk_core::transfer::{
    spreadsheet_part, DirectorySink, TransferJob, TransferObserver, TransferStatus,
};
use rxdesk_core::transport::run_blocking;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

fn progress_printer(label: &'static str) -> Arc<dyn TransferObserver> {
    Arc::new(move |job: &TransferJob| {
        let mut err = std::io::stderr().lock();
        match job.status {
            TransferStatus::Pending => {
                let _ = write!(err, "\r{} {}: {:>3}%", label, job.resource.plural(), job.progress_percent);
            }
            TransferStatus::Success | TransferStatus::Failure => {
                let _ = writeln!(err);
            }
        }
        let _ = err.flush();
    })
}

pub async fn run_upload(backend: &Backend, resource: Resource, path: &Path) -> Result<()> {
    let part = spreadsheet_part(path).with_context(|| format!("reading {}", path.display()))?;
    let client = backend.client(resource);
    let observer = progress_printer("Uploading");
    let summary = run_blocking(move || client.upload_bulk(part, Some(observer))).await??;
    println!("{summary}");
    Ok(())
}

pub async fn run_download(
    backend: &Backend,
    resource: Resource,
    filters: &[String],
    dir: &Path,
) -> Result<()> {
    let filters = parse_filters(resource, filters)?;
    let client = backend.client(resource);
    let sink = DirectorySink::new(dir);
    let saved = run_blocking(move || client.download_bulk(&filters, &sink, None)).await??;
    println!("Saved {} ({} bytes)", saved.path.display(), saved.bytes);
    Ok(())
}
