//! Bulk spreadsheet import/export.
//!
//! Upload sends a file as multipart with progress reports; download fetches
//! the export, picks a file name from `Content-Disposition` (or the
//! resource default) and hands the bytes to a [`FileSink`]. A failed
//! download never leaves a partial file.

mod content_disposition;
mod sanitize;
mod sink;

pub use content_disposition::suggested_file_name;
pub use sanitize::safe_file_name;
pub use sink::{DirectorySink, FileSink};

use crate::error::{FailureKind, RequestFailed};
use crate::page::FilterSet;
use crate::resource::{Operation, Resource, ResourceApi, ResourceClient};
use crate::transport::{FilePart, FormPart, HttpRequest, Method, ProgressFn, RequestBody};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Pending,
    Success,
    Failure,
}

/// Snapshot of an in-flight transfer. Observers receive one per change;
/// the last one they see has a settled status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub resource: Resource,
    pub direction: Direction,
    pub progress_percent: u8,
    pub status: TransferStatus,
}

pub trait TransferObserver: Send + Sync {
    fn update(&self, job: &TransferJob);
}

impl<F> TransferObserver for F
where
    F: Fn(&TransferJob) + Send + Sync,
{
    fn update(&self, job: &TransferJob) {
        self(job)
    }
}

/// Owns the job snapshot for one transfer and forwards changes.
struct Tracker {
    job: Mutex<TransferJob>,
    observer: Option<Arc<dyn TransferObserver>>,
}

impl Tracker {
    fn start(
        resource: Resource,
        direction: Direction,
        observer: Option<Arc<dyn TransferObserver>>,
    ) -> Arc<Self> {
        let tracker = Arc::new(Self {
            job: Mutex::new(TransferJob {
                resource,
                direction,
                progress_percent: 0,
                status: TransferStatus::Pending,
            }),
            observer,
        });
        tracker.notify(|_| {});
        tracker
    }

    fn notify(&self, change: impl FnOnce(&mut TransferJob)) {
        let snapshot = match self.job.lock() {
            Ok(mut job) => {
                change(&mut job);
                job.clone()
            }
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(observer) = &self.observer {
            observer.update(&snapshot);
        }
    }

    fn progress(&self, percent: u8) {
        self.notify(|job| job.progress_percent = percent.min(100));
    }

    fn settle<T, E>(&self, result: &Result<T, E>) {
        self.notify(|job| {
            job.status = if result.is_ok() {
                job.progress_percent = 100;
                TransferStatus::Success
            } else {
                TransferStatus::Failure
            };
        });
    }
}

/// What the backend reports after a bulk import. Unknown shapes still
/// surface through `raw`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadSummary {
    pub message: Option<String>,
    pub created: Option<u64>,
    pub updated: Option<u64>,
    pub failed: Option<u64>,
    pub errors: Vec<String>,
    pub raw: Value,
}

impl UploadSummary {
    pub fn from_value(raw: Value) -> Self {
        let count = |keys: &[&str]| keys.iter().find_map(|k| raw.get(*k).and_then(Value::as_u64));
        let errors = raw
            .get("errors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|e| match e {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            message: raw.get("message").and_then(Value::as_str).map(str::to_string),
            created: count(&["created", "created_count", "inserted"]),
            updated: count(&["updated", "updated_count"]),
            failed: count(&["failed", "failed_count", "error_count"]),
            errors,
            raw,
        }
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("Upload complete"))?;
        let counts: Vec<String> = [
            ("created", self.created),
            ("updated", self.updated),
            ("failed", self.failed),
        ]
        .iter()
        .filter_map(|(label, n)| n.map(|n| format!("{n} {label}")))
        .collect();
        if !counts.is_empty() {
            write!(f, " ({})", counts.join(", "))?;
        }
        for e in &self.errors {
            write!(f, "\n  - {e}")?;
        }
        Ok(())
    }
}

/// Where a download ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: u64,
}

/// Reads a spreadsheet into the `file` part of a bulk upload.
pub fn spreadsheet_part(path: &Path) -> std::io::Result<FilePart> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.xlsx".to_string());
    Ok(FilePart {
        field: "file".to_string(),
        file_name,
        content_type: Some(SPREADSHEET_CONTENT_TYPE.to_string()),
        bytes,
    })
}

/// Name to save an export under: the server's suggestion when usable,
/// else the resource default.
pub fn export_file_name(resource: Resource, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(suggested_file_name)
        .and_then(|n| safe_file_name(&n))
        .unwrap_or_else(|| resource.default_export_name().to_string())
}

impl ResourceClient {
    /// Posts `file` to the bulk-upload endpoint as the `file` part.
    pub fn upload_bulk(
        &self,
        mut file: FilePart,
        observer: Option<Arc<dyn TransferObserver>>,
    ) -> Result<UploadSummary, RequestFailed> {
        let resource = self.resource();
        let tracker = Tracker::start(resource, Direction::Upload, observer);
        file.field = "file".to_string();
        tracing::info!(
            "uploading {} ({} bytes) to {}",
            file.file_name,
            file.bytes.len(),
            resource
        );
        let progress: ProgressFn = {
            let tracker = Arc::clone(&tracker);
            Arc::new(move |pct| tracker.progress(pct))
        };
        let request = HttpRequest::new(Method::Post, self.endpoints().bulk_upload(resource))
            .with_body(RequestBody::Multipart(vec![FormPart::File(file)]))
            .with_progress(Some(progress));
        let result = self
            .execute_json(request, Operation::Upload)
            .map(UploadSummary::from_value);
        tracker.settle(&result);
        result
    }

    /// Fetches the export for `filters` and saves it through `sink`.
    pub fn download_bulk(
        &self,
        filters: &FilterSet,
        sink: &dyn FileSink,
        observer: Option<Arc<dyn TransferObserver>>,
    ) -> Result<SavedFile, RequestFailed> {
        let resource = self.resource();
        let tracker = Tracker::start(resource, Direction::Download, observer);
        let result = self.fetch_and_save(resource, filters, sink);
        tracker.settle(&result);
        result
    }

    fn fetch_and_save(
        &self,
        resource: Resource,
        filters: &FilterSet,
        sink: &dyn FileSink,
    ) -> Result<SavedFile, RequestFailed> {
        let url = self.endpoints().export(resource, filters);
        let response = self.execute(HttpRequest::new(Method::Get, url).binary(), Operation::Download)?;
        let file_name = export_file_name(resource, response.header("content-disposition"));
        let path = sink.save(&file_name, &response.body).map_err(|e| {
            tracing::warn!("saving {} failed: {}", file_name, e);
            RequestFailed::new(FailureKind::Save, resource.fallback(Operation::Download))
        })?;
        tracing::info!("saved {} export to {}", resource, path.display());
        Ok(SavedFile {
            path,
            file_name,
            bytes: response.body.len() as u64,
        })
    }
}
