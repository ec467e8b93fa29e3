//! In-memory transport for unit tests.

use crate::transport::{
    HeaderMap, HttpRequest, HttpResponse, Method, RequestBody, Transport, TransportError,
};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
    pub expect_binary: bool,
}

/// Replays queued responses in order and records every request.
/// Requests with an upload progress callback see 50% then 100%.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u32, body: serde_json::Value) {
        self.push_response(HttpResponse {
            status,
            headers: HeaderMap::default(),
            body: serde_json::to_vec(&body).unwrap(),
        });
    }

    pub fn push_raw(&self, status: u32, body: &str) {
        self.push_response(HttpResponse {
            status,
            headers: HeaderMap::default(),
            body: body.as_bytes().to_vec(),
        });
    }

    pub fn push_file(&self, content_disposition: Option<&str>, bytes: &[u8]) {
        let mut headers = HeaderMap::default();
        headers.insert("Content-Type", "application/octet-stream");
        if let Some(cd) = content_disposition {
            headers.insert("Content-Disposition", cd);
        }
        self.push_response(HttpResponse {
            status: 200,
            headers,
            body: bytes.to_vec(),
        });
    }

    pub fn push_transport_error(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::InvalidRequest(
                "connection refused".to_string(),
            )));
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Some(progress) = request.upload_progress.as_ref() {
            progress(50);
            progress(100);
        }
        self.sent.lock().unwrap().push(SentRequest {
            method: request.method,
            url: request.url.to_string(),
            body: request.body,
            expect_binary: request.expect_binary,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no response queued for {} {}", request.method, request.url))
    }
}

use crate::error::{FailureKind, RequestFailed};
use crate::page::{PageRequest, PageResult};
use crate::resource::{Payload, RecordId, Resource, ResourceApi, ResourceRecord};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// In-memory resource: `name` filter is a case-insensitive substring match.
pub(crate) struct MemoryApi {
    resource: Resource,
    records: Mutex<Vec<ResourceRecord>>,
    fail_next: Mutex<Option<RequestFailed>>,
    /// Largest page the backend serves; 0 means no cap.
    max_page_size: AtomicU32,
    pub list_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub created: Mutex<Vec<Payload>>,
    pub updated: Mutex<Vec<(RecordId, Payload)>>,
}

impl MemoryApi {
    pub fn with_names(resource: Resource, names: &[&str]) -> Self {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                ResourceRecord::from_value(serde_json::json!({"id": i as i64 + 1, "name": n}))
                    .unwrap()
            })
            .collect();
        Self {
            resource,
            records: Mutex::new(records),
            fail_next: Mutex::new(None),
            max_page_size: AtomicU32::new(0),
            list_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
        }
    }

    pub fn numbered(resource: Resource, count: usize) -> Self {
        let names: Vec<String> = (1..=count).map(|i| format!("Item {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::with_names(resource, &refs)
    }

    pub fn insert(&self, value: serde_json::Value) {
        self.records
            .lock()
            .unwrap()
            .push(ResourceRecord::from_value(value).unwrap());
    }

    /// The next call of any kind fails with this backend message.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(RequestFailed::new(
            FailureKind::Backend { status: 400 },
            message,
        ));
    }

    pub fn cap_page_size(&self, max: u32) {
        self.max_page_size.store(max, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn take_failure(&self) -> Result<(), RequestFailed> {
        match self.fail_next.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ResourceApi for MemoryApi {
    fn resource(&self) -> Resource {
        self.resource
    }

    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let needle = request
            .filters
            .active()
            .find(|(k, _)| *k == "name")
            .map(|(_, v)| v.to_lowercase());
        let all: Vec<ResourceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| match &needle {
                Some(n) => r.display("name").to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();
        let cap = self.max_page_size.load(Ordering::SeqCst);
        let page_size = if cap > 0 { request.page_size.min(cap) } else { request.page_size };
        let size = page_size as usize;
        let items = all
            .iter()
            .skip((request.page as usize - 1) * size)
            .take(size)
            .cloned()
            .collect();
        Ok(PageResult {
            items,
            current_page: request.page,
            page_size,
            total_count: all.len() as u64,
        })
    }

    fn get_by_id(&self, id: &RecordId) -> Result<ResourceRecord, RequestFailed> {
        self.take_failure()?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| {
                RequestFailed::new(FailureKind::Backend { status: 404 }, "Not found")
            })
    }

    fn create(&self, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        self.take_failure()?;
        self.created.lock().unwrap().push(payload);
        let id = self.len() as i64 + 100;
        Ok(ResourceRecord::from_value(serde_json::json!({"id": id})).unwrap())
    }

    fn update(&self, id: &RecordId, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        self.take_failure()?;
        self.updated.lock().unwrap().push((id.clone(), payload));
        self.get_by_id(id)
    }

    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.records.lock().unwrap().retain(|r| &r.id != id);
        Ok(())
    }
}
