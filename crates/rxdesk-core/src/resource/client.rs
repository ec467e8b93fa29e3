//! Per-resource REST client.

use super::{Endpoints, Operation, Payload, RecordId, Resource, ResourceRecord};
use crate::config::RxdeskConfig;
use crate::error::RequestFailed;
use crate::page::{normalize_page_result, PageRequest, PageResult};
use crate::transport::{CurlOptions, CurlTransport, HttpRequest, HttpResponse, Method, Transport};
use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;

/// CRUD contract every resource offers. List and form controllers are
/// written against this trait so one controller type serves all resources.
pub trait ResourceApi: Send + Sync {
    fn resource(&self) -> Resource;
    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed>;
    fn get_by_id(&self, id: &RecordId) -> Result<ResourceRecord, RequestFailed>;
    fn create(&self, payload: Payload) -> Result<ResourceRecord, RequestFailed>;
    fn update(&self, id: &RecordId, payload: Payload) -> Result<ResourceRecord, RequestFailed>;
    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed>;
}

impl<T: ResourceApi + ?Sized> ResourceApi for &T {
    fn resource(&self) -> Resource {
        (**self).resource()
    }
    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed> {
        (**self).list(request)
    }
    fn get_by_id(&self, id: &RecordId) -> Result<ResourceRecord, RequestFailed> {
        (**self).get_by_id(id)
    }
    fn create(&self, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        (**self).create(payload)
    }
    fn update(&self, id: &RecordId, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        (**self).update(id, payload)
    }
    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed> {
        (**self).remove(id)
    }
}

impl<T: ResourceApi + ?Sized> ResourceApi for Arc<T> {
    fn resource(&self) -> Resource {
        (**self).resource()
    }
    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed> {
        (**self).list(request)
    }
    fn get_by_id(&self, id: &RecordId) -> Result<ResourceRecord, RequestFailed> {
        (**self).get_by_id(id)
    }
    fn create(&self, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        (**self).create(payload)
    }
    fn update(&self, id: &RecordId, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        (**self).update(id, payload)
    }
    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed> {
        (**self).remove(id)
    }
}

/// Shared endpoint set and transport; hands out one client per resource.
#[derive(Clone)]
pub struct Backend {
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
}

impl Backend {
    pub fn new(endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints,
            transport,
        }
    }

    /// Curl transport configured from timeouts and extra headers in `cfg`.
    pub fn from_config(cfg: &RxdeskConfig) -> anyhow::Result<Self> {
        let endpoints = Endpoints::new(&cfg.base_url)
            .with_context(|| format!("invalid base_url: {}", cfg.base_url))?;
        let mut transport = CurlTransport::new(CurlOptions {
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.request_timeout(),
        });
        for (name, value) in &cfg.headers {
            transport = transport.with_header(name, value);
        }
        Ok(Self::new(endpoints, Arc::new(transport)))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn client(&self, resource: Resource) -> ResourceClient {
        ResourceClient {
            resource,
            endpoints: self.endpoints.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

/// Request builder for one REST resource. Every failure comes back as
/// [`RequestFailed`] with a display-ready message.
#[derive(Clone)]
pub struct ResourceClient {
    resource: Resource,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &self.resource)
            .field("base", &self.endpoints.base())
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Sends `request`; transport errors and non-2xx statuses become [`RequestFailed`].
    pub(crate) fn execute(
        &self,
        request: HttpRequest,
        op: Operation,
    ) -> Result<HttpResponse, RequestFailed> {
        let fallback = self.resource.fallback(op);
        tracing::debug!("{} {} ({:?} {})", request.method, request.url, op, self.resource);
        let response = self
            .transport
            .send(request)
            .map_err(|e| RequestFailed::transport(&e, &fallback))?;
        if !response.is_success() {
            return Err(RequestFailed::rejected(&response, &fallback));
        }
        Ok(response)
    }

    pub(crate) fn execute_json(
        &self,
        request: HttpRequest,
        op: Operation,
    ) -> Result<Value, RequestFailed> {
        let response = self.execute(request, op)?;
        response
            .json()
            .map_err(|e| RequestFailed::decode(&self.resource.fallback(op), e))
    }

    fn record(&self, value: Value, op: Operation) -> Result<ResourceRecord, RequestFailed> {
        ResourceRecord::from_response(value)
            .map_err(|e| RequestFailed::decode(&self.resource.fallback(op), e))
    }
}

impl ResourceApi for ResourceClient {
    fn resource(&self) -> Resource {
        self.resource
    }

    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed> {
        let url = self.endpoints.list(self.resource, request);
        let value = self.execute_json(HttpRequest::new(Method::Get, url), Operation::List)?;
        normalize_page_result(value, request)
            .map_err(|e| RequestFailed::decode(&self.resource.fallback(Operation::List), e))
    }

    fn get_by_id(&self, id: &RecordId) -> Result<ResourceRecord, RequestFailed> {
        let url = self.endpoints.item(self.resource, id);
        let value = self.execute_json(HttpRequest::new(Method::Get, url), Operation::Get)?;
        self.record(value, Operation::Get)
    }

    fn create(&self, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        let url = self.endpoints.collection(self.resource);
        let request = HttpRequest::new(Method::Post, url).with_body(payload.into_body());
        let value = self.execute_json(request, Operation::Create)?;
        self.record(value, Operation::Create)
    }

    /// Backends that answer an update with only a message get the id patched in.
    fn update(&self, id: &RecordId, payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        let url = self.endpoints.item(self.resource, id);
        let request = HttpRequest::new(Method::Put, url).with_body(payload.into_body());
        let mut value = self.execute_json(request, Operation::Update)?;
        if let Some(target) = record_object(&mut value) {
            if !target.contains_key("id") && !target.contains_key("_id") && !target.contains_key("pk") {
                target.insert("id".to_string(), serde_json::to_value(id).unwrap_or(Value::Null));
            }
        }
        self.record(value, Operation::Update)
    }

    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed> {
        let url = self.endpoints.item(self.resource, id);
        self.execute(HttpRequest::new(Method::Delete, url), Operation::Delete)?;
        tracing::info!("deleted {} {}", self.resource, id);
        Ok(())
    }
}

/// The object that holds the record: `data` when it is an object, else the body.
fn record_object(value: &mut Value) -> Option<&mut serde_json::Map<String, Value>> {
    let has_data_object = matches!(value.get("data"), Some(Value::Object(_)));
    let obj = value.as_object_mut()?;
    if has_data_object {
        obj.get_mut("data").and_then(Value::as_object_mut)
    } else {
        Some(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::page::FilterSet;
    use crate::test_support::FakeTransport;
    use serde_json::json;

    fn client(fake: &Arc<FakeTransport>, resource: Resource) -> ResourceClient {
        Backend::new(Endpoints::new("http://api.test").unwrap(), fake.clone()).client(resource)
    }

    #[test]
    fn list_with_filters_normalizes_data_envelope() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(200, json!({
            "data": [{"id": 1, "name": "ABC One"}, {"id": 2, "name": "ABC Two"}, {"id": 3, "name": "ABC Three"}],
            "total_items": 3
        }));
        let mut filters = FilterSet::new();
        filters.set("name", "ABC");
        let req = PageRequest::new(1, 10).with_filters(filters);
        let page = client(&fake, Resource::Supplier).list(&req).unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages(), 1);
        let sent = fake.requests();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(
            sent[0].url,
            "http://api.test/api/suppliers/?page=1&page_size=10&name=ABC"
        );
    }

    #[test]
    fn list_failure_uses_message_or_fallback() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(403, json!({"message": "Not allowed"}));
        fake.push_raw(502, "Bad Gateway");
        fake.push_transport_error();
        let c = client(&fake, Resource::Drug);
        let req = PageRequest::new(1, 10);
        assert_eq!(c.list(&req).unwrap_err().message, "Not allowed");
        let err = c.list(&req).unwrap_err();
        assert_eq!(err.message, "Failed to fetch drugs");
        assert_eq!(err.kind, FailureKind::Backend { status: 502 });
        let err = c.list(&req).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.message, "Failed to fetch drugs");
    }

    #[test]
    fn malformed_list_body_is_decode_failure() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(200, json!({"rows": []}));
        let err = client(&fake, Resource::Manufacturer)
            .list(&PageRequest::new(1, 10))
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert_eq!(err.message, "Failed to fetch manufacturers");
    }

    #[test]
    fn crud_urls_and_methods() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(200, json!({"id": 4, "name": "Cold Room"}));
        fake.push_json(201, json!({"message": "created", "data": {"id": 5, "name": "Shelf"}}));
        fake.push_json(200, json!({"message": "updated"}));
        fake.push_raw(204, "");
        let c = client(&fake, Resource::Storage);
        assert_eq!(c.get_by_id(&RecordId::Int(4)).unwrap().display("name"), "Cold Room");
        let created = c
            .create(Payload::Json(json!({"name": "Shelf"}).as_object().cloned().unwrap()))
            .unwrap();
        assert_eq!(created.id, RecordId::Int(5));
        let updated = c
            .update(
                &RecordId::Int(5),
                Payload::Json(json!({"name": "Shelf A"}).as_object().cloned().unwrap()),
            )
            .unwrap();
        assert_eq!(updated.id, RecordId::Int(5));
        c.remove(&RecordId::Int(5)).unwrap();

        let sent = fake.requests();
        let summary: Vec<(Method, &str)> =
            sent.iter().map(|r| (r.method, r.url.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Method::Get, "http://api.test/api/storage/?id=4"),
                (Method::Post, "http://api.test/api/storage/"),
                (Method::Put, "http://api.test/api/storage/?id=5"),
                (Method::Delete, "http://api.test/api/storage/?id=5"),
            ]
        );
    }

    #[test]
    fn create_without_record_is_decode_failure() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(201, json!({"message": "created"}));
        let err = client(&fake, Resource::Threshold)
            .create(Payload::Json(Default::default()))
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert_eq!(err.message, "Failed to create threshold");
    }

    #[test]
    fn remove_rejection_message() {
        let fake = Arc::new(FakeTransport::new());
        fake.push_json(409, json!({"message": "Drug is referenced by transactions"}));
        let err = client(&fake, Resource::Drug).remove(&RecordId::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Drug is referenced by transactions");
    }
}
