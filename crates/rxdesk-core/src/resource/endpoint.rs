//! Endpoint composition: `<base>/api/<resource>/` plus query strings.

use super::{RecordId, Resource};
use crate::page::{FilterSet, PageRequest};
use url::Url;

/// Builds every URL the console calls from one configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// `base` may carry a path prefix (`https://host/erp`) and a trailing slash.
    /// Any query or fragment on it is dropped.
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        let mut parsed = Url::parse(base.trim())?;
        if parsed.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        parsed.set_query(None);
        parsed.set_fragment(None);
        Ok(Self { base: parsed })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    fn build(&self, resource: Resource, extra: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("api")
                .push(resource.path_segment());
            if let Some(extra) = extra {
                segments.push(extra);
            }
            segments.push("");
        }
        url
    }

    pub fn collection(&self, resource: Resource) -> Url {
        self.build(resource, None)
    }

    pub fn bulk_upload(&self, resource: Resource) -> Url {
        self.build(resource, Some("bulk-upload"))
    }

    /// Export endpoint with the applied filters; empty filter values are omitted.
    pub fn export(&self, resource: Resource, filters: &FilterSet) -> Url {
        let mut url = self.build(resource, Some("export"));
        append_filters(&mut url, filters);
        url
    }

    /// List endpoint: page, page size (resource-specific name) and active filters.
    pub fn list(&self, resource: Resource, request: &PageRequest) -> Url {
        let mut url = self.collection(resource);
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair(resource.page_size_param(), &request.page_size.to_string());
        append_filters(&mut url, &request.filters);
        url
    }

    /// Single-record endpoint: collection URL with the id as a query parameter.
    pub fn item(&self, resource: Resource, id: &RecordId) -> Url {
        let mut url = self.collection(resource);
        url.query_pairs_mut()
            .append_pair(resource.id_param(), &id.to_string());
        url
    }
}

fn append_filters(url: &mut Url, filters: &FilterSet) {
    let mut active = filters.active().peekable();
    if active.peek().is_none() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (k, v) in active {
        pairs.append_pair(k, v);
    }
}
