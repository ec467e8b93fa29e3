//! List-response envelope normalization.
//!
//! Backends wrap list results in one of four shapes. They are matched here
//! and nowhere else; a new backend shape is a new [`Envelope`] variant.

use super::{PageRequest, PageResult};
use crate::resource::{RecordError, ResourceRecord};
use serde::Deserialize;
use serde_json::Value;

/// The list envelopes the backend is known to send. Variant order is the
/// match order: the most specific shape first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `{current_page, page_size, total_count, results}`
    Paged {
        current_page: u32,
        page_size: u32,
        total_count: u64,
        results: Vec<Value>,
    },
    /// `{results, count}`
    Counted { results: Vec<Value>, count: u64 },
    /// `{data, total_items}`
    Data { data: Vec<Value>, total_items: u64 },
    /// `[...]`: the whole filtered set, paged on the client.
    Bare(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("unrecognized list envelope: {0}")]
    UnknownShape(String),
    #[error("item {index}: {source}")]
    Item { index: usize, source: RecordError },
}

impl Envelope {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Envelope::Paged { .. } => "current_page/page_size/total_count/results",
            Envelope::Counted { .. } => "results/count",
            Envelope::Data { .. } => "data/total_items",
            Envelope::Bare(_) => "bare array",
        }
    }

    pub fn parse(value: Value) -> Result<Self, EnvelopeError> {
        let summary = summarize(&value);
        serde_json::from_value(value).map_err(|_| EnvelopeError::UnknownShape(summary))
    }

    /// Converts into a page for `request`.
    ///
    /// Paged envelopes report their own page and size; the others echo the
    /// request. A bare array is sliced to the requested page. Items beyond
    /// the page size are dropped so `items.len() <= page_size` always holds.
    pub fn into_page(self, request: &PageRequest) -> Result<PageResult, EnvelopeError> {
        let shape = self.shape_name();
        let (raw, current_page, page_size, total_count) = match self {
            Envelope::Paged {
                current_page,
                page_size,
                total_count,
                results,
            } => (results, current_page.max(1), page_size.max(1), total_count),
            Envelope::Counted { results, count } => {
                (results, request.page, request.page_size, count)
            }
            Envelope::Data { data, total_items } => {
                (data, request.page, request.page_size, total_items)
            }
            Envelope::Bare(all) => {
                let total = all.len() as u64;
                let size = request.page_size as usize;
                let skip = (request.page.max(1) as usize - 1).saturating_mul(size);
                let page: Vec<Value> = all.into_iter().skip(skip).take(size).collect();
                (page, request.page, request.page_size, total)
            }
        };

        if raw.len() > page_size as usize {
            tracing::warn!(
                "{} envelope returned {} items for page size {}; truncating",
                shape,
                raw.len(),
                page_size
            );
        }
        let items = raw
            .into_iter()
            .take(page_size as usize)
            .enumerate()
            .map(|(index, v)| {
                ResourceRecord::from_value(v).map_err(|source| EnvelopeError::Item { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResult {
            items,
            current_page,
            page_size,
            total_count,
        })
    }
}

/// Parses any known envelope and normalizes it into one [`PageResult`].
pub fn normalize_page_result(value: Value, request: &PageRequest) -> Result<PageResult, EnvelopeError> {
    let envelope = Envelope::parse(value)?;
    tracing::trace!("list envelope: {}", envelope.shape_name());
    envelope.into_page(request)
}

/// Short description of an unexpected body for error messages.
fn summarize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "array".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
    }
}
