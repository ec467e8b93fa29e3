//! Back-office resources and their per-resource contract data.

mod client;
mod endpoint;
mod payload;
mod record;

pub use client::{Backend, ResourceApi, ResourceClient};
pub use endpoint::Endpoints;
pub use payload::Payload;
pub use record::{RecordError, RecordId, ResourceRecord};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One backend-managed entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Supplier,
    Drug,
    Manufacturer,
    Storage,
    Threshold,
    Transaction,
}

/// Client operation, used to pick the fallback error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Upload,
    Download,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Supplier,
        Resource::Drug,
        Resource::Manufacturer,
        Resource::Storage,
        Resource::Threshold,
        Resource::Transaction,
    ];

    /// Path segment under `/api/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Resource::Supplier => "suppliers",
            Resource::Drug => "drugs",
            Resource::Manufacturer => "manufacturers",
            Resource::Storage => "storage",
            Resource::Threshold => "thresholds",
            Resource::Transaction => "transactions",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Supplier => "supplier",
            Resource::Drug => "drug",
            Resource::Manufacturer => "manufacturer",
            Resource::Storage => "storage location",
            Resource::Threshold => "threshold",
            Resource::Transaction => "transaction",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Resource::Supplier => "suppliers",
            Resource::Drug => "drugs",
            Resource::Manufacturer => "manufacturers",
            Resource::Storage => "storage locations",
            Resource::Threshold => "thresholds",
            Resource::Transaction => "transactions",
        }
    }

    /// Query parameter carrying the page size. The storage and threshold
    /// endpoints use camelCase.
    pub fn page_size_param(self) -> &'static str {
        match self {
            Resource::Storage | Resource::Threshold => "pageSize",
            _ => "page_size",
        }
    }

    /// Query parameter carrying the record id for get/delete.
    pub fn id_param(self) -> &'static str {
        "id"
    }

    /// File name used for exports when the server sends no Content-Disposition.
    pub fn default_export_name(self) -> &'static str {
        match self {
            Resource::Supplier => "Suppliers.xlsx",
            Resource::Drug => "Drugs.xlsx",
            Resource::Manufacturer => "Manufacturers.xlsx",
            Resource::Storage => "Storage.xlsx",
            Resource::Threshold => "Thresholds.xlsx",
            Resource::Transaction => "Transactions.xlsx",
        }
    }

    /// Filters the list screens offer. Other keys are still passed through.
    pub fn known_filters(self) -> &'static [&'static str] {
        match self {
            Resource::Supplier => &["name", "status", "gst_number"],
            Resource::Drug => &["name", "category", "manufacturer"],
            Resource::Manufacturer => &["name"],
            Resource::Storage => &["name", "storage_type"],
            Resource::Threshold => &["drug", "storage"],
            Resource::Transaction => &["supplier", "transaction_type", "date_from", "date_to"],
        }
    }

    /// Fallback message shown when a call fails without a backend message.
    pub fn fallback(self, op: Operation) -> String {
        match op {
            Operation::List => format!("Failed to fetch {}", self.plural()),
            Operation::Get => format!("Failed to fetch {}", self.singular()),
            Operation::Create => format!("Failed to create {}", self.singular()),
            Operation::Update => format!("Failed to update {}", self.singular()),
            Operation::Delete => format!("Failed to delete {}", self.singular()),
            Operation::Upload => format!("Failed to upload {}", self.plural()),
            Operation::Download => format!("Failed to download {}", self.plural()),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Supplier => "supplier",
            Resource::Drug => "drug",
            Resource::Manufacturer => "manufacturer",
            Resource::Storage => "storage",
            Resource::Threshold => "threshold",
            Resource::Transaction => "transaction",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource '{0}' (expected one of: supplier, drug, manufacturer, storage, threshold, transaction)")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    /// Accepts the singular name or the path segment, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.to_string() == needle || r.path_segment() == needle)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
