//! File-field values and the preview registry.
//!
//! A newly selected file gets a preview handle from [`PreviewRegistry`].
//! Handles are released explicitly when the selection is replaced, cleared,
//! submitted or abandoned; `live()` counts those not yet released.

use crate::transport::FilePart;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreviewUrl {
    id: u64,
    file_name: String,
}

impl fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}/{}", self.id, self.file_name)
    }
}

#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: u64,
    live: BTreeSet<u64>,
}

impl PreviewRegistry {
    pub fn create(&mut self, file_name: &str) -> PreviewUrl {
        self.next_id += 1;
        self.live.insert(self.next_id);
        PreviewUrl {
            id: self.next_id,
            file_name: file_name.to_string(),
        }
    }

    /// False when the handle was already released.
    pub fn release(&mut self, url: &PreviewUrl) -> bool {
        self.live.remove(&url.id)
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileValue {
    Empty,
    /// Reference to a file the backend already stores (path or URL).
    Persisted(String),
    /// Picked by the user and not uploaded yet.
    Selected { file: FilePart, preview: PreviewUrl },
}

impl FileValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FileValue::Empty)
    }

    pub fn preview(&self) -> Option<&PreviewUrl> {
        match self {
            FileValue::Selected { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// Only a fresh selection goes into the request body.
    pub fn upload_part(&self) -> Option<&FilePart> {
        match self {
            FileValue::Selected { file, .. } => Some(file),
            _ => None,
        }
    }
}
