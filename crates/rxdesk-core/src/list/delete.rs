//! Two-step delete confirmation.
//!
//! `Idle -> Warning -> Confirm -> InFlight -> Idle`. Only one delete can be
//! pending per list; a second request is rejected until the first settles.

use crate::resource::{RecordId, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(super) enum DeleteFlow {
    #[default]
    Idle,
    Warning(RecordId),
    Confirm(RecordId),
    InFlight(RecordId),
}

impl DeleteFlow {
    pub(super) fn pending(&self) -> Option<&RecordId> {
        match self {
            DeleteFlow::Idle => None,
            DeleteFlow::Warning(id) | DeleteFlow::Confirm(id) | DeleteFlow::InFlight(id) => {
                Some(id)
            }
        }
    }
}

/// Dialog the page must show before the delete proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePrompt {
    /// First dialog: "are you sure".
    Warning { id: RecordId, message: String },
    /// Second dialog: the action is irreversible.
    Irreversible { id: RecordId, message: String },
}

impl DeletePrompt {
    pub(super) fn warning(resource: Resource, id: RecordId) -> Self {
        let message = format!(
            "Are you sure you want to delete {} {}?",
            resource.singular(),
            id
        );
        DeletePrompt::Warning { id, message }
    }

    pub(super) fn irreversible(resource: Resource, id: RecordId) -> Self {
        let message = format!(
            "This action cannot be undone. {} {} will be permanently deleted.",
            crate::notice::capitalize(resource.singular()),
            id
        );
        DeletePrompt::Irreversible { id, message }
    }

    pub fn message(&self) -> &str {
        match self {
            DeletePrompt::Warning { message, .. } | DeletePrompt::Irreversible { message, .. } => {
                message
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleteRejected {
    #[error("a delete of {0} is already pending")]
    Busy(RecordId),
    #[error("no delete is waiting for this confirmation")]
    OutOfOrder,
}

/// Handed out by `begin_delete`; settles with `finish_delete`.
#[derive(Debug)]
pub struct DeleteTicket {
    pub(super) id: RecordId,
}

impl DeleteTicket {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
}
