//! Paginated, filterable list state machine shared by every list screen.
//!
//! `Idle -> Loading -> {Loaded, Errored}`; any change to page, page size or
//! applied filters re-enters `Loading`. Fetches are split into
//! [`ListController::begin_fetch`]-style tickets and a commit step so that
//! only the most recently started fetch may update the displayed page.

mod delete;

pub use delete::{DeletePrompt, DeleteRejected, DeleteTicket};

use crate::control::CancelToken;
use crate::error::RequestFailed;
use crate::notice::{capitalize, Notice};
use crate::page::{display_range, total_pages, DisplayRange, FilterState, PageRequest, PageResult};
use crate::resource::{RecordId, ResourceApi, ResourceRecord};
use delete::DeleteFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// One fetch cycle: the request snapshot plus its generation and cancel token.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    request: PageRequest,
    cancel: CancelToken,
}

impl FetchTicket {
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer fetch started or the controller was disposed.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// What `complete_fetch` did with a result.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Page committed; phase is `Loaded`.
    Applied,
    /// Error committed; phase is `Errored`.
    Failed,
    /// Superseded or disposed; nothing changed.
    Stale,
    /// Page was past the end of a shrunken set; re-fetch the clamped page.
    Reissued(FetchTicket),
}

pub struct ListController<A: ResourceApi> {
    api: A,
    page: u32,
    page_size: u32,
    filters: FilterState,
    phase: ListPhase,
    current: Option<PageResult>,
    error: Option<String>,
    generation: u64,
    cancel: CancelToken,
    disposed: bool,
    delete: DeleteFlow,
    notices: Vec<Notice>,
}

impl<A: ResourceApi> ListController<A> {
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            page: 1,
            page_size: page_size.max(1),
            filters: FilterState::default(),
            phase: ListPhase::Idle,
            current: None,
            error: None,
            generation: 0,
            cancel: CancelToken::new(),
            disposed: false,
            delete: DeleteFlow::Idle,
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Draft filters live here until `apply_filters`.
    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn items(&self) -> &[ResourceRecord] {
        self.current.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn total_count(&self) -> u64 {
        self.current.as_ref().map(|p| p.total_count).unwrap_or(0)
    }

    /// Zero until a page is loaded or when the filtered set is empty; pagination
    /// controls are disabled at zero.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count(), self.page_size)
    }

    pub fn display_range(&self) -> Option<DisplayRange> {
        display_range(self.page, self.page_size, self.total_count())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Id of the record whose delete is waiting for confirmation or in flight.
    pub fn pending_delete(&self) -> Option<&RecordId> {
        self.delete.pending()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn current_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size).with_filters(self.filters.applied().clone())
    }

    /// Starts a fetch of the current (page, size, applied filters) and
    /// supersedes any fetch still in flight.
    pub fn reload(&mut self) -> FetchTicket {
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.generation += 1;
        self.phase = ListPhase::Loading;
        let request = self.current_request();
        tracing::debug!(
            resource = %self.api.resource(),
            generation = self.generation,
            page = request.page,
            page_size = request.page_size,
            filters = %request.filters,
            "list fetch started"
        );
        FetchTicket {
            generation: self.generation,
            request,
            cancel: self.cancel.clone(),
        }
    }

    /// Rejected (None) when `n` is outside `[1, total_pages]` or already current.
    pub fn set_page(&mut self, n: u32) -> Option<FetchTicket> {
        if n < 1 || n > self.total_pages() || n == self.page {
            tracing::debug!("set_page({}) rejected (total pages {})", n, self.total_pages());
            return None;
        }
        self.page = n;
        Some(self.reload())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, size: u32) -> Option<FetchTicket> {
        if size == 0 || size == self.page_size {
            return None;
        }
        self.page_size = size;
        self.page = 1;
        Some(self.reload())
    }

    /// Commits the draft filters and returns to page 1.
    pub fn apply_filters(&mut self) -> FetchTicket {
        self.filters.commit();
        self.page = 1;
        self.reload()
    }

    /// Abandons draft edits without fetching.
    pub fn cancel_filter_edit(&mut self) {
        self.filters.discard_draft();
    }

    /// Resets draft and applied filters and returns to page 1.
    pub fn clear_filters(&mut self) -> FetchTicket {
        self.filters.clear();
        self.page = 1;
        self.reload()
    }

    /// Commits a fetch result if `ticket` is still the latest fetch.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, RequestFailed>,
    ) -> FetchOutcome {
        if self.disposed || ticket.generation != self.generation || ticket.is_cancelled() {
            tracing::debug!(
                "dropping stale list result (generation {}, latest {})",
                ticket.generation,
                self.generation
            );
            return FetchOutcome::Stale;
        }
        match result {
            Ok(page) => {
                // The backend may cap the page size; the label follows what it sent.
                if page.page_size != self.page_size && page.page_size > 0 {
                    tracing::debug!("backend page size {} (asked {})", page.page_size, self.page_size);
                    self.page_size = page.page_size;
                }
                if page.current_page >= 1 {
                    self.page = page.current_page;
                }
                let last = total_pages(page.total_count, self.page_size);
                if last > 0 && self.page > last {
                    tracing::debug!("page {} past end ({} pages); clamping", self.page, last);
                    self.page = last;
                    self.current = Some(page);
                    return FetchOutcome::Reissued(self.reload());
                }
                self.current = Some(page);
                self.error = None;
                self.phase = ListPhase::Loaded;
                FetchOutcome::Applied
            }
            Err(e) => {
                self.error = Some(e.message);
                self.phase = ListPhase::Errored;
                FetchOutcome::Failed
            }
        }
    }

    /// Runs `ticket` against the api on this thread and commits the result.
    /// Returns true when the list ended up `Loaded`.
    pub fn fetch(&mut self, ticket: FetchTicket) -> bool {
        let mut ticket = ticket;
        loop {
            let result = self.api.list(ticket.request());
            match self.complete_fetch(ticket, result) {
                FetchOutcome::Applied => return true,
                FetchOutcome::Failed | FetchOutcome::Stale => return false,
                FetchOutcome::Reissued(next) => ticket = next,
            }
        }
    }

    /// Mount/unmount: results arriving after this are dropped.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.cancel.cancel();
    }

    /// First confirmation step.
    pub fn request_delete(&mut self, id: RecordId) -> Result<DeletePrompt, DeleteRejected> {
        if let Some(pending) = self.delete.pending() {
            return Err(DeleteRejected::Busy(pending.clone()));
        }
        self.delete = DeleteFlow::Warning(id.clone());
        Ok(DeletePrompt::warning(self.api.resource(), id))
    }

    /// Second confirmation step, after the user accepted the warning.
    pub fn acknowledge_warning(&mut self) -> Result<DeletePrompt, DeleteRejected> {
        match std::mem::take(&mut self.delete) {
            DeleteFlow::Warning(id) => {
                self.delete = DeleteFlow::Confirm(id.clone());
                Ok(DeletePrompt::irreversible(self.api.resource(), id))
            }
            other => {
                self.delete = other;
                Err(DeleteRejected::OutOfOrder)
            }
        }
    }

    /// Dismisses either dialog. A delete already in flight is not affected.
    pub fn cancel_delete(&mut self) {
        if matches!(self.delete, DeleteFlow::Warning(_) | DeleteFlow::Confirm(_)) {
            self.delete = DeleteFlow::Idle;
        }
    }

    /// Marks the confirmed delete as in flight; the caller runs `remove`.
    pub fn begin_delete(&mut self) -> Result<DeleteTicket, DeleteRejected> {
        match std::mem::take(&mut self.delete) {
            DeleteFlow::Confirm(id) => {
                self.delete = DeleteFlow::InFlight(id.clone());
                Ok(DeleteTicket { id })
            }
            other => {
                self.delete = other;
                Err(DeleteRejected::OutOfOrder)
            }
        }
    }

    /// Settles a delete. On success the record is dropped from the local page,
    /// the page steps back when it became empty (and is not page 1), and a
    /// refetch ticket is returned. On failure the list is left as it was.
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        result: Result<(), RequestFailed>,
    ) -> Option<FetchTicket> {
        self.delete = DeleteFlow::Idle;
        let noun = self.api.resource().singular();
        match result {
            Ok(()) => {
                self.notices
                    .push(Notice::success(format!("{} deleted successfully", capitalize(noun))));
                let remaining = match self.current.as_mut() {
                    Some(page) => {
                        let before = page.items.len();
                        page.items.retain(|r| !r.id.same_as(&ticket.id));
                        if page.items.len() < before {
                            page.total_count = page.total_count.saturating_sub(1);
                        }
                        page.items.len()
                    }
                    None => 0,
                };
                if remaining == 0 && self.page > 1 {
                    self.page -= 1;
                }
                Some(self.reload())
            }
            Err(e) => {
                tracing::warn!("delete of {} {} failed: {}", noun, ticket.id, e);
                self.notices.push(Notice::failure(e.message));
                None
            }
        }
    }

    /// Runs the confirmed delete and the follow-up fetch on this thread.
    /// Returns whether the record was deleted.
    pub fn confirm_delete(&mut self) -> Result<bool, DeleteRejected> {
        let ticket = self.begin_delete()?;
        let result = self.api.remove(ticket.id());
        match self.finish_delete(ticket, result) {
            Some(refetch) => {
                self.fetch(refetch);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests;
