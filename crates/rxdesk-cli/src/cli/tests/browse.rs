//! Scripted `browse` sessions against an in-memory supplier table.

use crate::cli::commands::browse_loop;
use rxdesk_core::error::{FailureKind, RequestFailed};
use rxdesk_core::list::ListController;
use rxdesk_core::page::{PageRequest, PageResult};
use rxdesk_core::resource::{Payload, RecordId, Resource, ResourceApi, ResourceRecord};
use serde_json::json;
use std::sync::Mutex;

struct Shelf {
    records: Mutex<Vec<ResourceRecord>>,
}

impl Shelf {
    fn new(names: &[&str]) -> Self {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, n)| ResourceRecord::from_value(json!({"id": i as i64 + 1, "name": n})).unwrap())
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

fn unused() -> RequestFailed {
    RequestFailed::new(FailureKind::Backend { status: 501 }, "not used in browse")
}

impl ResourceApi for Shelf {
    fn resource(&self) -> Resource {
        Resource::Supplier
    }

    fn list(&self, request: &PageRequest) -> Result<PageResult, RequestFailed> {
        let needle = request.filters.get("name").map(str::to_lowercase);
        let matching: Vec<ResourceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| match &needle {
                Some(n) => r.display("name").to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        let size = request.page_size as usize;
        Ok(PageResult {
            items: matching
                .iter()
                .skip((request.page as usize - 1) * size)
                .take(size)
                .cloned()
                .collect(),
            current_page: request.page,
            page_size: request.page_size,
            total_count: matching.len() as u64,
        })
    }

    fn get_by_id(&self, _id: &RecordId) -> Result<ResourceRecord, RequestFailed> {
        Err(unused())
    }

    fn create(&self, _payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        Err(unused())
    }

    fn update(&self, _id: &RecordId, _payload: Payload) -> Result<ResourceRecord, RequestFailed> {
        Err(unused())
    }

    fn remove(&self, id: &RecordId) -> Result<(), RequestFailed> {
        self.records.lock().unwrap().retain(|r| &r.id != id);
        Ok(())
    }
}

fn session(shelf: &Shelf, page_size: u32, script: &str) -> String {
    let mut list = ListController::new(shelf, page_size);
    let mut out = Vec::new();
    browse_loop(&mut list, script.as_bytes(), &mut out).unwrap();
    assert!(list.is_disposed());
    String::from_utf8(out).unwrap()
}

#[test]
fn browse_pages_forward_and_stops_at_the_end() {
    let shelf = Shelf::new(&["Alpha", "Beta", "Gamma"]);
    let out = session(&shelf, 2, "n\nn\nq\n");
    assert!(out.contains("Showing 1 to 2 of 3 items (page 1 of 2)"));
    assert!(out.contains("Showing 3 to 3 of 3 items (page 2 of 2)"));
    assert!(out.contains("no change"));
}

#[test]
fn browse_filters_only_after_apply() {
    let shelf = Shelf::new(&["Alpha", "Beta", "Gamma"]);
    let out = session(&shelf, 10, "f name=bet\napply\n");
    assert!(out.contains("draft filters: name=bet"));
    let after_apply = out.rsplit("draft filters").next().unwrap();
    assert!(after_apply.contains("Beta"));
    assert!(!after_apply.contains("Alpha"));
    assert!(after_apply.contains("Showing 1 to 1 of 1 items (page 1 of 1)"));
}

#[test]
fn browse_delete_last_item_steps_back_a_page() {
    let shelf = Shelf::new(&["Alpha", "Beta", "Gamma"]);
    let out = session(&shelf, 2, "n\nd 3\ny\ny\nq\n");
    assert_eq!(shelf.len(), 2);
    assert!(out.contains("Are you sure you want to delete supplier 3?"));
    assert!(out.contains("This action cannot be undone."));
    assert!(out.contains("[ok] Supplier deleted successfully"));
    assert!(out.contains("Showing 1 to 2 of 2 items (page 1 of 1)"));
}

#[test]
fn browse_delete_needs_both_confirmations() {
    let shelf = Shelf::new(&["Alpha", "Beta"]);
    let out = session(&shelf, 10, "d 1\ny\nn\nq\n");
    assert_eq!(shelf.len(), 2);
    assert!(out.contains("Cancelled."));
    assert!(!out.contains("deleted successfully"));
}

#[test]
fn browse_reports_bad_commands() {
    let shelf = Shelf::new(&["Alpha"]);
    let out = session(&shelf, 10, "g x\nzap\nd\nq\n");
    assert!(out.contains("usage: g PAGE"));
    assert!(out.contains("unknown command \"zap\""));
    assert!(out.contains("usage: d ID"));
}

#[test]
fn browse_empty_table() {
    let shelf = Shelf::new(&[]);
    let out = session(&shelf, 10, "q\n");
    assert!(out.contains("No suppliers found."));
}
