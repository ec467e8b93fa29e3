use super::*;
use crate::page::FilterSet;
use crate::resource::Resource;
use crate::test_support::MemoryApi;
use std::sync::atomic::Ordering;

fn loaded(api: MemoryApi, page_size: u32) -> ListController<MemoryApi> {
    let mut ctl = ListController::new(api, page_size);
    assert_eq!(ctl.phase(), ListPhase::Idle);
    let t = ctl.reload();
    assert_eq!(ctl.phase(), ListPhase::Loading);
    assert!(ctl.fetch(t));
    ctl
}

fn delete(ctl: &mut ListController<MemoryApi>, id: i64) -> bool {
    ctl.request_delete(RecordId::Int(id)).unwrap();
    ctl.acknowledge_warning().unwrap();
    ctl.confirm_delete().unwrap()
}

#[test]
fn mount_loads_first_page() {
    let ctl = loaded(MemoryApi::numbered(Resource::Supplier, 23), 10);
    assert_eq!(ctl.phase(), ListPhase::Loaded);
    assert_eq!(ctl.items().len(), 10);
    assert_eq!(ctl.total_count(), 23);
    assert_eq!(ctl.total_pages(), 3);
    assert_eq!(
        ctl.display_range().unwrap().to_string(),
        "Showing 1 to 10 of 23 items"
    );
}

#[test]
fn set_page_bounds() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 23), 10);
    assert!(ctl.set_page(0).is_none());
    assert!(ctl.set_page(4).is_none());
    assert!(ctl.set_page(1).is_none());
    assert_eq!(ctl.phase(), ListPhase::Loaded);
    let t = ctl.set_page(3).unwrap();
    assert_eq!(ctl.phase(), ListPhase::Loading);
    assert!(ctl.fetch(t));
    assert_eq!(ctl.items().len(), 3);
    assert_eq!(
        ctl.display_range().unwrap().to_string(),
        "Showing 21 to 23 of 23 items"
    );
    assert!(ctl.next_page().is_none());
    let t = ctl.prev_page().unwrap();
    assert_eq!(t.request().page, 2);
}

#[test]
fn empty_result_disables_pagination() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Manufacturer, 0), 10);
    assert_eq!(ctl.total_pages(), 0);
    assert!(ctl.display_range().is_none());
    assert!(ctl.next_page().is_none());
}

#[test]
fn apply_filters_resets_page_and_commits_draft() {
    let api = MemoryApi::with_names(
        Resource::Supplier,
        &["ABC Pharma", "Zed Labs", "abc distributors", "Medico", "ABC Retail"],
    );
    let mut ctl = loaded(api, 2);
    let t = ctl.set_page(2).unwrap();
    ctl.fetch(t);
    ctl.filters_mut().set_draft("name", "abc");
    assert!(ctl.filters().applied().is_unconstrained());
    let t = ctl.apply_filters();
    assert_eq!(ctl.page(), 1);
    assert_eq!(t.request().filters.get("name"), Some("abc"));
    assert!(ctl.fetch(t));
    assert_eq!(ctl.total_count(), 3);
    assert_eq!(ctl.filters().applied().get("name"), Some("abc"));
}

#[test]
fn clear_filters_resets_both_copies_and_page() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 30), 10);
    ctl.filters_mut().set_draft("name", "Item 1");
    let t = ctl.apply_filters();
    ctl.fetch(t);
    let t = ctl.set_page(2).unwrap();
    ctl.fetch(t);
    ctl.filters_mut().set_draft("name", "Item 2");
    let t = ctl.clear_filters();
    assert_eq!(ctl.page(), 1);
    assert_eq!(ctl.filters().applied(), &FilterSet::new());
    assert_eq!(ctl.filters().draft(), &FilterSet::new());
    assert!(t.request().filters.is_unconstrained());
}

#[test]
fn cancelled_filter_edit_keeps_applied() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 5), 10);
    ctl.filters_mut().set_draft("name", "x");
    ctl.cancel_filter_edit();
    assert!(ctl.filters().draft().is_unconstrained());
}

#[test]
fn stale_result_is_not_committed() {
    let api = MemoryApi::with_names(Resource::Supplier, &["ABC", "XYZ", "ABD"]);
    let mut ctl = loaded(api, 10);
    ctl.filters_mut().set_draft("name", "AB");
    let filtered = ctl.apply_filters();
    let cleared = ctl.clear_filters();
    assert!(filtered.is_cancelled());

    let cleared_result = ctl.api().list(cleared.request());
    let filtered_result = ctl.api().list(filtered.request());
    assert!(matches!(
        ctl.complete_fetch(cleared, cleared_result),
        FetchOutcome::Applied
    ));
    assert!(matches!(
        ctl.complete_fetch(filtered, filtered_result),
        FetchOutcome::Stale
    ));
    assert_eq!(ctl.total_count(), 3);
}

#[test]
fn dispose_drops_late_results() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 3), 10);
    let t = ctl.reload();
    let result = ctl.api().list(t.request());
    ctl.dispose();
    assert!(t.is_cancelled());
    assert!(matches!(ctl.complete_fetch(t, result), FetchOutcome::Stale));
    assert!(ctl.is_disposed());
}

#[test]
fn fetch_error_enters_errored_and_recovers() {
    let api = MemoryApi::numbered(Resource::Threshold, 3);
    api.fail_next("Failed to fetch thresholds");
    let mut ctl = ListController::new(api, 10);
    let t = ctl.reload();
    assert!(!ctl.fetch(t));
    assert_eq!(ctl.phase(), ListPhase::Errored);
    assert_eq!(ctl.error(), Some("Failed to fetch thresholds"));
    let t = ctl.reload();
    assert!(ctl.fetch(t));
    assert_eq!(ctl.phase(), ListPhase::Loaded);
    assert!(ctl.error().is_none());
}

#[test]
fn deleting_only_item_on_last_page_steps_back() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 11), 10);
    let t = ctl.set_page(2).unwrap();
    ctl.fetch(t);
    assert_eq!(ctl.items().len(), 1);
    assert!(delete(&mut ctl, 11));
    assert_eq!(ctl.page(), 1);
    assert_eq!(ctl.phase(), ListPhase::Loaded);
    assert_eq!(ctl.items().len(), 10);
    assert_eq!(ctl.total_count(), 10);
    let notices = ctl.take_notices();
    assert_eq!(notices, vec![Notice::success("Drug deleted successfully")]);
}

#[test]
fn deleting_on_first_page_stays_and_refetches() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Supplier, 4), 10);
    let before = ctl.api().list_calls.load(Ordering::SeqCst);
    assert!(delete(&mut ctl, 2));
    assert_eq!(ctl.page(), 1);
    assert_eq!(ctl.api().list_calls.load(Ordering::SeqCst), before + 1);
    assert_eq!(ctl.items().len(), 3);
}

#[test]
fn delete_requires_both_confirmations() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Supplier, 4), 10);
    assert_eq!(ctl.begin_delete().unwrap_err(), DeleteRejected::OutOfOrder);
    let prompt = ctl.request_delete(RecordId::Int(1)).unwrap();
    assert!(matches!(prompt, DeletePrompt::Warning { .. }));
    assert_eq!(ctl.confirm_delete().unwrap_err(), DeleteRejected::OutOfOrder);
    let prompt = ctl.acknowledge_warning().unwrap();
    assert!(matches!(prompt, DeletePrompt::Irreversible { .. }));
    assert!(prompt.message().contains("cannot be undone"));
    ctl.cancel_delete();
    assert_eq!(ctl.confirm_delete().unwrap_err(), DeleteRejected::OutOfOrder);
    assert_eq!(ctl.api().remove_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctl.api().len(), 4);
}

#[test]
fn second_delete_rejected_while_pending() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 4), 10);
    ctl.request_delete(RecordId::Int(1)).unwrap();
    ctl.acknowledge_warning().unwrap();
    let ticket = ctl.begin_delete().unwrap();
    assert_eq!(
        ctl.request_delete(RecordId::Int(1)).unwrap_err(),
        DeleteRejected::Busy(RecordId::Int(1))
    );
    assert_eq!(ctl.pending_delete(), Some(&RecordId::Int(1)));
    ctl.cancel_delete();
    assert_eq!(ctl.pending_delete(), Some(&RecordId::Int(1)));
    let refetch = ctl.finish_delete(ticket, Ok(()));
    assert!(refetch.is_some());
    assert!(ctl.pending_delete().is_none());
    assert!(ctl.request_delete(RecordId::Int(2)).is_ok());
}

#[test]
fn failed_delete_leaves_list_unchanged() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 4), 10);
    ctl.api().fail_next("Drug is referenced by transactions");
    let before = ctl.items().to_vec();
    assert!(!delete(&mut ctl, 3));
    assert_eq!(ctl.phase(), ListPhase::Loaded);
    assert_eq!(ctl.items(), before.as_slice());
    let notices = ctl.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_failure());
    assert_eq!(notices[0].message, "Drug is referenced by transactions");
    assert!(ctl.pending_delete().is_none());
}

#[test]
fn page_past_end_is_clamped_and_refetched() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 25), 10);
    let t = ctl.set_page(3).unwrap();
    ctl.fetch(t);
    // Another user removed records: only 12 remain.
    for id in 13..=25 {
        ctl.api().remove(&RecordId::Int(id)).unwrap();
    }
    let t = ctl.reload();
    assert!(ctl.fetch(t));
    assert_eq!(ctl.page(), 2);
    assert_eq!(ctl.items().len(), 2);
}

#[test]
fn page_size_change_returns_to_first_page() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 25), 10);
    let t = ctl.set_page(2).unwrap();
    ctl.fetch(t);
    assert!(ctl.set_page_size(10).is_none());
    let t = ctl.set_page_size(20).unwrap();
    assert_eq!(t.request().page, 1);
    assert_eq!(t.request().page_size, 20);
}

#[test]
fn capped_page_size_drives_range_label() {
    let api = MemoryApi::numbered(Resource::Supplier, 12);
    api.cap_page_size(5);
    let mut ctl = loaded(api, 10);
    assert_eq!(ctl.items().len(), 5);
    assert_eq!(ctl.page_size(), 5);
    assert_eq!(ctl.total_pages(), 3);
    let range = ctl.display_range().unwrap();
    assert_eq!(range.last, ctl.items().len() as u64);
    assert_eq!(range.to_string(), "Showing 1 to 5 of 12 items");

    let t = ctl.set_page(3).unwrap();
    assert_eq!(t.request().page_size, 5);
    assert!(ctl.fetch(t));
    assert_eq!(
        ctl.display_range().unwrap().to_string(),
        "Showing 11 to 12 of 12 items"
    );
}

#[test]
fn deleting_a_record_not_on_the_page_keeps_the_count() {
    let mut ctl = loaded(MemoryApi::numbered(Resource::Drug, 15), 10);
    let ticket = {
        ctl.request_delete(RecordId::Int(14)).unwrap();
        ctl.acknowledge_warning().unwrap();
        ctl.begin_delete().unwrap()
    };
    let refetch = ctl.finish_delete(ticket, Ok(()));
    assert!(refetch.is_some());
    assert_eq!(ctl.items().len(), 10);
    assert_eq!(ctl.total_count(), 15);
    assert_eq!(ctl.page(), 1);
}

#[test]
fn zero_padded_text_id_is_deleted_as_is() {
    let api = MemoryApi::with_names(Resource::Storage, &[]);
    api.insert(serde_json::json!({"id": "0012", "name": "Cold room"}));
    api.insert(serde_json::json!({"id": 12, "name": "Shelf"}));
    let mut ctl = loaded(api, 10);
    let id: RecordId = "0012".parse().unwrap();
    ctl.request_delete(id).unwrap();
    ctl.acknowledge_warning().unwrap();
    assert!(ctl.confirm_delete().unwrap());
    assert_eq!(ctl.items().len(), 1);
    assert_eq!(ctl.items()[0].display("name"), "Shelf");
}
