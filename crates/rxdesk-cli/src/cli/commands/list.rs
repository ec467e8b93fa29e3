//! `rxdesk list` and `rxdesk get`.

use super::{parse_filters, table};
use anyhow::Result;
use rxdesk_core::page::PageRequest;
use rxdesk_core::resource::{Backend, RecordId, Resource, ResourceApi};
use rxdesk_core::transport::run_blocking;

pub async fn run_list(
    backend: &Backend,
    resource: Resource,
    page: u32,
    page_size: u32,
    filters: &[String],
) -> Result<()> {
    let request = PageRequest::new(page, page_size).with_filters(parse_filters(resource, filters)?);
    let client = backend.client(resource);
    let result = run_blocking(move || client.list(&request)).await??;

    if result.items.is_empty() {
        println!("No {} found.", resource.plural());
        return Ok(());
    }
    print!("{}", table::render(resource, &result.items));
    if let Some(range) = result.display_range() {
        println!(
            "{} (page {} of {})",
            range,
            result.current_page,
            result.total_pages()
        );
    }
    Ok(())
}

pub async fn run_get(backend: &Backend, resource: Resource, id: RecordId) -> Result<()> {
    let client = backend.client(resource);
    let record = run_blocking(move || client.get_by_id(&id)).await??;
    println!("{}", serde_json::to_string_pretty(&record.into_value())?);
    Ok(())
}
