//! `rxdesk delete <resource> <id>`: warning, then irreversible confirmation.

use super::{print_notices, prompt::confirm};
use anyhow::Result;
use rxdesk_core::list::ListController;
use rxdesk_core::resource::{Backend, RecordId, Resource, ResourceApi};
use rxdesk_core::transport::run_blocking;

pub async fn run_delete(backend: &Backend, resource: Resource, id: RecordId, yes: bool) -> Result<()> {
    let client = backend.client(resource);
    run_blocking(move || -> Result<()> {
        let mut list = ListController::new(client, 1);
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stdout();

        let warning = list.request_delete(id)?;
        if !yes && !confirm(&mut input, &mut out, warning.message())? {
            list.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
        let irreversible = list.acknowledge_warning()?;
        if !yes && !confirm(&mut input, &mut out, irreversible.message())? {
            list.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
        let ticket = list.begin_delete()?;
        let result = list.api().remove(ticket.id());
        let outcome = result.clone();
        // No list on screen, so the refetch ticket is dropped.
        let _ = list.finish_delete(ticket, result);
        outcome?;
        print_notices(list.take_notices());
        Ok(())
    })
    .await?
}
