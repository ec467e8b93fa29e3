//! `rxdesk browse`: an interactive pager over one resource.

use super::{prompt::confirm, table};
use anyhow::Result;
use rxdesk_core::list::ListController;
use rxdesk_core::page::FilterSet;
use rxdesk_core::resource::{Backend, RecordId, Resource, ResourceApi};
use rxdesk_core::transport::run_blocking;
use std::io::{BufRead, Write};

const HELP: &str = "\
n / p          next / previous page
g N            go to page N
s N            rows per page
f key=value    edit a filter (draft until apply)
apply          apply the draft filters
cancel         discard the draft filters
clear          remove all filters
d ID           delete a record
r              reload
q              quit";

pub async fn run_browse(backend: &Backend, resource: Resource, page_size: u32) -> Result<()> {
    let client = backend.client(resource);
    run_blocking(move || {
        let mut list = ListController::new(client, page_size);
        let stdin = std::io::stdin();
        browse_loop(&mut list, stdin.lock(), std::io::stdout())
    })
    .await?
}

/// Reads commands from `input` until `q` or end of input.
pub(crate) fn browse_loop<A: ResourceApi, R: BufRead, W: Write>(
    list: &mut ListController<A>,
    mut input: R,
    mut out: W,
) -> Result<()> {
    let first = list.reload();
    list.fetch(first);
    show(list, &mut out)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let (cmd, arg) = match line.trim().split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line.trim(), ""),
        };
        let ticket = match cmd {
            "" => continue,
            "q" | "quit" => break,
            "h" | "help" => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            "n" => list.next_page(),
            "p" => list.prev_page(),
            "g" => match arg.parse::<u32>() {
                Ok(n) => list.set_page(n),
                Err(_) => {
                    writeln!(out, "usage: g PAGE")?;
                    continue;
                }
            },
            "s" => match arg.parse::<u32>() {
                Ok(n) => list.set_page_size(n),
                Err(_) => {
                    writeln!(out, "usage: s ROWS")?;
                    continue;
                }
            },
            "f" => {
                match FilterSet::parse_assignment(arg) {
                    Ok((key, value)) => {
                        list.filters_mut().set_draft(&key, &value);
                        writeln!(out, "draft filters: {}", list.filters().draft())?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
                continue;
            }
            "apply" => Some(list.apply_filters()),
            "cancel" => {
                list.cancel_filter_edit();
                writeln!(out, "filters: {}", list.filters().applied())?;
                continue;
            }
            "clear" => Some(list.clear_filters()),
            "r" => Some(list.reload()),
            "d" => {
                delete_record(list, arg, &mut input, &mut out)?;
                continue;
            }
            other => {
                writeln!(out, "unknown command {other:?}; h for help")?;
                continue;
            }
        };
        match ticket {
            Some(ticket) => {
                list.fetch(ticket);
                show(list, &mut out)?;
            }
            None => writeln!(out, "no change")?,
        }
    }
    list.dispose();
    Ok(())
}

fn delete_record<A: ResourceApi, R: BufRead, W: Write>(
    list: &mut ListController<A>,
    arg: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    if arg.is_empty() {
        writeln!(out, "usage: d ID")?;
        return Ok(());
    }
    let id: RecordId = arg.parse().unwrap_or_else(|never| match never {});
    let warning = match list.request_delete(id) {
        Ok(prompt) => prompt,
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(());
        }
    };
    if !confirm(input, out, warning.message())? {
        list.cancel_delete();
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    let irreversible = list.acknowledge_warning()?;
    if !confirm(input, out, irreversible.message())? {
        list.cancel_delete();
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }
    list.confirm_delete()?;
    show(list, out)
}

fn show<A: ResourceApi, W: Write>(list: &mut ListController<A>, out: &mut W) -> Result<()> {
    for notice in list.take_notices() {
        writeln!(out, "{notice}")?;
    }
    if let Some(err) = list.error() {
        writeln!(out, "[error] {err}")?;
    }
    let resource = list.api().resource();
    if list.items().is_empty() {
        writeln!(out, "No {} found.", resource.plural())?;
        return Ok(());
    }
    write!(out, "{}", table::render(resource, list.items()))?;
    if let Some(range) = list.display_range() {
        writeln!(
            out,
            "{} (page {} of {})",
            range,
            list.page(),
            list.total_pages()
        )?;
    }
    Ok(())
}
