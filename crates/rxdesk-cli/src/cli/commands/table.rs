//! Plain-text tables for list output.

use rxdesk_core::resource::{Resource, ResourceRecord};
use std::fmt::Write;

const MAX_CELL: usize = 32;

pub(crate) fn columns(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Supplier => &["name", "phone", "gst_number", "status"],
        Resource::Drug => &["name", "category", "manufacturer", "mrp"],
        Resource::Manufacturer => &["name", "email", "phone"],
        Resource::Storage => &["name", "storage_type", "temperature"],
        Resource::Threshold => &["drug", "storage", "min_quantity", "max_quantity"],
        Resource::Transaction => &["invoice_number", "supplier", "transaction_type", "total_amount"],
    }
}

fn cell(s: String) -> String {
    if s.chars().count() <= MAX_CELL {
        return s;
    }
    let mut cut: String = s.chars().take(MAX_CELL - 1).collect();
    cut.push('…');
    cut
}

pub(crate) fn render(resource: Resource, items: &[ResourceRecord]) -> String {
    let cols = columns(resource);
    let mut header: Vec<String> = vec!["ID".to_string()];
    header.extend(cols.iter().map(|c| c.to_uppercase()));
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|r| {
            let mut row = vec![r.id.to_string()];
            row.extend(cols.iter().map(|c| cell(r.display(c))));
            row
        })
        .collect();
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}
