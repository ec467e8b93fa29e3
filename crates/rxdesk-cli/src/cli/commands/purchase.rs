//! `rxdesk purchase`: enter a purchase invoice without a purchase order.

use super::{print_notices, prompt::confirm};
use anyhow::{bail, Result};
use rxdesk_core::form::SubmitError;
use rxdesk_core::purchase::{round2, LineItem, PurchaseForm};
use rxdesk_core::resource::{Backend, Resource};
use rxdesk_core::transport::run_blocking;
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct PurchaseArgs {
    pub supplier: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub payment_mode: Option<String>,
    pub cheque_number: Option<String>,
    pub items: Vec<LineItem>,
    pub yes: bool,
}

impl PurchaseArgs {
    fn header_values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("supplier", Value::from(self.supplier.as_str())),
            ("invoice_number", Value::from(self.invoice_number.as_str())),
            ("invoice_date", Value::from(self.invoice_date.as_str())),
        ];
        if let Some(mode) = &self.payment_mode {
            values.push(("payment_mode", Value::from(mode.as_str())));
        }
        if let Some(cheque) = &self.cheque_number {
            values.push(("cheque_number", Value::from(cheque.as_str())));
        }
        values
    }
}

pub async fn run_purchase(backend: &Backend, args: PurchaseArgs) -> Result<()> {
    let client = backend.client(Resource::Transaction);
    let outcome = run_blocking(move || -> Result<_> {
        let mut form = PurchaseForm::new(client)?;
        for (name, value) in args.header_values() {
            form.header_mut().set_value(name, value)?;
        }
        for item in args.items {
            form.add_line(item);
        }

        let mut out = std::io::stdout();
        for (i, line) in form.lines().iter().enumerate() {
            writeln!(out, "{:>3}. {}", i + 1, line)?;
        }
        writeln!(out, "     {}", form.totals())?;

        if !args.yes {
            let question = format!(
                "Submit purchase of {:.2} from supplier {}?",
                round2(form.totals().purchase_amount),
                args.supplier
            );
            let stdin = std::io::stdin();
            if !confirm(&mut stdin.lock(), &mut out, &question)? {
                println!("Cancelled.");
                return Ok(None);
            }
        }

        let result = form.submit();
        print_notices(form.take_notices());
        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(SubmitError::Invalid(errors)) => {
                for (field, message) in errors.iter() {
                    eprintln!("  {field}: {message}");
                }
                bail!("purchase has {} invalid field(s)", errors.len())
            }
            Err(e) => Err(e.into()),
        }
    })
    .await??;

    if let Some(outcome) = outcome {
        let resource = outcome.return_to;
        println!("{} {} saved", resource.singular(), outcome.record.id);
    }
    Ok(())
}
