//! "Purchase without PO" entry: invoice header fields plus line items,
//! submitted as one purchase transaction.

mod line;

pub use line::{round2, totals, LineAmounts, LineError, LineItem, PurchaseTotals};

use crate::form::{
    FieldFormat, FieldKind, FieldSpec, FormController, FormMode, FormPhase, SubmitError,
    SubmitOutcome, ValidationErrors,
};
use crate::notice::Notice;
use crate::resource::{Payload, Resource, ResourceApi};
use serde_json::Value;

const PAYMENT_MODES: &[&str] = &["cash", "credit", "cheque"];

fn header_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("supplier", "Supplier", FieldKind::Text).required(),
        FieldSpec::new("invoice_number", "Invoice number", FieldKind::Text)
            .required()
            .format(FieldFormat::MaxLength(50)),
        FieldSpec::new("invoice_date", "Invoice date", FieldKind::Date).required(),
        FieldSpec::new("payment_mode", "Payment mode", FieldKind::Choice(PAYMENT_MODES)),
        FieldSpec::new("cheque_number", "Cheque number", FieldKind::Text)
            .required_when("payment_mode", "cheque"),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("no line with index {0}")]
    NoSuchLine(usize),
    #[error("transactions api expected, got {0}")]
    WrongResource(Resource),
}

pub struct PurchaseForm<A: ResourceApi> {
    header: FormController<A>,
    lines: Vec<LineItem>,
}

impl<A: ResourceApi> PurchaseForm<A> {
    /// `api` must be the transactions resource.
    pub fn new(api: A) -> Result<Self, PurchaseError> {
        if api.resource() != Resource::Transaction {
            return Err(PurchaseError::WrongResource(api.resource()));
        }
        Ok(Self {
            header: FormController::new(api, header_fields(), FormMode::Create),
            lines: Vec::new(),
        })
    }

    pub fn header(&self) -> &FormController<A> {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut FormController<A> {
        &mut self.header
    }

    pub fn phase(&self) -> FormPhase {
        self.header.phase()
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn add_line(&mut self, line: LineItem) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Replaces a line; its derived amounts follow immediately.
    pub fn update_line(&mut self, index: usize, line: LineItem) -> Result<LineAmounts, PurchaseError> {
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(PurchaseError::NoSuchLine(index))?;
        *slot = line;
        Ok(slot.amounts())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineItem, PurchaseError> {
        if index >= self.lines.len() {
            return Err(PurchaseError::NoSuchLine(index));
        }
        Ok(self.lines.remove(index))
    }

    pub fn totals(&self) -> PurchaseTotals {
        totals(&self.lines)
    }

    /// Line errors keyed `items[<index>]`.
    pub fn validate_lines(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.lines.is_empty() {
            errors.insert("items", "Add at least one drug to the purchase");
        }
        for (i, line) in self.lines.iter().enumerate() {
            if let Err(e) = line.validate() {
                errors.insert(&format!("items[{i}]"), format!("Line {}: {}", i + 1, e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Header fields plus `transaction_type`, `items` and `total_amount`.
    pub fn payload(&self) -> Result<Payload, ValidationErrors> {
        self.validate_lines()?;
        Ok(purchase_payload(self.header.payload(), &self.lines))
    }

    /// Header and lines must both validate; nothing is sent otherwise. On
    /// success the lines are cleared along with the header.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        let phase = self.header.phase();
        if matches!(phase, FormPhase::Loading | FormPhase::Submitting) {
            return Err(SubmitError::Busy(phase));
        }
        // Header and line errors are reported together.
        let mut errors = self.header.validate_all().err().unwrap_or_default();
        if let Err(line_errors) = self.validate_lines() {
            errors.merge(line_errors);
        }
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        let lines = &self.lines;
        let outcome = self
            .header
            .submit_with(|header| Ok(purchase_payload(header, lines)))?;
        self.lines.clear();
        Ok(outcome)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.header.take_notices()
    }
}

fn purchase_payload(header: Payload, lines: &[LineItem]) -> Payload {
    let Payload::Json(mut map) = header else {
        return header;
    };
    map.insert("transaction_type".into(), Value::from("purchase"));
    let items = lines
        .iter()
        .map(|l| serde_json::to_value(l.to_payload()).unwrap_or(Value::Null))
        .collect();
    map.insert("items".into(), Value::Array(items));
    map.insert(
        "total_amount".into(),
        Value::from(round2(totals(lines).purchase_amount)),
    );
    Payload::Json(map)
}
