//! Purchase line arithmetic.
//!
//! amount = rate * quantity
//! discounted = amount * (1 - discount / 100)
//! purchase = discounted * (1 + gst / 100)
//!
//! Values are kept unrounded; [`round2`] is applied only when a figure is
//! displayed or put into a request.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub drug_id: String,
    pub batch: String,
    pub quantity: f64,
    pub rate: f64,
    pub discount_percent: f64,
    pub gst_percent: f64,
}

/// Derived columns of one line, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineAmounts {
    pub amount: f64,
    pub discounted_amount: f64,
    pub purchase_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PurchaseTotals {
    pub quantity: f64,
    pub amount: f64,
    pub discounted_amount: f64,
    pub purchase_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("drug is required")]
    MissingDrug,
    #[error("quantity must be greater than 0")]
    Quantity,
    #[error("rate must not be negative")]
    Rate,
    #[error("discount must be between 0 and 100")]
    Discount,
    #[error("GST must be between 0 and 100")]
    Gst,
    #[error("expected drug:batch:qty:rate:discount:gst, got {0:?}")]
    Syntax(String),
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl LineItem {
    pub fn new(drug_id: impl Into<String>, quantity: f64, rate: f64) -> Self {
        Self {
            drug_id: drug_id.into(),
            batch: String::new(),
            quantity,
            rate,
            discount_percent: 0.0,
            gst_percent: 0.0,
        }
    }

    pub fn amounts(&self) -> LineAmounts {
        let amount = self.rate * self.quantity;
        let discounted_amount = amount * (1.0 - self.discount_percent / 100.0);
        let purchase_amount = discounted_amount * (1.0 + self.gst_percent / 100.0);
        LineAmounts {
            amount,
            discounted_amount,
            purchase_amount,
        }
    }

    pub fn validate(&self) -> Result<(), LineError> {
        if self.drug_id.trim().is_empty() {
            return Err(LineError::MissingDrug);
        }
        if !(self.quantity > 0.0) {
            return Err(LineError::Quantity);
        }
        if !(self.rate >= 0.0) {
            return Err(LineError::Rate);
        }
        if !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(LineError::Discount);
        }
        if !(0.0..=100.0).contains(&self.gst_percent) {
            return Err(LineError::Gst);
        }
        Ok(())
    }

    pub(crate) fn to_payload(&self) -> LinePayload<'_> {
        let a = self.amounts();
        LinePayload {
            drug: &self.drug_id,
            batch: &self.batch,
            quantity: self.quantity,
            rate: round2(self.rate),
            discount: self.discount_percent,
            gst: self.gst_percent,
            amount: round2(a.amount),
            discounted_amount: round2(a.discounted_amount),
            purchase_amount: round2(a.purchase_amount),
        }
    }
}

/// `drug:batch:qty:rate:discount:gst`; batch may be empty, trailing
/// discount and gst default to 0.
impl FromStr for LineItem {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').map(str::trim).collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(LineError::Syntax(s.to_string()));
        }
        let num = |i: usize| -> Result<f64, LineError> {
            match fields.get(i) {
                None => Ok(0.0),
                Some(v) => v.parse().map_err(|_| LineError::Syntax(s.to_string())),
            }
        };
        Ok(Self {
            drug_id: fields[0].to_string(),
            batch: fields[1].to_string(),
            quantity: num(2)?,
            rate: num(3)?,
            discount_percent: num(4)?,
            gst_percent: num(5)?,
        })
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.amounts();
        write!(
            f,
            "{} {} x{} @ {:.2} -{}% +{}% = {:.2}",
            self.drug_id,
            if self.batch.is_empty() { "-" } else { &self.batch },
            self.quantity,
            round2(self.rate),
            self.discount_percent,
            self.gst_percent,
            round2(a.purchase_amount)
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LinePayload<'a> {
    drug: &'a str,
    batch: &'a str,
    quantity: f64,
    rate: f64,
    discount: f64,
    gst: f64,
    amount: f64,
    discounted_amount: f64,
    purchase_amount: f64,
}

/// Column sums over unrounded line values.
pub fn totals(lines: &[LineItem]) -> PurchaseTotals {
    lines.iter().fold(PurchaseTotals::default(), |mut t, line| {
        let a = line.amounts();
        t.quantity += line.quantity;
        t.amount += a.amount;
        t.discounted_amount += a.discounted_amount;
        t.purchase_amount += a.purchase_amount;
        t
    })
}

impl fmt::Display for PurchaseTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "qty {} | amount {:.2} | after discount {:.2} | payable {:.2}",
            self.quantity,
            round2(self.amount),
            round2(self.discounted_amount),
            round2(self.purchase_amount)
        )
    }
}
