//! Field sets of the create/edit screens.

use super::field::{FieldFormat, FieldKind, FieldSpec};
use crate::resource::Resource;

const SUPPLIER_STATUS: &[&str] = &["active", "inactive"];
const PAYMENT_TERMS: &[&str] = &["cash", "credit", "cheque"];
const STORAGE_TYPES: &[&str] = &["room", "refrigerator", "freezer", "vault"];
const TRANSACTION_TYPES: &[&str] = &["purchase", "sale", "return", "adjustment"];
const DRUG_SCHEDULES: &[&str] = &["otc", "h", "h1", "x"];

const SUPPLIER: &[FieldSpec] = &[
    FieldSpec::new("name", "Supplier name", FieldKind::Text)
        .required()
        .format(FieldFormat::MaxLength(120)),
    FieldSpec::new("contact_person", "Contact person", FieldKind::Text),
    FieldSpec::new("phone", "Phone", FieldKind::Text)
        .required()
        .format(FieldFormat::Digits(Some(10))),
    FieldSpec::new("email", "Email", FieldKind::Text).format(FieldFormat::Email),
    FieldSpec::new("gst_number", "GST number", FieldKind::Text)
        .required()
        .format(FieldFormat::Gstin),
    FieldSpec::new("drug_license_number", "Drug license number", FieldKind::Text),
    FieldSpec::new("address", "Address", FieldKind::Text),
    FieldSpec::new("status", "Status", FieldKind::Choice(SUPPLIER_STATUS)).required(),
    FieldSpec::new("payment_terms", "Payment terms", FieldKind::Choice(PAYMENT_TERMS)),
    FieldSpec::new("credit_days", "Credit days", FieldKind::Number)
        .required_when("payment_terms", "credit")
        .format(FieldFormat::Range { min: 1.0, max: 365.0 }),
    FieldSpec::new("manufacturer", "Manufacturer", FieldKind::Text),
    FieldSpec::new("license_document", "License document", FieldKind::File),
];

const DRUG: &[FieldSpec] = &[
    FieldSpec::new("name", "Drug name", FieldKind::Text)
        .required()
        .format(FieldFormat::MaxLength(120)),
    FieldSpec::new("generic_name", "Generic name", FieldKind::Text),
    FieldSpec::new("category", "Category", FieldKind::Text).required(),
    FieldSpec::new("manufacturer", "Manufacturer", FieldKind::Text).required(),
    FieldSpec::new("hsn_code", "HSN code", FieldKind::Text).format(FieldFormat::Digits(None)),
    FieldSpec::new("schedule", "Schedule", FieldKind::Choice(DRUG_SCHEDULES)),
    FieldSpec::new("prescription_required", "Prescription required", FieldKind::Boolean)
        .required(),
    FieldSpec::new("mrp", "MRP", FieldKind::Number)
        .required()
        .format(FieldFormat::Range { min: 0.0, max: 1_000_000.0 }),
    FieldSpec::new("gst_percent", "GST %", FieldKind::Number)
        .format(FieldFormat::Range { min: 0.0, max: 100.0 }),
    FieldSpec::new("image", "Image", FieldKind::File),
];

const MANUFACTURER: &[FieldSpec] = &[
    FieldSpec::new("name", "Manufacturer name", FieldKind::Text).required(),
    FieldSpec::new("email", "Email", FieldKind::Text).format(FieldFormat::Email),
    FieldSpec::new("phone", "Phone", FieldKind::Text).format(FieldFormat::Digits(Some(10))),
    FieldSpec::new("address", "Address", FieldKind::Text),
];

const STORAGE: &[FieldSpec] = &[
    FieldSpec::new("name", "Location name", FieldKind::Text).required(),
    FieldSpec::new("storage_type", "Storage type", FieldKind::Choice(STORAGE_TYPES)).required(),
    FieldSpec::new("temperature", "Temperature (°C)", FieldKind::Number)
        .required_when("storage_type", "refrigerator")
        .format(FieldFormat::Range { min: -40.0, max: 40.0 }),
    FieldSpec::new("capacity", "Capacity", FieldKind::Number)
        .format(FieldFormat::Range { min: 0.0, max: 1_000_000.0 }),
];

const THRESHOLD: &[FieldSpec] = &[
    FieldSpec::new("drug", "Drug", FieldKind::Text).required(),
    FieldSpec::new("storage", "Storage location", FieldKind::Text).required(),
    FieldSpec::new("min_quantity", "Minimum quantity", FieldKind::Number)
        .required()
        .format(FieldFormat::Range { min: 0.0, max: 1_000_000.0 }),
    FieldSpec::new("max_quantity", "Maximum quantity", FieldKind::Number)
        .format(FieldFormat::Range { min: 0.0, max: 1_000_000.0 }),
];

const TRANSACTION: &[FieldSpec] = &[
    FieldSpec::new("supplier", "Supplier", FieldKind::Text).required(),
    FieldSpec::new("transaction_type", "Transaction type", FieldKind::Choice(TRANSACTION_TYPES))
        .required(),
    FieldSpec::new("invoice_number", "Invoice number", FieldKind::Text).required(),
    FieldSpec::new("invoice_date", "Invoice date", FieldKind::Date).required(),
    FieldSpec::new("total_amount", "Total amount", FieldKind::Number)
        .required()
        .format(FieldFormat::Range { min: 0.0, max: 1.0e12 }),
    FieldSpec::new("payment_mode", "Payment mode", FieldKind::Choice(PAYMENT_TERMS)),
    FieldSpec::new("cheque_number", "Cheque number", FieldKind::Text)
        .required_when("payment_mode", "cheque"),
    FieldSpec::new("invoice_copy", "Invoice copy", FieldKind::File),
];

pub fn schema_for(resource: Resource) -> &'static [FieldSpec] {
    match resource {
        Resource::Supplier => SUPPLIER,
        Resource::Drug => DRUG,
        Resource::Manufacturer => MANUFACTURER,
        Resource::Storage => STORAGE,
        Resource::Threshold => THRESHOLD,
        Resource::Transaction => TRANSACTION,
    }
}
