//! Declarative field rules: required flag, format constraint and
//! conditional requirement on a sibling field.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    /// One of a fixed set of string values.
    Choice(&'static [&'static str]),
    Date,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldFormat {
    /// ASCII digits only, optionally of an exact length.
    Digits(Option<usize>),
    Email,
    /// Indian GST identification number (15 characters).
    Gstin,
    Range { min: f64, max: f64 },
    MaxLength(usize),
    /// `YYYY-MM-DD`.
    Date,
}

/// `field` becomes required when sibling `when` equals `equals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub when: &'static str,
    pub equals: &'static str,
}

impl Condition {
    fn holds(&self, values: &Map<String, Value>) -> bool {
        match values.get(self.when) {
            Some(Value::String(s)) => s == self.equals,
            Some(Value::Bool(b)) => b.to_string() == self.equals,
            Some(Value::Number(n)) => n.to_string() == self.equals,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub required_when: Option<Condition>,
    pub format: Option<FieldFormat>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            required_when: None,
            format: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn required_when(mut self, when: &'static str, equals: &'static str) -> Self {
        self.required_when = Some(Condition { when, equals });
        self
    }

    pub const fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Whether the field must be filled given the current sibling values.
    pub fn is_required(&self, values: &Map<String, Value>) -> bool {
        self.required || self.required_when.is_some_and(|c| c.holds(values))
    }

    /// Checks a scalar value. File fields are checked by the form, which
    /// knows whether a file is attached.
    pub fn check(&self, value: Option<&Value>, values: &Map<String, Value>) -> Result<(), String> {
        let value = value.unwrap_or(&Value::Null);
        if is_blank(value) {
            // A required boolean left unset is submitted as false.
            if self.kind == FieldKind::Boolean || !self.is_required(values) {
                return Ok(());
            }
            return Err(format!("{} is required", self.label));
        }
        match self.kind {
            FieldKind::Number if as_number(value).is_none() => {
                return Err(format!("{} must be a number", self.label));
            }
            FieldKind::Boolean if !value.is_boolean() => {
                return Err(format!("{} must be true or false", self.label));
            }
            FieldKind::Choice(options) => {
                let ok = value.as_str().is_some_and(|s| options.contains(&s));
                if !ok {
                    return Err(format!("{} must be one of: {}", self.label, options.join(", ")));
                }
            }
            FieldKind::Date if !value.as_str().is_some_and(is_iso_date) => {
                return Err(format!("{} must be a date (YYYY-MM-DD)", self.label));
            }
            _ => {}
        }
        match self.format {
            Some(format) => check_format(format, self.label, value),
            None => Ok(()),
        }
    }
}

fn check_format(format: FieldFormat, label: &str, value: &Value) -> Result<(), String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    match format {
        FieldFormat::Digits(len) => {
            let digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
            match len {
                Some(n) if !digits || text.len() != n => {
                    Err(format!("{label} must be exactly {n} digits"))
                }
                None if !digits => Err(format!("{label} must contain only digits")),
                _ => Ok(()),
            }
        }
        FieldFormat::Email if !is_email(&text) => {
            Err(format!("{label} must be a valid email address"))
        }
        FieldFormat::Gstin if !is_gstin(&text) => Err(format!("{label} must be a valid GSTIN")),
        FieldFormat::Range { min, max } => match as_number(value) {
            Some(n) if n >= min && n <= max => Ok(()),
            _ => Err(format!("{label} must be between {min} and {max}")),
        },
        FieldFormat::MaxLength(n) if text.chars().count() > n => {
            Err(format!("{label} must be at most {n} characters"))
        }
        FieldFormat::Date if !is_iso_date(&text) => {
            Err(format!("{label} must be a date (YYYY-MM-DD)"))
        }
        _ => Ok(()),
    }
}

/// Null, or a string with nothing but whitespace.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numbers and numeric strings (form inputs arrive as text).
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// 2 digits (state), 5 letters + 4 digits + 1 letter (PAN), entity code, 'Z', checksum.
fn is_gstin(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 15 {
        return false;
    }
    let upper_alnum = |c: u8| c.is_ascii_digit() || c.is_ascii_uppercase();
    b[..2].iter().all(u8::is_ascii_digit)
        && b[2..7].iter().all(u8::is_ascii_uppercase)
        && b[7..11].iter().all(u8::is_ascii_digit)
        && b[11].is_ascii_uppercase()
        && upper_alnum(b[12])
        && b[12] != b'0'
        && b[13] == b'Z'
        && upper_alnum(b[14])
}

pub(crate) fn is_iso_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    let [y, m, d] = parts.as_slice() else {
        return false;
    };
    let numeric = |p: &str, len: usize| p.len() == len && p.bytes().all(|b| b.is_ascii_digit());
    if !numeric(y, 4) || !numeric(m, 2) || !numeric(d, 2) {
        return false;
    }
    let (month, day) = match (m.parse::<u32>(), d.parse::<u32>()) {
        (Ok(m), Ok(d)) => (m, d),
        _ => return false,
    };
    (1..=12).contains(&month) && (1..=31).contains(&day)
}
