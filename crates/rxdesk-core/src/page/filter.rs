//! Filter criteria: applied vs draft copies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Filter name -> value. An empty (or blank) value means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet(BTreeMap<String, String>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid filter '{0}' (expected key=value)")]
pub struct InvalidAssignment(pub String);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.trim().to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }

    /// Filters that constrain the query (value not blank), trimmed.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !v.is_empty())
    }

    /// True when no filter constrains the query.
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    /// Parses `key=value` (value may be empty, which clears that filter).
    pub fn parse_assignment(raw: &str) -> Result<(String, String), InvalidAssignment> {
        match raw.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => Err(InvalidAssignment(raw.to_string())),
        }
    }

    /// Builds a set from `key=value` assignments.
    pub fn from_assignments<I, S>(items: I) -> Result<Self, InvalidAssignment>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for raw in items {
            let (k, v) = Self::parse_assignment(raw.as_ref())?;
            set.set(&k, &v);
        }
        Ok(set)
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.active() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
            first = false;
        }
        if first {
            write!(f, "(none)")?;
        }
        Ok(())
    }
}

/// Applied filters drive the fetch; the draft is edited separately and only
/// replaces the applied set on [`FilterState::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    applied: FilterSet,
    draft: FilterSet,
}

impl FilterState {
    pub fn applied(&self) -> &FilterSet {
        &self.applied
    }

    pub fn draft(&self) -> &FilterSet {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FilterSet {
        &mut self.draft
    }

    pub fn set_draft(&mut self, name: &str, value: &str) {
        self.draft.set(name, value);
    }

    /// Copies the draft into the applied set.
    pub fn commit(&mut self) {
        self.applied = self.draft.clone();
    }

    /// Drops draft edits (modal cancelled); draft goes back to what is applied.
    pub fn discard_draft(&mut self) {
        self.draft = self.applied.clone();
    }

    /// Resets both copies to empty.
    pub fn clear(&mut self) {
        self.applied = FilterSet::new();
        self.draft = FilterSet::new();
    }
}
