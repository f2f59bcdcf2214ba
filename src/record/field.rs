use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::NOT_AVAILABLE;

/// Which data source populated a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Accounting database. Authoritative on conflict.
    Accounting,
    /// Live scheduler state or its epilog snapshot. Used as a substitute for
    /// fields accounting does not carry.
    LiveState,
}

/// A single report attribute.
///
/// `NotAvailable` means no source ever populated the field and is distinct
/// from a source reporting an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    NotAvailable,
    Reported { value: String, source: FieldSource },
}

impl Field {
    pub fn accounting(value: impl Into<String>) -> Self {
        Field::Reported {
            value: value.into(),
            source: FieldSource::Accounting,
        }
    }

    pub fn live_state(value: impl Into<String>) -> Self {
        Field::Reported {
            value: value.into(),
            source: FieldSource::LiveState,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Field::NotAvailable => None,
            Field::Reported { value, .. } => Some(value),
        }
    }

    pub fn source(&self) -> Option<FieldSource> {
        match self {
            Field::NotAvailable => None,
            Field::Reported { source, .. } => Some(*source),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Field::Reported { .. })
    }

    /// True when the value came from the live-state source.
    pub fn is_substitute(&self) -> bool {
        self.source() == Some(FieldSource::LiveState)
    }

    pub fn display_or<'a>(&'a self, not_available: &'a str) -> &'a str {
        self.value().unwrap_or(not_available)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_or(NOT_AVAILABLE))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::NotAvailable => serializer.serialize_none(),
            Field::Reported { value, .. } => serializer.serialize_str(value),
        }
    }
}
