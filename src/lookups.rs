use std::collections::HashMap;
use std::fmt;

use crate::api::{ApiError, ApiResponse};
use crate::models::{Record, RecordKind};

/// A selectable reference value for pick lists: the related record's key
/// plus something readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOption {
    pub key: String,
    pub label: String,
}

impl fmt::Display for RefOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() || self.label == self.key {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{} ({})", self.label, self.key)
        }
    }
}

/// Every collection a dashboard has fetched, doubling as the lookup tables
/// behind reference pick lists.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    records: HashMap<RecordKind, Vec<Record>>,
}

impl Collections {
    pub fn get(&self, kind: RecordKind) -> &[Record] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, kind: RecordKind, records: Vec<Record>) {
        self.records.insert(kind, records);
    }

    pub fn find(&self, kind: RecordKind, key: &str) -> Option<&Record> {
        self.get(kind).iter().find(|r| r.key(kind) == key)
    }

    pub fn options(&self, kind: RecordKind) -> Vec<RefOption> {
        let display = kind.descriptor().display_field;
        self.get(kind)
            .iter()
            .map(|r| RefOption {
                key: r.key(kind),
                label: r.text(display),
            })
            .filter(|o| !o.key.is_empty())
            .collect()
    }

    pub fn label(&self, kind: RecordKind, key: &str) -> Option<String> {
        self.find(kind, key)
            .map(|r| r.text(kind.descriptor().display_field))
    }

    /// Replaces one collection from a list response. On failure the previous
    /// contents stay in place.
    pub fn absorb(&mut self, kind: RecordKind, response: ApiResponse) -> Result<(), ApiError> {
        let records = response.records()?;
        self.set(kind, records);
        Ok(())
    }
}
