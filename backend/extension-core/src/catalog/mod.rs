//! Registry of stable numeric error codes and their default messages.
//!
//! The catalog is built once at startup, validated for uniqueness, and only
//! read afterwards. It can be shared between tasks behind an `Arc` without
//! any locking.

pub mod codes;

pub use codes::{CatalogEntry, DEFAULT_ENTRY, ErrorCode, STANDARD_ENTRIES};

use crate::error::CatalogError;

use common::ErrorLocation;

use std::collections::{BTreeMap, HashMap};

use log::debug;

#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    by_code: BTreeMap<ErrorCode, CatalogEntry>,
    by_name: HashMap<&'static str, ErrorCode>,
    default_message: &'static str,
}

impl ErrorCatalog {
    /// Build a catalog from a fixed set of entries.
    ///
    /// DEFAULT (`-1`) is added when the entries omit it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when two entries share a code or a name.
    #[track_caller]
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_code: BTreeMap<ErrorCode, CatalogEntry> = BTreeMap::new();
        let mut by_name = HashMap::new();

        for entry in entries {
            if let Some(existing) = by_code.get(&entry.code) {
                return Err(CatalogError::DuplicateCode {
                    code: entry.code.0,
                    first: existing.name,
                    second: entry.name,
                    location: ErrorLocation::caller(),
                });
            }
            if by_name.insert(entry.name, entry.code).is_some() {
                return Err(CatalogError::DuplicateName {
                    name: entry.name,
                    location: ErrorLocation::caller(),
                });
            }
            by_code.insert(entry.code, entry);
        }

        if !by_code.contains_key(&ErrorCode::DEFAULT) {
            if by_name.insert(DEFAULT_ENTRY.name, DEFAULT_ENTRY.code).is_some() {
                return Err(CatalogError::DuplicateName {
                    name: DEFAULT_ENTRY.name,
                    location: ErrorLocation::caller(),
                });
            }
            by_code.insert(DEFAULT_ENTRY.code, DEFAULT_ENTRY);
        }

        let default_message = by_code
            .get(&ErrorCode::DEFAULT)
            .map(|entry| entry.message)
            .unwrap_or(DEFAULT_ENTRY.message);

        debug!("Error catalog built with {} codes", by_code.len());

        Ok(Self {
            by_code,
            by_name,
            default_message,
        })
    }

    /// The published code table.
    #[track_caller]
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(STANDARD_ENTRIES.iter().copied())
    }

    /// Registered message, or the DEFAULT message for unknown codes.
    pub fn lookup(&self, code: ErrorCode) -> &'static str {
        self.by_code
            .get(&code)
            .map(|entry| entry.message)
            .unwrap_or(self.default_message)
    }

    /// Canonical text form used in logs and serialized envelopes.
    pub fn describe(&self, code: ErrorCode) -> String {
        code.to_string()
    }

    pub fn name_of(&self, code: ErrorCode) -> Option<&'static str> {
        self.by_code.get(&code).map(|entry| entry.name)
    }

    pub fn code_of(&self, name: &str) -> Option<ErrorCode> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.by_code.contains_key(&code)
    }

    /// Caller detail when present, otherwise the catalog message; falls back
    /// to the DEFAULT message when the code's own message is empty.
    pub fn detail_for(&self, code: ErrorCode, detail: &str) -> String {
        if !detail.trim().is_empty() {
            return detail.to_string();
        }
        let message = self.lookup(code);
        if message.is_empty() {
            self.default_message.to_string()
        } else {
            message.to_string()
        }
    }

    /// Codes in ascending numeric order.
    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.by_code.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
