//! Durable set of already-handled relevant numbers.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harvest_core::RelevantNumber;
use harvest_logging::harvest_warn;
use thiserror::Error;

use crate::candidates::scalar_identifier;
use crate::persist::{JsonDocumentWriter, PersistError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("could not rewrite ledger: {0}")]
    Persist(#[from] PersistError),
    #[error("ledger path has no file name: {0}")]
    BadPath(String),
}

/// Membership and idempotent append over the processed set.
///
/// Single-writer: nothing here guards two controllers sharing one ledger
/// document. The deployment must run one instance at a time.
pub trait ProcessedLedger {
    fn contains(&self, number: &RelevantNumber) -> bool;
    /// Appends if absent and persists durably before returning.
    fn mark_processed(&mut self, number: &RelevantNumber) -> Result<(), LedgerError>;
    /// Snapshot of the set, in insertion order.
    fn numbers(&self) -> Vec<RelevantNumber>;
}

/// Ledger backed by a single JSON array document, fully rewritten on every
/// append.
pub struct JsonFileLedger {
    path: PathBuf,
    cache: Vec<RelevantNumber>,
    index: HashSet<RelevantNumber>,
}

impl JsonFileLedger {
    /// Opens the ledger document. A missing or unparsable document is
    /// treated as an empty ledger (logged, not fatal): on this local,
    /// operator-controlled store, availability wins over strictness.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load_numbers(&path);
        let index = cache.iter().cloned().collect();
        Self { path, cache, index }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProcessedLedger for JsonFileLedger {
    fn contains(&self, number: &RelevantNumber) -> bool {
        self.index.contains(number)
    }

    fn mark_processed(&mut self, number: &RelevantNumber) -> Result<(), LedgerError> {
        // Read-modify-write: reload first so a document edited between
        // items (or between runs) is extended, not clobbered.
        let mut current = load_numbers(&self.path);
        if !current.contains(number) {
            current.push(number.clone());
        }
        rewrite_numbers(&self.path, &current)?;
        self.index = current.iter().cloned().collect();
        self.cache = current;
        Ok(())
    }

    fn numbers(&self) -> Vec<RelevantNumber> {
        self.cache.clone()
    }
}

/// In-memory ledger for tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    numbers: Vec<RelevantNumber>,
    index: HashSet<RelevantNumber>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessedLedger for MemoryLedger {
    fn contains(&self, number: &RelevantNumber) -> bool {
        self.index.contains(number)
    }

    fn mark_processed(&mut self, number: &RelevantNumber) -> Result<(), LedgerError> {
        if self.index.insert(number.clone()) {
            self.numbers.push(number.clone());
        }
        Ok(())
    }

    fn numbers(&self) -> Vec<RelevantNumber> {
        self.numbers.clone()
    }
}

pub(crate) fn load_numbers(path: &Path) -> Vec<RelevantNumber> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            harvest_warn!("Failed to read ledger {:?}: {}", path, err);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
        Ok(values) => values.iter().filter_map(scalar_identifier).collect(),
        Err(err) => {
            harvest_warn!("Failed to parse ledger {:?}, treating as empty: {}", path, err);
            Vec::new()
        }
    }
}

pub(crate) fn rewrite_numbers(path: &Path, numbers: &[RelevantNumber]) -> Result<(), LedgerError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LedgerError::BadPath(path.display().to_string()))?;

    JsonDocumentWriter::new(dir).write(filename, &numbers)?;
    Ok(())
}
