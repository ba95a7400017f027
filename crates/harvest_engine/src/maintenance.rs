//! Operator maintenance over the output directories and the ledger.
//!
//! The controller never un-processes a number. These operations are the
//! manual path for re-opening numbers whose invoices came back empty, so a
//! later run can try them again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harvest_core::RelevantNumber;
use harvest_logging::{harvest_info, harvest_warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::ledger::{load_numbers, rewrite_numbers, LedgerError};
use crate::persist::{JsonDocumentWriter, PersistError};

/// File name of the empty-invoice index document.
pub const EMPTY_INVOICE_INDEX: &str = "emptyInvoices.json";

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Summary of one prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneOutcome {
    /// Documents deleted across both output directories.
    pub documents_removed: usize,
    /// Numbers dropped from the ledger, eligible for re-harvest.
    pub numbers_reopened: usize,
}

/// Scans the invoices directory for empty documents (`{}`, or no/empty
/// `items`) and returns their identifiers, sorted. Unparsable files are
/// logged and skipped; a missing directory yields an empty list.
pub fn find_empty_invoices(invoices_dir: &Path) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(invoices_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut empty = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                harvest_warn!("Could not read {:?}: {}", path, err);
                continue;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(document) if is_empty_invoice(&document) => {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    empty.push(stem.to_string());
                }
            }
            Ok(_) => {}
            Err(err) => harvest_warn!("Could not parse {:?}: {}", path, err),
        }
    }
    empty.sort();
    Ok(empty)
}

/// Writes the `{ "emptyInvoices": [...] }` index next to the outputs.
pub fn save_empty_invoice_index(
    data_dir: &Path,
    empty: &[String],
) -> Result<PathBuf, PersistError> {
    #[derive(Serialize)]
    struct EmptyInvoiceIndex<'a> {
        #[serde(rename = "emptyInvoices")]
        empty_invoices: &'a [String],
    }

    JsonDocumentWriter::new(data_dir.to_path_buf()).write(
        EMPTY_INVOICE_INDEX,
        &EmptyInvoiceIndex {
            empty_invoices: empty,
        },
    )
}

/// Deletes the artifact pairs of every empty invoice and drops those
/// numbers from the ledger so they become eligible for re-harvesting.
pub fn prune_empty_artifacts(
    invoices_dir: &Path,
    credit_notes_dir: &Path,
    ledger_path: &Path,
) -> Result<PruneOutcome, MaintenanceError> {
    let empty = find_empty_invoices(invoices_dir)?;
    if empty.is_empty() {
        return Ok(PruneOutcome::default());
    }

    let mut outcome = PruneOutcome::default();
    for number in &empty {
        let filename = format!("{number}.json");
        for dir in [invoices_dir, credit_notes_dir] {
            let path = dir.join(&filename);
            match fs::remove_file(&path) {
                Ok(()) => {
                    outcome.documents_removed += 1;
                    harvest_info!("Deleted empty document {:?}", path);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    outcome.numbers_reopened = remove_from_ledger(ledger_path, &empty)?;
    Ok(outcome)
}

/// Drops `numbers` from the ledger document. Returns how many entries were
/// removed. Operates on the document directly; this is the operator-facing
/// edit, not something the controller ever does.
pub fn remove_from_ledger(ledger_path: &Path, numbers: &[String]) -> Result<usize, LedgerError> {
    let current = load_numbers(ledger_path);
    let retained: Vec<RelevantNumber> = current
        .iter()
        .filter(|entry| !numbers.iter().any(|number| number == entry.as_str()))
        .cloned()
        .collect();

    let removed = current.len() - retained.len();
    if removed > 0 {
        rewrite_numbers(ledger_path, &retained)?;
        harvest_info!("Removed {} numbers from ledger {:?}", removed, ledger_path);
    }
    Ok(removed)
}

/// A document is an empty invoice when it is `{}` or carries no usable
/// items.
fn is_empty_invoice(document: &Value) -> bool {
    match document {
        Value::Object(map) => {
            if map.is_empty() {
                return true;
            }
            match map.get("items") {
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) | None => true,
            }
        }
        _ => true,
    }
}
