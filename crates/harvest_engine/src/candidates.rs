//! Loads the candidate list document produced by the external spreadsheet
//! conversion step.

use std::fs;
use std::io;
use std::path::Path;

use harvest_core::RelevantNumber;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("candidate list not found at {0}")]
    Missing(String),
    #[error("could not read candidate list: {0}")]
    Unreadable(#[from] io::Error),
    #[error("could not parse candidate list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("candidate list contains no numbers")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CandidateDocument {
    numbers: Vec<serde_json::Value>,
}

/// Reads a `{ "numbers": [...] }` document. Entries may be strings or bare
/// numbers; both are normalized to trimmed strings and blank entries are
/// dropped. Duplicates are kept as-is: the ledger makes them harmless.
pub fn load_candidates(path: &Path) -> Result<Vec<RelevantNumber>, CandidateError> {
    if !path.exists() {
        return Err(CandidateError::Missing(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let document: CandidateDocument = serde_json::from_str(&content)?;

    let numbers: Vec<RelevantNumber> = document
        .numbers
        .iter()
        .filter_map(scalar_identifier)
        .collect();
    if numbers.is_empty() {
        return Err(CandidateError::Empty);
    }
    Ok(numbers)
}

/// Accepts string or numeric scalars; anything else is not an identifier.
pub(crate) fn scalar_identifier(value: &serde_json::Value) -> Option<RelevantNumber> {
    match value {
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| RelevantNumber::from(trimmed))
        }
        serde_json::Value::Number(number) => Some(RelevantNumber::new(number.to_string())),
        _ => None,
    }
}
