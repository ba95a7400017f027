//! Writes the invoice and credit-note documents for one relevant number.

use std::path::PathBuf;

use harvest_core::{ArtifactPlan, RelevantNumber};
use serde_json::json;

use crate::persist::{JsonDocumentWriter, PersistError};

/// Sink for the per-number artifact pair.
pub trait ArtifactSink {
    /// Writes both documents under the number's key.
    fn persist(&self, number: &RelevantNumber, plan: &ArtifactPlan) -> Result<(), PersistError>;
}

/// Writes `{number}.json` into an invoices directory and a credit-notes
/// directory.
pub struct DirectoryArtifactWriter {
    invoices: JsonDocumentWriter,
    credit_notes: JsonDocumentWriter,
}

impl DirectoryArtifactWriter {
    pub fn new(invoices_dir: PathBuf, credit_notes_dir: PathBuf) -> Self {
        Self {
            invoices: JsonDocumentWriter::new(invoices_dir),
            credit_notes: JsonDocumentWriter::new(credit_notes_dir),
        }
    }
}

impl ArtifactSink for DirectoryArtifactWriter {
    fn persist(&self, number: &RelevantNumber, plan: &ArtifactPlan) -> Result<(), PersistError> {
        let filename = format!("{number}.json");
        match plan {
            ArtifactPlan::Full {
                invoice,
                credit_note,
            } => {
                self.invoices.write(&filename, invoice)?;
                self.credit_notes.write(&filename, credit_note)?;
            }
            ArtifactPlan::EmptyPlaceholders => {
                // `{}` rather than no file: presence records the attempt.
                self.invoices.write(&filename, &json!({}))?;
                self.credit_notes.write(&filename, &json!({}))?;
            }
        }
        Ok(())
    }
}
