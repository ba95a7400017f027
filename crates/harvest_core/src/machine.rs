//! Per-number harvest lifecycle.
//!
//! Each relevant number is fetched, persisted, and committed to the ledger
//! exactly once. A session-expiry reply loops the number back for a fresh
//! fetch after re-verification, bounded by a retry budget so a device that
//! keeps demanding the PIN cannot spin the run forever.

use crate::{classify, derive_credit_note, Classification, CreditNote, RawTransaction, RelevantNumber};

/// Upper bound on PIN re-verification cycles for a single number.
pub const MAX_REAUTH_ATTEMPTS: u32 = 3;

/// Lifecycle phase of a single relevant number within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Not yet fetched (or waiting for a re-fetch after re-verification).
    Pending,
    /// Device reply received, not yet acted on.
    Fetched,
    /// Invoice and credit note written with full content.
    PersistedSuccess,
    /// Placeholder documents written.
    PersistedEmpty,
    /// Waiting for the session to be re-established.
    ReauthPending,
    /// Committed to the processed ledger. Terminal.
    MarkedProcessed,
}

/// Documents to write for one number.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPlan {
    /// Verbatim invoice plus its derived cancellation document.
    Full {
        invoice: RawTransaction,
        credit_note: CreditNote,
    },
    /// Both documents written as `{}`; their presence records the attempt.
    EmptyPlaceholders,
}

/// What the controller must do next after a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchDisposition {
    /// Write the artifacts, then commit the number to the ledger.
    Persist(ArtifactPlan),
    /// Re-verify the PIN, then fetch this same number again.
    Reauthenticate,
    /// The device demanded re-verification more times than the budget allows.
    RetryBudgetExhausted,
}

/// Tracks one relevant number through a run.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberJob {
    number: RelevantNumber,
    phase: JobPhase,
    reauth_attempts: u32,
}

impl NumberJob {
    pub fn new(number: RelevantNumber) -> Self {
        Self {
            number,
            phase: JobPhase::Pending,
            reauth_attempts: 0,
        }
    }

    pub fn number(&self) -> &RelevantNumber {
        &self.number
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn reauth_attempts(&self) -> u32 {
        self.reauth_attempts
    }

    /// Applies the device reply and decides the next step.
    pub fn on_fetched(&mut self, tx: RawTransaction) -> FetchDisposition {
        self.phase = JobPhase::Fetched;
        match classify::classify(&tx) {
            Classification::Success { .. } => {
                let items = tx.items.as_deref().unwrap_or_default();
                let credit_note = derive_credit_note(&self.number, items);
                FetchDisposition::Persist(ArtifactPlan::Full {
                    invoice: tx,
                    credit_note,
                })
            }
            Classification::Empty => FetchDisposition::Persist(ArtifactPlan::EmptyPlaceholders),
            Classification::ReauthRequired => {
                if self.reauth_attempts >= MAX_REAUTH_ATTEMPTS {
                    FetchDisposition::RetryBudgetExhausted
                } else {
                    self.reauth_attempts += 1;
                    self.phase = JobPhase::ReauthPending;
                    FetchDisposition::Reauthenticate
                }
            }
        }
    }

    /// Records that the artifacts for this number were written.
    pub fn on_persisted(&mut self, plan: &ArtifactPlan) {
        self.phase = match plan {
            ArtifactPlan::Full { .. } => JobPhase::PersistedSuccess,
            ArtifactPlan::EmptyPlaceholders => JobPhase::PersistedEmpty,
        };
    }

    /// Records the ledger commit; the job is now terminal.
    pub fn on_committed(&mut self) {
        self.phase = JobPhase::MarkedProcessed;
    }

    /// Re-verification succeeded; the number goes back to pending for a
    /// fresh fetch.
    pub fn on_session_renewed(&mut self) {
        self.phase = JobPhase::Pending;
    }
}
