//! Run orchestration: authenticate once, then walk the candidate list one
//! number at a time, strictly in order. One device call is in flight at any
//! moment; the device is a single embedded unit and does not tolerate more.

use std::path::Path;

use harvest_core::{ArtifactPlan, FetchDisposition, NumberJob, RelevantNumber};
use harvest_logging::{harvest_info, harvest_warn};
use serde::Serialize;
use thiserror::Error;

use crate::artifacts::ArtifactSink;
use crate::candidates::{load_candidates, CandidateError};
use crate::device::TransactionSource;
use crate::ledger::{LedgerError, ProcessedLedger};
use crate::persist::PersistError;
use crate::session::{Authenticator, SessionVerdict};
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Candidates(#[from] CandidateError),
    #[error("device rejected the pin (reply {reply:?})")]
    PinRejected { reply: String },
    #[error("device transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("device kept demanding pin re-verification for {number}")]
    ReauthLoop { number: RelevantNumber },
    #[error("could not persist artifacts: {0}")]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Counters for one run, returned to whoever triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Device fetches performed (including re-fetches after re-auth).
    pub fetched: usize,
    /// Candidates skipped because the ledger already held them.
    pub skipped: usize,
    /// Numbers persisted with full invoice/credit-note content.
    pub succeeded: usize,
    /// Numbers persisted as empty placeholders.
    pub empty: usize,
    /// PIN re-verifications performed mid-run.
    pub reauths: usize,
}

/// Drives a whole harvest run over injected collaborators.
pub struct HarvestController<A, D, L, S> {
    authenticator: A,
    device: D,
    ledger: L,
    artifacts: S,
    pin: String,
}

impl<A, D, L, S> HarvestController<A, D, L, S>
where
    A: Authenticator,
    D: TransactionSource,
    L: ProcessedLedger,
    S: ArtifactSink,
{
    pub fn new(authenticator: A, device: D, ledger: L, artifacts: S, pin: impl Into<String>) -> Self {
        Self {
            authenticator,
            device,
            ledger,
            artifacts,
            pin: pin.into(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Loads the candidate document and runs over its numbers.
    ///
    /// A missing or malformed document fails here, before any device call.
    pub async fn run_from_document(&mut self, path: &Path) -> Result<RunReport, HarvestError> {
        let candidates = load_candidates(path)?;
        self.run(&candidates).await
    }

    /// Runs one harvest over `candidates`, in list order.
    ///
    /// Fails fast on a rejected PIN. Any transport failure aborts the rest
    /// of the list; numbers committed before the abort stay committed, so
    /// re-running the whole thing later is safe.
    pub async fn run(&mut self, candidates: &[RelevantNumber]) -> Result<RunReport, HarvestError> {
        self.verify_pin().await?;

        let mut report = RunReport::default();
        for number in candidates {
            if self.ledger.contains(number) {
                harvest_info!("Skipping already processed number {}", number);
                report.skipped += 1;
                continue;
            }
            self.harvest_one(number, &mut report).await?;
        }
        Ok(report)
    }

    async fn verify_pin(&self) -> Result<(), HarvestError> {
        match self.authenticator.authenticate(&self.pin).await? {
            SessionVerdict::Authenticated => Ok(()),
            SessionVerdict::Rejected { reply } => Err(HarvestError::PinRejected { reply }),
        }
    }

    async fn harvest_one(
        &mut self,
        number: &RelevantNumber,
        report: &mut RunReport,
    ) -> Result<(), HarvestError> {
        let mut job = NumberJob::new(number.clone());
        loop {
            let tx = self.device.fetch_transaction(number).await?;
            report.fetched += 1;
            match job.on_fetched(tx) {
                FetchDisposition::Persist(plan) => {
                    self.artifacts.persist(number, &plan)?;
                    job.on_persisted(&plan);
                    // Commit before moving to the next candidate so a crash
                    // loses at most the in-flight number.
                    self.ledger.mark_processed(number)?;
                    job.on_committed();
                    if matches!(plan, ArtifactPlan::Full { .. }) {
                        report.succeeded += 1;
                        harvest_info!("Persisted invoice and credit note for {}", number);
                    } else {
                        report.empty += 1;
                        harvest_info!("No items found or unsuccessful response for {}", number);
                    }
                    return Ok(());
                }
                FetchDisposition::Reauthenticate => {
                    harvest_warn!("Session expired while fetching {}; re-verifying pin", number);
                    report.reauths += 1;
                    self.verify_pin().await?;
                    job.on_session_renewed();
                }
                FetchDisposition::RetryBudgetExhausted => {
                    return Err(HarvestError::ReauthLoop {
                        number: number.clone(),
                    });
                }
            }
        }
    }
}
