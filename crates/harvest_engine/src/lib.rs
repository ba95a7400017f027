//! Harvest engine: device protocol, durable storage, and run orchestration.
mod artifacts;
mod candidates;
mod controller;
mod device;
mod ledger;
mod maintenance;
mod persist;
mod session;
mod transport;

pub use artifacts::{ArtifactSink, DirectoryArtifactWriter};
pub use candidates::{load_candidates, CandidateError};
pub use controller::{HarvestController, HarvestError, RunReport};
pub use device::{DeviceClient, TransactionSource};
pub use ledger::{JsonFileLedger, LedgerError, MemoryLedger, ProcessedLedger};
pub use maintenance::{
    find_empty_invoices, prune_empty_artifacts, remove_from_ledger, save_empty_invoice_index,
    MaintenanceError, PruneOutcome,
};
pub use persist::{ensure_output_dir, JsonDocumentWriter, PersistError};
pub use session::{Authenticator, PinAuthenticator, SessionVerdict};
pub use transport::{DeviceSettings, TransportError};
