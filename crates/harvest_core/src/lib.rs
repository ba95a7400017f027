//! Harvest core: pure transaction model, device-reply classification, and
//! the per-number state machine. No I/O lives here.
mod classify;
mod credit_note;
mod machine;
mod types;

pub use classify::{
    classify, grand_total, Classification, PIN_ACCEPTED, STATUS_PIN_REQUIRED, STATUS_SUCCESS,
};
pub use credit_note::{
    derive_credit_note, CreditNote, PaymentEntry, CREDIT_NOTE_CASHIER, CREDIT_NOTE_INVOICE_TYPE,
    CREDIT_NOTE_PAYMENT_TYPE, CREDIT_NOTE_TRANSACTION_TYPE,
};
pub use machine::{ArtifactPlan, FetchDisposition, JobPhase, NumberJob, MAX_REAUTH_ATTEMPTS};
pub use types::{LineItem, RawTransaction, RelevantNumber};
