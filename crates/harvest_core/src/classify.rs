//! Decodes device status tags into the closed set of harvest outcomes.
//!
//! The device speaks in string codes; they are interpreted here, once, at
//! the boundary, so nothing downstream compares raw strings.

use crate::{LineItem, RawTransaction};

/// Status tag the device sends on a successful transaction lookup.
pub const STATUS_SUCCESS: &str = "Success";
/// Status tag the device sends when the session has expired.
pub const STATUS_PIN_REQUIRED: &str = "1500";
/// Reply the pin route sends when the PIN was accepted.
pub const PIN_ACCEPTED: &str = "0100";

/// Outcome of classifying one device reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Success tag with at least one line item.
    Success { grand_total: f64 },
    /// Anything that is neither success-with-items nor a re-auth demand.
    /// Persisted as placeholder documents so the attempt is recorded.
    Empty,
    /// The device wants the PIN verified again before it will answer.
    ReauthRequired,
}

/// Classifies a device reply.
pub fn classify(tx: &RawTransaction) -> Classification {
    if tx.messages.as_deref() == Some(STATUS_PIN_REQUIRED) {
        return Classification::ReauthRequired;
    }
    match (tx.messages.as_deref(), tx.items.as_deref()) {
        (Some(STATUS_SUCCESS), Some(items)) if !items.is_empty() => Classification::Success {
            grand_total: grand_total(items),
        },
        _ => Classification::Empty,
    }
}

/// Sum of the line items' total amounts.
pub fn grand_total(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.total_amount).sum()
}
