//! Derivation of the cancellation document for a harvested invoice.

use serde::{Deserialize, Serialize};

use crate::{classify, LineItem, RelevantNumber};

/// Cashier identity stamped on every derived credit note.
pub const CREDIT_NOTE_CASHIER: &str = "ADMIN";
/// Invoice-type tag marking a cancellation document.
pub const CREDIT_NOTE_INVOICE_TYPE: u8 = 0;
/// Transaction-type tag marking a cancellation document.
pub const CREDIT_NOTE_TRANSACTION_TYPE: u8 = 1;
/// Payment kind used to reverse the invoice total.
pub const CREDIT_NOTE_PAYMENT_TYPE: &str = "Cash";

/// Single payment entry on a credit note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub amount: f64,
    #[serde(rename = "paymentType")]
    pub payment_type: String,
}

/// Cancellation document mirroring an invoice's line items, used to reverse
/// it in the fiscal system. Field names follow the device's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNote {
    #[serde(rename = "invoiceType")]
    pub invoice_type: u8,
    #[serde(rename = "transactionType")]
    pub transaction_type: u8,
    pub cashier: String,
    pub items: Vec<LineItem>,
    #[serde(rename = "relevantNumber")]
    pub relevant_number: RelevantNumber,
    pub payment: Vec<PaymentEntry>,
}

/// Builds the cancellation document for an invoice's line items.
///
/// Invariant: the single cash payment equals the sum of the items' amounts.
pub fn derive_credit_note(number: &RelevantNumber, items: &[LineItem]) -> CreditNote {
    CreditNote {
        invoice_type: CREDIT_NOTE_INVOICE_TYPE,
        transaction_type: CREDIT_NOTE_TRANSACTION_TYPE,
        cashier: CREDIT_NOTE_CASHIER.to_string(),
        items: items.to_vec(),
        relevant_number: number.clone(),
        payment: vec![PaymentEntry {
            amount: classify::grand_total(items),
            payment_type: CREDIT_NOTE_PAYMENT_TYPE.to_string(),
        }],
    }
}
