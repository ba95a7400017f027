use std::sync::Once;

use harvest_core::{
    derive_credit_note, grand_total, LineItem, RelevantNumber, CREDIT_NOTE_CASHIER,
    CREDIT_NOTE_INVOICE_TYPE, CREDIT_NOTE_PAYMENT_TYPE, CREDIT_NOTE_TRANSACTION_TYPE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(harvest_logging::initialize_for_tests);
}

fn items(amounts: &[f64]) -> Vec<LineItem> {
    amounts.iter().copied().map(LineItem::new).collect()
}

#[test]
fn payment_equals_sum_of_item_amounts() {
    init_logging();
    let items = items(&[10.0, 5.0]);
    let note = derive_credit_note(&RelevantNumber::from("A1"), &items);

    assert_eq!(note.payment.len(), 1);
    assert_eq!(note.payment[0].amount, 15.0);
    assert_eq!(note.payment[0].amount, grand_total(&note.items));
    assert_eq!(note.payment[0].payment_type, CREDIT_NOTE_PAYMENT_TYPE);
}

#[test]
fn items_mirror_the_invoice_exactly() {
    init_logging();
    let mut first = LineItem::new(3.0);
    first
        .extra
        .insert("description".into(), serde_json::json!("Espresso"));
    let source = vec![first, LineItem::new(4.5)];

    let note = derive_credit_note(&RelevantNumber::from("A7"), &source);

    assert_eq!(note.items, source);
}

#[test]
fn cancellation_tags_and_cashier_are_fixed() {
    init_logging();
    let note = derive_credit_note(&RelevantNumber::from("Z9"), &items(&[1.0]));

    assert_eq!(note.invoice_type, CREDIT_NOTE_INVOICE_TYPE);
    assert_eq!(note.transaction_type, CREDIT_NOTE_TRANSACTION_TYPE);
    assert_eq!(note.cashier, CREDIT_NOTE_CASHIER);
    assert_eq!(note.relevant_number, RelevantNumber::from("Z9"));
}

#[test]
fn serializes_with_device_field_names() {
    init_logging();
    let note = derive_credit_note(&RelevantNumber::from("B2"), &items(&[20.0]));
    let value = serde_json::to_value(&note).unwrap();

    assert_eq!(value["invoiceType"], serde_json::json!(0));
    assert_eq!(value["transactionType"], serde_json::json!(1));
    assert_eq!(value["cashier"], serde_json::json!("ADMIN"));
    assert_eq!(value["relevantNumber"], serde_json::json!("B2"));
    assert_eq!(value["payment"][0]["paymentType"], serde_json::json!("Cash"));
    assert_eq!(value["payment"][0]["amount"], serde_json::json!(20.0));
}
