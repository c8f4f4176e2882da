//! Invoice records from metadata query entries
//!
//! Metadata entries carry a subset of the invoice fields. Records built here
//! keep the entry, keys exactly as received, under `metadata` and never
//! carry XML.

use ksef_domain::{DataSource, InvoiceLineItem, InvoiceRecord, KsefError, Party, Result};
use serde_json::Value;

/// Build a record from one metadata entry.
///
/// # Errors
///
/// Returns [`KsefError::Data`] when `raw` is not a JSON object.
pub fn from_json_metadata(raw: &Value) -> Result<InvoiceRecord> {
    if !raw.is_object() {
        return Err(KsefError::Data("Invalid invoice entry".into()));
    }

    let entry = raw.clone();
    let field = |key: &str| scalar_text(entry.get(key));

    let mut record = InvoiceRecord::empty(DataSource::JsonFallback);
    record.ksef_number = field("ksefNumber");
    record.invoice_number = field("invoiceNumber");
    record.invoice_type = field("invoiceType");
    record.issue_date = field("issueDate");
    record.invoicing_date = field("invoicingDate");
    record.payment_due_date = field("paymentDueDate");
    record.payment_method = field("paymentMethod");
    record.net_amount = field("netAmount");
    record.vat_amount = field("vatAmount");
    record.gross_amount = field("grossAmount");
    record.currency = field("currency");
    record.seller = entry.get("seller").and_then(party);
    record.buyer = entry.get("buyer").and_then(party);
    record.items = entry
        .get("items")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().filter_map(line_item).collect())
        .unwrap_or_default();
    record.metadata = Some(entry);

    Ok(record)
}

fn party(value: &Value) -> Option<Party> {
    let tax_id = scalar_text(value.get("nip"))
        .or_else(|| scalar_text(value.pointer("/identifier/value")));
    Party::from_parts(scalar_text(value.get("name")), tax_id, scalar_text(value.get("address")))
}

fn line_item(value: &Value) -> Option<InvoiceLineItem> {
    value.as_object()?;
    let field = |key: &str| scalar_text(value.get(key));

    let item = InvoiceLineItem {
        position: field("position"),
        description: field("description"),
        quantity: field("quantity"),
        unit: field("unit"),
        unit_price: field("unitPrice"),
        net_amount: field("netAmount"),
        vat_rate: field("vatRate"),
        vat_amount: field("vatAmount"),
        gross_amount: field("grossAmount"),
    };
    item.has_content().then_some(item)
}

/// Strings (trimmed, non-empty) and numbers (their JSON text).
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_string),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_non_object_entries() {
        for raw in [json!([]), json!("FV/1"), json!(null)] {
            let err = from_json_metadata(&raw).unwrap_err();
            assert!(matches!(err, KsefError::Data(ref m) if m == "Invalid invoice entry"));
        }
    }

    #[test]
    fn maps_known_fields_and_numbers() {
        let raw = json!({
            "ksefNumber": "5260001246-20250115-ABCDEF-01",
            "invoiceNumber": "FV/1",
            "issueDate": "2025-01-15",
            "netAmount": 150,
            "vatAmount": 34.5,
            "grossAmount": "184.50",
            "currency": "PLN",
            "seller": {"nip": "5260001246", "name": "Sprzedawca"},
            "buyer": {"identifier": {"type": "Nip", "value": "7740001454"}, "name": "Nabywca"}
        });

        let record = from_json_metadata(&raw).unwrap();
        assert_eq!(record.data_source, DataSource::JsonFallback);
        assert_eq!(record.ksef_number.as_deref(), Some("5260001246-20250115-ABCDEF-01"));
        assert_eq!(record.invoice_number.as_deref(), Some("FV/1"));
        assert_eq!(record.net_amount.as_deref(), Some("150"));
        assert_eq!(record.vat_amount.as_deref(), Some("34.5"));
        assert_eq!(record.gross_amount.as_deref(), Some("184.50"));
        assert_eq!(record.seller_name(), Some("Sprzedawca"));
        assert_eq!(record.buyer.as_ref().and_then(|b| b.tax_id.as_deref()), Some("7740001454"));
        assert!(record.xml.is_none());
        assert!(!record.has_full_detail());
    }

    #[test]
    fn keeps_keys_exactly_as_received() {
        let raw = json!({
            "invoiceNumber": "FV/2",
            " invoiceNumber": "padded",
            "buyer": {"name": "Nabywca", "extra": [{" nested ": 1}]},
            "items": [{"description": "Usługa", "netAmount": "10.00"}, {" position": "2"}]
        });

        let record = from_json_metadata(&raw).unwrap();
        assert_eq!(record.invoice_number.as_deref(), Some("FV/2"));
        assert_eq!(record.buyer_name(), Some("Nabywca"));
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].net_amount.as_deref(), Some("10.00"));

        let metadata = record.metadata.unwrap();
        assert_eq!(metadata, raw);
        assert_eq!(metadata[" invoiceNumber"], "padded");
        assert_eq!(metadata["buyer"]["extra"][0][" nested "], 1);
    }

    #[test]
    fn missing_fields_stay_absent() {
        let record = from_json_metadata(&json!({"ksefNumber": "k"})).unwrap();
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.seller, None);
        assert!(record.items.is_empty());
    }
}
