//! Canonical invoice view
//!
//! Monetary amounts are kept as decimal text (two fractional digits when
//! computed locally, verbatim when copied from a source document).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_domain_enum_conversions;

/// Where an [`InvoiceRecord`] was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Full structured XML document
    Xml,
    /// Partial metadata from the query endpoint
    JsonFallback,
}

impl_domain_enum_conversions!(DataSource {
    Xml => "xml",
    JsonFallback => "json_fallback",
});

/// Seller or buyer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: Option<String>,
    /// Tax id (NIP for Polish parties, CompanyID for UBL)
    #[serde(rename = "nip")]
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

impl Party {
    /// Build a party, or `None` when every field is blank.
    pub fn from_parts(
        name: Option<String>,
        tax_id: Option<String>,
        address: Option<String>,
    ) -> Option<Self> {
        let party = Self {
            name: non_blank(name),
            tax_id: non_blank(tax_id),
            address: non_blank(address),
        };
        (!party.is_empty()).then_some(party)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.tax_id.is_none() && self.address.is_none()
    }
}

/// One invoice row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub position: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<String>,
    pub net_amount: Option<String>,
    pub vat_rate: Option<String>,
    pub vat_amount: Option<String>,
    pub gross_amount: Option<String>,
}

impl InvoiceLineItem {
    /// True when any field other than the position carries a value.
    ///
    /// Position is excluded because it may be synthesized from the row index.
    pub fn has_content(&self) -> bool {
        [
            &self.description,
            &self.quantity,
            &self.unit,
            &self.unit_price,
            &self.net_amount,
            &self.vat_rate,
            &self.vat_amount,
            &self.gross_amount,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Normalized invoice produced from XML or JSON metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub ksef_number: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_type: Option<String>,
    pub issue_date: Option<String>,
    pub invoicing_date: Option<String>,
    pub payment_due_date: Option<String>,
    pub payment_method: Option<String>,
    pub net_amount: Option<String>,
    pub vat_amount: Option<String>,
    pub gross_amount: Option<String>,
    pub currency: Option<String>,
    pub seller: Option<Party>,
    pub buyer: Option<Party>,
    #[serde(default)]
    pub items: Vec<InvoiceLineItem>,
    /// Raw document; only set for XML-sourced records
    pub xml: Option<String>,
    /// Metadata entry as received; only set for JSON-sourced records
    pub metadata: Option<Value>,
    pub data_source: DataSource,
}

impl InvoiceRecord {
    /// Empty record tagged with `data_source`.
    pub fn empty(data_source: DataSource) -> Self {
        Self {
            ksef_number: None,
            invoice_number: None,
            invoice_type: None,
            issue_date: None,
            invoicing_date: None,
            payment_due_date: None,
            payment_method: None,
            net_amount: None,
            vat_amount: None,
            gross_amount: None,
            currency: None,
            seller: None,
            buyer: None,
            items: Vec::new(),
            xml: None,
            metadata: None,
            data_source,
        }
    }

    /// Whether the full XML document backs this record.
    pub fn has_full_detail(&self) -> bool {
        self.xml.as_deref().is_some_and(|xml| !xml.trim().is_empty())
    }

    pub fn seller_name(&self) -> Option<&str> {
        self.seller.as_ref().and_then(|p| p.name.as_deref())
    }

    pub fn buyer_name(&self) -> Option<&str> {
        self.buyer.as_ref().and_then(|p| p.name.as_deref())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
