//! Invoice XML mapping for the FA (Polish) and UBL dialects
//!
//! Field lookups try FA paths before UBL paths; see [`super::tree`] for the
//! matching rules.

use ksef_domain::{DataSource, InvoiceLineItem, InvoiceRecord, KsefError, Party, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};
use tracing::debug;

use super::{amount, tree};

static NET_SUBTOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^P_13_\d+$").expect("NET_SUBTOTAL should compile - this is a bug"));

static VAT_SUBTOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^P_14_\d+$").expect("VAT_SUBTOTAL should compile - this is a bug"));

const INVOICE_NUMBER: &[&str] = &["Fa/P_2", "Invoice/ID"];
const INVOICE_TYPE: &[&str] = &["Fa/RodzajFaktury", "Invoice/InvoiceTypeCode"];
const ISSUE_DATE: &[&str] = &["Fa/P_1", "Invoice/IssueDate"];
const INVOICING_DATE: &[&str] = &["Fa/P_6", "Invoice/TaxPointDate"];
const PAYMENT_DUE_DATE: &[&str] =
    &["Fa/TerminPlatnosci", "Fa/P_18A", "Invoice/PaymentMeans/PaymentDueDate"];
const PAYMENT_METHOD: &[&str] =
    &["Fa/FormaPlatnosci", "Fa/P_18B", "Invoice/PaymentMeans/PaymentMeansCode"];
const GROSS_TOTAL: &[&str] = &["Invoice/LegalMonetaryTotal/TaxInclusiveAmount", "Fa/P_15"];
const NET_TOTAL: &[&str] = &["Invoice/LegalMonetaryTotal/TaxExclusiveAmount"];
const VAT_TOTAL: &[&str] = &["Invoice/TaxTotal/TaxAmount"];
const CURRENCY: &[&str] = &["Fa/KodWaluty"];

struct PartyPaths {
    name: &'static [&'static str],
    tax_id: &'static [&'static str],
    address: &'static [&'static str],
}

const SELLER: PartyPaths = PartyPaths {
    name: &[
        "Podmiot1/DaneIdentyfikacyjne/Nazwa",
        "Invoice/AccountingSupplierParty/Party/PartyName/Name",
    ],
    tax_id: &[
        "Podmiot1/DaneIdentyfikacyjne/NIP",
        "Invoice/AccountingSupplierParty/Party/PartyTaxScheme/CompanyID",
    ],
    address: &["Podmiot1/Adres", "Invoice/AccountingSupplierParty/Party/PostalAddress"],
};

const BUYER: PartyPaths = PartyPaths {
    name: &[
        "Podmiot2/DaneIdentyfikacyjne/Nazwa",
        "Invoice/AccountingCustomerParty/Party/PartyName/Name",
    ],
    tax_id: &[
        "Podmiot2/DaneIdentyfikacyjne/NIP",
        "Invoice/AccountingCustomerParty/Party/PartyTaxScheme/CompanyID",
    ],
    address: &["Podmiot2/Adres", "Invoice/AccountingCustomerParty/Party/PostalAddress"],
};

/// Maps one invoice document to an [`InvoiceRecord`]
#[derive(Debug, Clone)]
pub struct InvoiceXmlMapper {
    ksef_number: String,
}

impl InvoiceXmlMapper {
    /// Mapper for the invoice identified by `ksef_number`.
    pub fn new(ksef_number: impl Into<String>) -> Self {
        Self { ksef_number: ksef_number.into() }
    }

    /// Parse and map `xml`.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::Data`] when the document is not well-formed.
    pub fn map(&self, xml: &str) -> Result<InvoiceRecord> {
        let doc = Document::parse(xml)
            .map_err(|err| KsefError::Data(format!("Invalid invoice XML: {err}")))?;
        let root = doc.root_element();

        let gross_node = tree::find_any(root, GROSS_TOTAL);
        let net_amount = tree::text_at(root, NET_TOTAL)
            .or_else(|| tree::sum_matching(root, &NET_SUBTOTAL).map(amount::format));
        let vat_amount = tree::text_at(root, VAT_TOTAL)
            .or_else(|| tree::sum_matching(root, &VAT_SUBTOTAL).map(amount::format));
        let currency = tree::text_at(root, CURRENCY)
            .or_else(|| gross_node.and_then(|node| tree::attribute_of(node, "currencyID")));

        let items = extract_items(root);
        debug!(
            ksef_number = %self.ksef_number,
            root = root.tag_name().name(),
            items = items.len(),
            "Mapped invoice XML"
        );

        Ok(InvoiceRecord {
            ksef_number: Some(self.ksef_number.clone()).filter(|n| !n.trim().is_empty()),
            invoice_number: tree::text_at(root, INVOICE_NUMBER),
            invoice_type: tree::text_at(root, INVOICE_TYPE),
            issue_date: tree::text_at(root, ISSUE_DATE),
            invoicing_date: tree::text_at(root, INVOICING_DATE),
            payment_due_date: tree::text_at(root, PAYMENT_DUE_DATE),
            payment_method: tree::text_at(root, PAYMENT_METHOD),
            net_amount,
            vat_amount,
            gross_amount: gross_node.and_then(tree::text_of),
            currency,
            seller: extract_party(root, &SELLER),
            buyer: extract_party(root, &BUYER),
            items,
            xml: Some(xml.to_string()),
            metadata: None,
            data_source: DataSource::Xml,
        })
    }
}

/// Map `xml` for the invoice `ksef_number`.
///
/// # Errors
///
/// Returns [`KsefError::Data`] when the document is not well-formed.
pub fn from_xml(ksef_number: &str, xml: &str) -> Result<InvoiceRecord> {
    InvoiceXmlMapper::new(ksef_number).map(xml)
}

fn extract_party(root: Node<'_, '_>, paths: &PartyPaths) -> Option<Party> {
    Party::from_parts(
        tree::text_at(root, paths.name),
        tree::text_at(root, paths.tax_id),
        tree::find_any(root, paths.address).and_then(compose_address),
    )
}

fn compose_address(node: Node<'_, '_>) -> Option<String> {
    let text = |paths: &[&str]| tree::first_text(node, paths);

    let street = text(&["Ulica", "StreetName"]);
    let building = text(&["NrDomu", "BuildingNumber"]);
    let apartment = text(&["NrLokalu"]);
    let postal_code = text(&["KodPocztowy", "PostalZone"]);
    let city = text(&["Miejscowosc", "CityName"]);
    let post_office = text(&["Poczta"]);
    let municipality = text(&["Gmina"]);
    let county = text(&["Powiat"]);
    let province = text(&["Wojewodztwo", "CountrySubentity"]);
    let country =
        text(&["KodKraju", "Country/IdentificationCode", "IdentificationCode", "CountryCode"]);

    let mut street_line = join_present(&[street, building], " ");
    if let Some(apartment) = apartment {
        street_line =
            if street_line.is_empty() { apartment } else { format!("{street_line}/{apartment}") };
    }
    let locality_line = join_present(&[postal_code, city], " ");
    let region_line = join_present(&[municipality, county, province], ", ");

    let parts: Vec<String> = [
        Some(street_line),
        Some(locality_line),
        post_office,
        Some(region_line),
        country,
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

fn join_present(values: &[Option<String>], separator: &str) -> String {
    values.iter().flatten().map(String::as_str).collect::<Vec<_>>().join(separator)
}

fn extract_items(root: Node<'_, '_>) -> Vec<InvoiceLineItem> {
    let fa_rows = tree::elements_named(root, "FaWiersz");
    let items: Vec<InvoiceLineItem> = if fa_rows.is_empty() {
        tree::elements_named(root, "InvoiceLine").into_iter().map(map_ubl_row).collect()
    } else {
        fa_rows.into_iter().enumerate().map(|(index, row)| map_fa_row(row, index + 1)).collect()
    };

    items.into_iter().filter(InvoiceLineItem::has_content).collect()
}

fn map_fa_row(row: Node<'_, '_>, fallback_position: usize) -> InvoiceLineItem {
    let text = |paths: &[&str]| tree::first_text(row, paths);

    InvoiceLineItem {
        position: text(&["NrWierszaFa", "LpFa"]).or_else(|| Some(fallback_position.to_string())),
        description: text(&["P_7", "NazwaTowaruUslugi"]),
        quantity: text(&["P_8B", "Ilosc"]),
        unit: text(&["P_8A", "JednostkaMiary"]),
        unit_price: text(&["P_9A", "CenaJednostkowaNetto", "CenaJednostkowa"]),
        net_amount: text(&["P_11", "WartoscNetto"]),
        vat_rate: text(&["P_12", "StawkaPodatku"]),
        vat_amount: text(&["P_11Vat", "KwotaVat", "KwotaPodatku"]),
        gross_amount: text(&["P_11A", "WartoscBrutto"]),
    }
}

fn map_ubl_row(row: Node<'_, '_>) -> InvoiceLineItem {
    let text = |paths: &[&str]| tree::first_text(row, paths);

    let quantity_node = tree::find(row, "InvoicedQuantity");
    let net_amount = text(&["LineExtensionAmount"]);
    let vat_amount = text(&["TaxTotal/TaxAmount"]);
    let gross_amount = amount::sum_texts(net_amount.as_deref(), vat_amount.as_deref());

    InvoiceLineItem {
        position: text(&["ID"]),
        description: text(&["Item/Name"]),
        quantity: quantity_node.and_then(tree::text_of),
        unit: quantity_node.and_then(|node| tree::attribute_of(node, "unitCode")),
        unit_price: tree::find(row, "Price/PriceAmount").and_then(tree::text_of),
        net_amount,
        vat_rate: text(&["Item/ClassifiedTaxCategory/Percent"]),
        vat_amount,
        gross_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FA_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Faktura xmlns="http://crd.gov.pl/wzor/2023/06/29/12648/">
  <Podmiot1>
    <DaneIdentyfikacyjne>
      <NIP>5260001246</NIP>
      <Nazwa>Sprzedawca Sp. z o.o.</Nazwa>
    </DaneIdentyfikacyjne>
    <Adres>
      <KodKraju>PL</KodKraju>
      <Ulica>Marszałkowska</Ulica>
      <NrDomu>10</NrDomu>
      <NrLokalu>5</NrLokalu>
      <KodPocztowy>00-001</KodPocztowy>
      <Miejscowosc>Warszawa</Miejscowosc>
      <Gmina>Warszawa</Gmina>
      <Wojewodztwo>mazowieckie</Wojewodztwo>
    </Adres>
  </Podmiot1>
  <Podmiot2>
    <DaneIdentyfikacyjne>
      <NIP>7740001454</NIP>
      <Nazwa>Nabywca S.A.</Nazwa>
    </DaneIdentyfikacyjne>
  </Podmiot2>
  <Fa>
    <KodWaluty>PLN</KodWaluty>
    <P_1>2025-01-15</P_1>
    <P_2>FV/2025/01/001</P_2>
    <P_6>2025-01-14</P_6>
    <P_13_1>100.00</P_13_1>
    <P_14_1>23.00</P_14_1>
    <P_13_2>50,00</P_13_2>
    <P_14_2>11.50</P_14_2>
    <P_15>184.50</P_15>
    <RodzajFaktury>VAT</RodzajFaktury>
    <FaWiersz>
      <NrWierszaFa>1</NrWierszaFa>
      <P_7>Usługa doradcza</P_7>
      <P_8A>godz.</P_8A>
      <P_8B>2</P_8B>
      <P_9A>50.00</P_9A>
      <P_11>100.00</P_11>
      <P_12>23</P_12>
    </FaWiersz>
    <FaWiersz>
      <P_7>Licencja</P_7>
      <P_11>50.00</P_11>
      <P_12>23</P_12>
    </FaWiersz>
    <FaWiersz>
      <NrWierszaFa>3</NrWierszaFa>
    </FaWiersz>
    <TerminPlatnosci>2025-02-14</TerminPlatnosci>
    <FormaPlatnosci>6</FormaPlatnosci>
  </Fa>
</Faktura>"#;

    const UBL_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
         xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
         xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:ID>INV-2025-42</cbc:ID>
  <cbc:IssueDate>2025-01-15</cbc:IssueDate>
  <cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>
  <cbc:TaxPointDate>2025-01-14</cbc:TaxPointDate>
  <cac:AccountingSupplierParty>
    <cac:Party>
      <cac:PartyName><cbc:Name>Supplier GmbH</cbc:Name></cac:PartyName>
      <cac:PostalAddress>
        <cbc:StreetName>Hauptstrasse</cbc:StreetName>
        <cbc:BuildingNumber>1</cbc:BuildingNumber>
        <cbc:CityName>Berlin</cbc:CityName>
        <cbc:PostalZone>10115</cbc:PostalZone>
        <cac:Country><cbc:IdentificationCode>DE</cbc:IdentificationCode></cac:Country>
      </cac:PostalAddress>
      <cac:PartyTaxScheme><cbc:CompanyID>DE123456789</cbc:CompanyID></cac:PartyTaxScheme>
    </cac:Party>
  </cac:AccountingSupplierParty>
  <cac:AccountingCustomerParty>
    <cac:Party>
      <cac:PartyName><cbc:Name>Customer Ltd</cbc:Name></cac:PartyName>
    </cac:Party>
  </cac:AccountingCustomerParty>
  <cac:PaymentMeans>
    <cbc:PaymentMeansCode>58</cbc:PaymentMeansCode>
    <cbc:PaymentDueDate>2025-02-14</cbc:PaymentDueDate>
  </cac:PaymentMeans>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="EUR">34.50</cbc:TaxAmount>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:TaxExclusiveAmount currencyID="EUR">150.00</cbc:TaxExclusiveAmount>
    <cbc:TaxInclusiveAmount currencyID="EUR">184.50</cbc:TaxInclusiveAmount>
  </cac:LegalMonetaryTotal>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
    <cbc:InvoicedQuantity unitCode="HUR">2</cbc:InvoicedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">100.00</cbc:LineExtensionAmount>
    <cac:TaxTotal><cbc:TaxAmount currencyID="EUR">23.00</cbc:TaxAmount></cac:TaxTotal>
    <cac:Item>
      <cbc:Name>Consulting</cbc:Name>
      <cac:ClassifiedTaxCategory><cbc:Percent>23</cbc:Percent></cac:ClassifiedTaxCategory>
    </cac:Item>
    <cac:Price><cbc:PriceAmount currencyID="EUR">50.00</cbc:PriceAmount></cac:Price>
  </cac:InvoiceLine>
  <cac:InvoiceLine>
    <cbc:ID>2</cbc:ID>
    <cbc:LineExtensionAmount currencyID="EUR">50.00</cbc:LineExtensionAmount>
    <cac:Item><cbc:Name>License</cbc:Name></cac:Item>
  </cac:InvoiceLine>
</Invoice>"#;

    #[test]
    fn maps_fa_header_fields() {
        let record =
            InvoiceXmlMapper::new("5260001246-20250115-ABCDEF-01").map(FA_INVOICE).unwrap();

        assert_eq!(record.ksef_number.as_deref(), Some("5260001246-20250115-ABCDEF-01"));
        assert_eq!(record.invoice_number.as_deref(), Some("FV/2025/01/001"));
        assert_eq!(record.invoice_type.as_deref(), Some("VAT"));
        assert_eq!(record.issue_date.as_deref(), Some("2025-01-15"));
        assert_eq!(record.invoicing_date.as_deref(), Some("2025-01-14"));
        assert_eq!(record.payment_due_date.as_deref(), Some("2025-02-14"));
        assert_eq!(record.payment_method.as_deref(), Some("6"));
        assert_eq!(record.currency.as_deref(), Some("PLN"));
        assert_eq!(record.data_source, DataSource::Xml);
        assert_eq!(record.xml.as_deref(), Some(FA_INVOICE));
        assert!(record.has_full_detail());
    }

    #[test]
    fn sums_fa_subtotals_with_two_decimals() {
        let record = from_xml("ksef-1", FA_INVOICE).unwrap();

        assert_eq!(record.net_amount.as_deref(), Some("150.00"));
        assert_eq!(record.vat_amount.as_deref(), Some("34.50"));
        assert_eq!(record.gross_amount.as_deref(), Some("184.50"));
    }

    #[test]
    fn composes_fa_parties() {
        let record = from_xml("ksef-1", FA_INVOICE).unwrap();

        let seller = record.seller.as_ref().unwrap();
        assert_eq!(seller.name.as_deref(), Some("Sprzedawca Sp. z o.o."));
        assert_eq!(seller.tax_id.as_deref(), Some("5260001246"));
        assert_eq!(
            seller.address.as_deref(),
            Some("Marszałkowska 10/5, 00-001 Warszawa, Warszawa, mazowieckie, PL")
        );

        let buyer = record.buyer.unwrap();
        assert_eq!(buyer.name.as_deref(), Some("Nabywca S.A."));
        assert_eq!(buyer.address, None);
    }

    #[test]
    fn maps_fa_rows_and_drops_empty_ones() {
        let record = from_xml("ksef-1", FA_INVOICE).unwrap();

        assert_eq!(record.items.len(), 2);
        let first = &record.items[0];
        assert_eq!(first.position.as_deref(), Some("1"));
        assert_eq!(first.description.as_deref(), Some("Usługa doradcza"));
        assert_eq!(first.quantity.as_deref(), Some("2"));
        assert_eq!(first.unit.as_deref(), Some("godz."));
        assert_eq!(first.unit_price.as_deref(), Some("50.00"));
        assert_eq!(first.net_amount.as_deref(), Some("100.00"));
        assert_eq!(first.vat_rate.as_deref(), Some("23"));

        assert_eq!(record.items[1].position.as_deref(), Some("2"));
        assert_eq!(record.items[1].description.as_deref(), Some("Licencja"));
    }

    #[test]
    fn maps_ubl_document() {
        let record = from_xml("ksef-2", UBL_INVOICE).unwrap();

        assert_eq!(record.invoice_number.as_deref(), Some("INV-2025-42"));
        assert_eq!(record.invoice_type.as_deref(), Some("380"));
        assert_eq!(record.issue_date.as_deref(), Some("2025-01-15"));
        assert_eq!(record.invoicing_date.as_deref(), Some("2025-01-14"));
        assert_eq!(record.payment_due_date.as_deref(), Some("2025-02-14"));
        assert_eq!(record.payment_method.as_deref(), Some("58"));
        assert_eq!(record.net_amount.as_deref(), Some("150.00"));
        assert_eq!(record.vat_amount.as_deref(), Some("34.50"));
        assert_eq!(record.gross_amount.as_deref(), Some("184.50"));
        assert_eq!(record.currency.as_deref(), Some("EUR"));

        let seller = record.seller.as_ref().unwrap();
        assert_eq!(seller.name.as_deref(), Some("Supplier GmbH"));
        assert_eq!(seller.tax_id.as_deref(), Some("DE123456789"));
        assert_eq!(seller.address.as_deref(), Some("Hauptstrasse 1, 10115 Berlin, DE"));
        assert_eq!(record.buyer_name(), Some("Customer Ltd"));
    }

    #[test]
    fn ubl_lines_compute_gross_from_net_and_vat() {
        let record = from_xml("ksef-2", UBL_INVOICE).unwrap();

        assert_eq!(record.items.len(), 2);
        let first = &record.items[0];
        assert_eq!(first.position.as_deref(), Some("1"));
        assert_eq!(first.description.as_deref(), Some("Consulting"));
        assert_eq!(first.quantity.as_deref(), Some("2"));
        assert_eq!(first.unit.as_deref(), Some("HUR"));
        assert_eq!(first.unit_price.as_deref(), Some("50.00"));
        assert_eq!(first.vat_rate.as_deref(), Some("23"));
        assert_eq!(first.gross_amount.as_deref(), Some("123.00"));

        assert_eq!(record.items[1].gross_amount, None);
    }

    #[test]
    fn dialects_agree_on_equivalent_invoices() {
        let fa = from_xml("k", FA_INVOICE).unwrap();
        let ubl = from_xml("k", UBL_INVOICE).unwrap();

        assert_eq!(fa.net_amount, ubl.net_amount);
        assert_eq!(fa.vat_amount, ubl.vat_amount);
        assert_eq!(fa.gross_amount, ubl.gross_amount);
        assert_eq!(fa.issue_date, ubl.issue_date);
        assert_eq!(fa.items.len(), ubl.items.len());
    }

    #[test]
    fn currency_falls_back_to_gross_attribute() {
        let xml = r#"<Invoice><LegalMonetaryTotal><TaxInclusiveAmount currencyID=" USD ">10</TaxInclusiveAmount></LegalMonetaryTotal></Invoice>"#;
        let record = from_xml("k", xml).unwrap();
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert!(record.items.is_empty());
    }

    #[test]
    fn apartment_without_street_stands_alone() {
        let xml = "<Faktura><Podmiot2><Adres><NrLokalu>7</NrLokalu><Miejscowosc>Kraków</Miejscowosc></Adres></Podmiot2></Faktura>";
        let record = from_xml("k", xml).unwrap();
        assert_eq!(record.buyer.unwrap().address.as_deref(), Some("7, Kraków"));
        assert!(record.seller.is_none());
    }

    #[test]
    fn overflowing_fa_subtotals_leave_net_unset() {
        let xml = "<Faktura><Fa><P_13_1>79228162514264337593543950335</P_13_1>\
                   <P_13_2>1</P_13_2><P_14_1>5</P_14_1></Fa></Faktura>";
        let record = from_xml("k", xml).unwrap();

        assert_eq!(record.net_amount, None);
        assert_eq!(record.vat_amount.as_deref(), Some("5.00"));
    }

    #[test]
    fn overflowing_ubl_line_leaves_gross_unset() {
        let xml = "<Invoice><InvoiceLine><ID>1</ID>\
                   <LineExtensionAmount>79228162514264337593543950335</LineExtensionAmount>\
                   <TaxTotal><TaxAmount>1</TaxAmount></TaxTotal></InvoiceLine></Invoice>";
        let record = from_xml("k", xml).unwrap();

        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].vat_amount.as_deref(), Some("1"));
        assert_eq!(record.items[0].gross_amount, None);
    }

    #[test]
    fn malformed_xml_is_a_data_error() {
        let err = from_xml("k", "<Faktura><Fa>").unwrap_err();
        assert!(matches!(err, KsefError::Data(ref m) if m.starts_with("Invalid invoice XML: ")));
    }
}
