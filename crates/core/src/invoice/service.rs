//! Invoice lookup service - metadata queries and single-document fetches

use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use ksef_domain::constants::{
    DATE_TYPE_PERMANENT_STORAGE, DEFAULT_QUERY_WINDOW_DAYS, PATH_INVOICES_BY_KSEF_NUMBER,
    PATH_INVOICES_QUERY_METADATA, SUBJECT_TYPE_BUYER,
};
use ksef_domain::{Bearer, InvoiceRecord, KsefError, Result, XmlResponse};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::metadata::from_json_metadata;
use super::xml::InvoiceXmlMapper;
use crate::api::payload::payload_error;
use crate::api::ports::KsefApi;

/// Metadata query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub subject_type: String,
    pub date_type: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl InvoiceQuery {
    /// Buyer-side query over the default window ending at `now`.
    pub fn recent(now: DateTime<Utc>) -> Self {
        Self::last_days(now, DEFAULT_QUERY_WINDOW_DAYS)
    }

    /// Buyer-side query over the `days` before `now`.
    pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            subject_type: SUBJECT_TYPE_BUYER.to_string(),
            date_type: DATE_TYPE_PERMANENT_STORAGE.to_string(),
            from: now - Duration::days(days),
            to: now,
        }
    }

    pub fn with_subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.subject_type = subject_type.into();
        self
    }

    /// Request body for the metadata endpoint.
    pub fn to_body(&self) -> Value {
        json!({
            "subjectType": self.subject_type,
            "dateRange": {
                "dateType": self.date_type,
                "from": self.from.to_rfc3339_opts(SecondsFormat::Secs, true),
                "to": self.to.to_rfc3339_opts(SecondsFormat::Secs, true),
            }
        })
    }
}

/// Invoice lookups over the KSeF API
pub struct InvoiceService {
    api: Arc<dyn KsefApi>,
}

impl InvoiceService {
    pub fn new(api: Arc<dyn KsefApi>) -> Self {
        Self { api }
    }

    /// Query invoice metadata and map each entry.
    ///
    /// # Errors
    ///
    /// - [`KsefError::InvalidInput`] when the date range is inverted
    /// - [`KsefError::Data`] for error payloads and malformed responses
    /// - [`KsefError::Transport`] when the request never got a response
    pub fn find_all(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceRecord>> {
        if query.from > query.to {
            return Err(KsefError::InvalidInput("query range starts after it ends".into()));
        }

        let body = query.to_body();
        let response = self.api.post(PATH_INVOICES_QUERY_METADATA, Some(&body), Bearer::Default)?;
        if let Some(error) = payload_error(&response) {
            return Err(KsefError::Data(error));
        }
        let Some(body) = response.as_object() else {
            return Err(KsefError::Data("Invalid invoice list response".into()));
        };

        let records = match body.get("invoices") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => {
                entries.iter().map(from_json_metadata).collect::<Result<Vec<_>>>()?
            }
            Some(_) => return Err(KsefError::Data("Invalid invoices payload".into())),
        };

        info!(
            count = records.len(),
            subject_type = %query.subject_type,
            "Fetched invoice metadata"
        );
        Ok(records)
    }

    /// Fetch one invoice document and map it.
    ///
    /// # Errors
    ///
    /// - [`KsefError::Data`] for a blank number, error payloads and invalid XML
    /// - [`KsefError::Transport`] when the request never got a response
    pub fn find(&self, ksef_number: &str) -> Result<InvoiceRecord> {
        let ksef_number = ksef_number.trim();
        if ksef_number.is_empty() {
            return Err(KsefError::Data("ksef_number is required".into()));
        }

        let path = format!("{PATH_INVOICES_BY_KSEF_NUMBER}/{}", urlencoding::encode(ksef_number));
        match self.api.get_xml(&path)? {
            XmlResponse::Document(xml) => {
                debug!(ksef_number, bytes = xml.len(), "Fetched invoice document");
                InvoiceXmlMapper::new(ksef_number).map(&xml)
            }
            XmlResponse::Failure(payload) => Err(KsefError::Data(
                payload_error(&payload).unwrap_or_else(|| "Invalid XML invoice response".into()),
            )),
        }
    }
}
