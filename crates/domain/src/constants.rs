//! Wire-level constants for the KSeF v2 API
//!
//! Centralized location for paths, header values and protocol tags used by
//! the client, the authentication engine and the invoice services.

// Host and base path
pub const DEFAULT_HOST: &str = "api.ksef.mf.gov.pl";
pub const BASE_PATH: &str = "/v2";

// Content types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_XML: &str = "application/xml";

// Authentication endpoints
pub const PATH_PUBLIC_KEY_CERTIFICATES: &str = "/security/public-key-certificates";
pub const PATH_AUTH_CHALLENGE: &str = "/auth/challenge";
pub const PATH_AUTH_KSEF_TOKEN: &str = "/auth/ksef-token";
pub const PATH_AUTH_STATUS_PREFIX: &str = "/auth";
pub const PATH_AUTH_TOKEN_REDEEM: &str = "/auth/token/redeem";

// Invoice endpoints
pub const PATH_INVOICES_QUERY_METADATA: &str = "/invoices/query/metadata";
pub const PATH_INVOICES_BY_KSEF_NUMBER: &str = "/invoices/ksef";

/// Usage tag of the certificate used to encrypt the KSeF token.
pub const USAGE_KSEF_TOKEN_ENCRYPTION: &str = "KsefTokenEncryption";

/// Context identifier type sent with the token login request.
pub const CONTEXT_IDENTIFIER_NIP: &str = "Nip";

/// Date type used by the metadata query.
pub const DATE_TYPE_PERMANENT_STORAGE: &str = "PermanentStorage";

/// Default metadata query window, in days back from now.
pub const DEFAULT_QUERY_WINDOW_DAYS: i64 = 30;

// Payload annotation keys written by the client on failed calls
pub const PAYLOAD_ERROR_KEY: &str = "error";
pub const PAYLOAD_HTTP_STATUS_KEY: &str = "http_status";
pub const PAYLOAD_BODY_KEY: &str = "body";

/// Metadata query subject selecting invoices where the taxpayer is the buyer.
pub const SUBJECT_TYPE_BUYER: &str = "Subject2";
