//! HTTP status codes as value objects.
//!
//! # Design
//! `HttpStatusCode` pairs the numeric code with a human-readable message but
//! compares and hashes on the code alone, so a canonical `404 Not Found` and
//! a server-supplied `404 Nope` are the same status. Lookups go through a
//! static table of well-known codes; anything else gets a fresh value with a
//! fallback message.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

const MESSAGE_UNKNOWN_STATUS_CODE: &str = "Unknown Status Code";

/// An HTTP status with its code and message.
#[derive(Debug, Clone)]
pub struct HttpStatusCode {
    code: u16,
    message: Cow<'static, str>,
}

impl HttpStatusCode {
    const fn known(code: u16, message: &'static str) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
        }
    }

    // 1xx
    pub const CONTINUE: Self = Self::known(100, "Continue");
    pub const SWITCHING_PROTOCOLS: Self = Self::known(101, "Switching Protocols");
    pub const PROCESSING: Self = Self::known(102, "Processing");

    // 2xx
    pub const OK: Self = Self::known(200, "OK");
    pub const CREATED: Self = Self::known(201, "Created");
    pub const ACCEPTED: Self = Self::known(202, "Accepted");
    pub const NON_AUTHORITATIVE_INFORMATION: Self = Self::known(203, "Non-Authoritative Information");
    pub const NO_CONTENT: Self = Self::known(204, "No Content");
    pub const RESET_CONTENT: Self = Self::known(205, "Reset Content");
    pub const PARTIAL_CONTENT: Self = Self::known(206, "Partial Content");
    pub const MULTI_STATUS: Self = Self::known(207, "Multi-Status");

    // 3xx
    pub const MULTIPLE_CHOICES: Self = Self::known(300, "Multiple Choices");
    pub const MOVED_PERMANENTLY: Self = Self::known(301, "Moved Permanently");
    pub const FOUND: Self = Self::known(302, "Found");
    pub const SEE_OTHER: Self = Self::known(303, "See Other");
    pub const NOT_MODIFIED: Self = Self::known(304, "Not Modified");
    pub const USE_PROXY: Self = Self::known(305, "Use Proxy");
    pub const SWITCH_PROXY: Self = Self::known(306, "Switch Proxy");
    pub const TEMPORARY_REDIRECT: Self = Self::known(307, "Temporary Redirect");
    pub const PERMANENT_REDIRECT: Self = Self::known(308, "Permanent Redirect");

    // 4xx
    pub const BAD_REQUEST: Self = Self::known(400, "Bad Request");
    pub const UNAUTHORIZED: Self = Self::known(401, "Unauthorized");
    pub const PAYMENT_REQUIRED: Self = Self::known(402, "Payment Required");
    pub const FORBIDDEN: Self = Self::known(403, "Forbidden");
    pub const NOT_FOUND: Self = Self::known(404, "Not Found");
    pub const METHOD_NOT_ALLOWED: Self = Self::known(405, "Method Not Allowed");
    pub const NOT_ACCEPTABLE: Self = Self::known(406, "Not Acceptable");
    pub const PROXY_AUTHENTICATION_REQUIRED: Self = Self::known(407, "Proxy Authentication Required");
    pub const REQUEST_TIMEOUT: Self = Self::known(408, "Request Timeout");
    pub const CONFLICT: Self = Self::known(409, "Conflict");
    pub const GONE: Self = Self::known(410, "Gone");
    pub const LENGTH_REQUIRED: Self = Self::known(411, "Length Required");
    pub const PRECONDITION_FAILED: Self = Self::known(412, "Precondition Failed");
    pub const PAYLOAD_TOO_LARGE: Self = Self::known(413, "Payload Too Large");
    pub const REQUEST_URI_TOO_LONG: Self = Self::known(414, "Request-URI Too Long");
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self::known(415, "Unsupported Media Type");
    pub const REQUESTED_RANGE_NOT_SATISFIABLE: Self = Self::known(416, "Requested Range Not Satisfiable");
    pub const EXPECTATION_FAILED: Self = Self::known(417, "Expectation Failed");
    pub const UNPROCESSABLE_ENTITY: Self = Self::known(422, "Unprocessable Entity");
    pub const LOCKED: Self = Self::known(423, "Locked");
    pub const FAILED_DEPENDENCY: Self = Self::known(424, "Failed Dependency");
    pub const UPGRADE_REQUIRED: Self = Self::known(426, "Upgrade Required");
    pub const TOO_MANY_REQUESTS: Self = Self::known(429, "Too Many Requests");
    pub const REQUEST_HEADER_FIELDS_TOO_LARGE: Self = Self::known(431, "Request Header Fields Too Large");

    // 5xx
    pub const INTERNAL_SERVER_ERROR: Self = Self::known(500, "Internal Server Error");
    pub const NOT_IMPLEMENTED: Self = Self::known(501, "Not Implemented");
    pub const BAD_GATEWAY: Self = Self::known(502, "Bad Gateway");
    pub const SERVICE_UNAVAILABLE: Self = Self::known(503, "Service Unavailable");
    pub const GATEWAY_TIMEOUT: Self = Self::known(504, "Gateway Timeout");
    pub const VERSION_NOT_SUPPORTED: Self = Self::known(505, "HTTP Version Not Supported");
    pub const VARIANT_ALSO_NEGOTIATES: Self = Self::known(506, "Variant Also Negotiates");
    pub const INSUFFICIENT_STORAGE: Self = Self::known(507, "Insufficient Storage");

    /// Look up `code` in the well-known table, falling back to
    /// "Unknown Status Code" for anything unregistered.
    pub fn from_code(code: u16) -> Self {
        Self::from_code_or(code, MESSAGE_UNKNOWN_STATUS_CODE)
    }

    /// Like [`from_code`](Self::from_code) but with a caller-supplied
    /// message for unregistered codes.
    pub fn from_code_or(code: u16, fallback_message: impl Into<Cow<'static, str>>) -> Self {
        match Self::lookup(code) {
            Some(known) => known.clone(),
            None => Self {
                code,
                message: fallback_message.into(),
            },
        }
    }

    /// The canonical entry for `code`, if it is registered.
    pub fn lookup(code: u16) -> Option<&'static HttpStatusCode> {
        KNOWN_STATUS_CODES
            .binary_search_by_key(&code, |status| status.code)
            .ok()
            .map(|index| &KNOWN_STATUS_CODES[index])
    }

    /// Every registered status, ordered by code.
    pub fn all() -> &'static [HttpStatusCode] {
        &KNOWN_STATUS_CODES
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `true` for codes 200 through 299.
    pub fn is_successful(&self) -> bool {
        (200..=299).contains(&self.code)
    }
}

impl PartialEq for HttpStatusCode {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for HttpStatusCode {}

impl Hash for HttpStatusCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for HttpStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

// Sorted by code; `lookup` binary-searches this table.
static KNOWN_STATUS_CODES: [HttpStatusCode; 52] = [
    HttpStatusCode::CONTINUE,
    HttpStatusCode::SWITCHING_PROTOCOLS,
    HttpStatusCode::PROCESSING,
    HttpStatusCode::OK,
    HttpStatusCode::CREATED,
    HttpStatusCode::ACCEPTED,
    HttpStatusCode::NON_AUTHORITATIVE_INFORMATION,
    HttpStatusCode::NO_CONTENT,
    HttpStatusCode::RESET_CONTENT,
    HttpStatusCode::PARTIAL_CONTENT,
    HttpStatusCode::MULTI_STATUS,
    HttpStatusCode::MULTIPLE_CHOICES,
    HttpStatusCode::MOVED_PERMANENTLY,
    HttpStatusCode::FOUND,
    HttpStatusCode::SEE_OTHER,
    HttpStatusCode::NOT_MODIFIED,
    HttpStatusCode::USE_PROXY,
    HttpStatusCode::SWITCH_PROXY,
    HttpStatusCode::TEMPORARY_REDIRECT,
    HttpStatusCode::PERMANENT_REDIRECT,
    HttpStatusCode::BAD_REQUEST,
    HttpStatusCode::UNAUTHORIZED,
    HttpStatusCode::PAYMENT_REQUIRED,
    HttpStatusCode::FORBIDDEN,
    HttpStatusCode::NOT_FOUND,
    HttpStatusCode::METHOD_NOT_ALLOWED,
    HttpStatusCode::NOT_ACCEPTABLE,
    HttpStatusCode::PROXY_AUTHENTICATION_REQUIRED,
    HttpStatusCode::REQUEST_TIMEOUT,
    HttpStatusCode::CONFLICT,
    HttpStatusCode::GONE,
    HttpStatusCode::LENGTH_REQUIRED,
    HttpStatusCode::PRECONDITION_FAILED,
    HttpStatusCode::PAYLOAD_TOO_LARGE,
    HttpStatusCode::REQUEST_URI_TOO_LONG,
    HttpStatusCode::UNSUPPORTED_MEDIA_TYPE,
    HttpStatusCode::REQUESTED_RANGE_NOT_SATISFIABLE,
    HttpStatusCode::EXPECTATION_FAILED,
    HttpStatusCode::UNPROCESSABLE_ENTITY,
    HttpStatusCode::LOCKED,
    HttpStatusCode::FAILED_DEPENDENCY,
    HttpStatusCode::UPGRADE_REQUIRED,
    HttpStatusCode::TOO_MANY_REQUESTS,
    HttpStatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
    HttpStatusCode::INTERNAL_SERVER_ERROR,
    HttpStatusCode::NOT_IMPLEMENTED,
    HttpStatusCode::BAD_GATEWAY,
    HttpStatusCode::SERVICE_UNAVAILABLE,
    HttpStatusCode::GATEWAY_TIMEOUT,
    HttpStatusCode::VERSION_NOT_SUPPORTED,
    HttpStatusCode::VARIANT_ALSO_NEGOTIATES,
    HttpStatusCode::INSUFFICIENT_STORAGE,
];
