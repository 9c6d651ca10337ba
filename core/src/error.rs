//! Error types for the comics API client.
//!
//! # Design
//! Three layers, from the wire up:
//! - `Fault` is the thing that actually went wrong (bad URL, I/O, non-2xx
//!   status, undecodable body).
//! - `ErrorItem` is what the executor reports. `Http` means the server
//!   answered with a failure status and always carries that status;
//!   `Generic` means the request could not be completed at all and never
//!   carries one.
//! - `ApiError` is what a client operation resolves with: the fault pulled
//!   out of the `ErrorItem`, or a cancellation, kept separate from failure.
//!
//! `ConfigurationError` is raised synchronously while building
//! configuration or requests, before anything touches the network.

use std::time::Duration;

use thiserror::Error;

use crate::status::HttpStatusCode;

/// The underlying cause of a failed request.
#[derive(Debug, Error)]
pub enum Fault {
    /// The request URL was missing, empty, unparseable, or not http(s).
    #[error("invalid request URL: {0:?}")]
    InvalidUrl(String),

    /// The transport could not complete the exchange.
    #[error("transport failure: {0}")]
    Transport(#[from] ureq::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    HttpStatus {
        status: HttpStatusCode,
        body: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The blocking transport task died before producing a result.
    #[error("transport worker failed: {0}")]
    Worker(String),
}

/// A failed request as reported by the executor.
#[derive(Debug, Error)]
pub enum ErrorItem {
    /// The server responded, with a non-2xx status.
    #[error("{cause}")]
    Http {
        status: HttpStatusCode,
        response_time: Option<Duration>,
        #[source]
        cause: Fault,
    },

    /// The request could not be completed.
    #[error("{cause}")]
    Generic {
        #[source]
        cause: Fault,
    },
}

impl ErrorItem {
    /// Build an `Http` item from a failure status. The status must not be
    /// in the 2xx range.
    pub fn http(status: HttpStatusCode, response_time: Option<Duration>, body: Option<String>) -> Self {
        debug_assert!(!status.is_successful(), "2xx status reported as an error: {status}");
        ErrorItem::Http {
            cause: Fault::HttpStatus {
                status: status.clone(),
                body,
            },
            status,
            response_time,
        }
    }

    pub fn generic(cause: impl Into<Fault>) -> Self {
        ErrorItem::Generic { cause: cause.into() }
    }

    /// The failure status; `None` for generic errors.
    pub fn status(&self) -> Option<&HttpStatusCode> {
        match self {
            ErrorItem::Http { status, .. } => Some(status),
            ErrorItem::Generic { .. } => None,
        }
    }

    pub fn response_time(&self) -> Option<Duration> {
        match self {
            ErrorItem::Http { response_time, .. } => *response_time,
            ErrorItem::Generic { .. } => None,
        }
    }

    pub fn cause(&self) -> &Fault {
        match self {
            ErrorItem::Http { cause, .. } | ErrorItem::Generic { cause } => cause,
        }
    }

    pub fn into_cause(self) -> Fault {
        match self {
            ErrorItem::Http { cause, .. } | ErrorItem::Generic { cause } => cause,
        }
    }
}

/// How a client operation failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fault(#[from] Fault),

    #[error("request was cancelled")]
    Cancelled,
}

impl ApiError {
    /// The HTTP status behind the failure, if the server answered.
    pub fn status(&self) -> Option<&HttpStatusCode> {
        match self {
            ApiError::Fault(Fault::HttpStatus { status, .. }) => Some(status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// A required configuration value or request field was missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Failed to read `apiKeyPublic`. This field can not be empty.")]
    MissingPublicKey,

    #[error("Failed to read `apiKeyPrivate`. This field can not be empty.")]
    MissingPrivateKey,

    #[error("Failed to read `comicId`. This field can not be empty.")]
    MissingComicId,

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
