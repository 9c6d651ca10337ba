//! Decoded, domain-level responses.

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorItem};
use crate::http::ResponseItem;
use crate::status::HttpStatusCode;
use crate::types::EmptyState;

/// The outcome of an API call after decoding.
#[derive(Debug)]
pub enum Response<T> {
    Success {
        status: HttpStatusCode,
        response: T,
        identifier: Option<String>,
    },
    Failure {
        error: ErrorItem,
        identifier: Option<String>,
    },
}

impl<T: EmptyState + DeserializeOwned> Response<T> {
    /// Decode a successful transport response. A body that does not decode
    /// into `T` becomes a generic failure; an empty body becomes `T::empty()`.
    pub fn decode(item: ResponseItem, identifier: Option<String>) -> Self {
        match item {
            ResponseItem::StringResponse { status, body } => match serde_json::from_str(&body) {
                Ok(response) => Response::Success {
                    status,
                    response,
                    identifier,
                },
                Err(err) => {
                    tracing::warn!(identifier = identifier.as_deref(), error = %err, "response body did not decode");
                    Response::Failure {
                        error: ErrorItem::generic(err),
                        identifier,
                    }
                }
            },
            ResponseItem::EmptyResponse { status } => Response::Success {
                status,
                response: T::empty(),
                identifier,
            },
        }
    }
}

impl<T> Response<T> {
    pub fn failure(error: ErrorItem, identifier: Option<String>) -> Self {
        Response::Failure { error, identifier }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            Response::Success { identifier, .. } | Response::Failure { identifier, .. } => identifier.as_deref(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// The payload, or the fault behind the failure.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Response::Success { response, .. } => Ok(response),
            Response::Failure { error, .. } => Err(ApiError::Fault(error.into_cause())),
        }
    }
}
