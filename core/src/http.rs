//! HTTP value types shared by the executor and the API client.
//!
//! # Design
//! These types describe requests and raw responses as plain data. The client
//! builds `HttpRequest` values; the executor turns them into transport calls
//! and reports back `ResponseItem` values that know nothing about the domain
//! payload they carry. Decoding happens later, in `response`.

use std::collections::BTreeMap;
use std::fmt;

use crate::status::HttpStatusCode;

pub const CONTENT_TYPE_APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Methods whose requests carry a body, even an empty one.
    pub fn requires_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data attached to an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    /// No data; methods that require a body send a zero-length one.
    Empty,
    /// A request body sent with the given content type.
    StringBody { content_type: String, body: String },
    /// Parameters appended to the URL query string in key order.
    UrlQueryParameters(BTreeMap<String, String>),
}

impl RequestPayload {
    pub fn json(body: impl Into<String>) -> Self {
        RequestPayload::StringBody {
            content_type: CONTENT_TYPE_APPLICATION_JSON.to_string(),
            body: body.into(),
        }
    }
}

/// An outbound HTTP request described as plain data.
///
/// `url` stays optional so that a missing URL is reported through the
/// executor's failure callback rather than at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Option<String>,
    pub method: HttpMethod,
    pub payload: Option<RequestPayload>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: Some(url.into()),
            method,
            payload: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn with_payload(mut self, payload: RequestPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A successful transport-level response, before any domain decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseItem {
    /// A 2xx response with a non-empty body.
    StringResponse { status: HttpStatusCode, body: String },
    /// A 2xx response without a body.
    EmptyResponse { status: HttpStatusCode },
}

impl ResponseItem {
    pub fn status(&self) -> &HttpStatusCode {
        match self {
            ResponseItem::StringResponse { status, .. } => status,
            ResponseItem::EmptyResponse { status } => status,
        }
    }
}
