//! Client core for the comics API.
//!
//! # Overview
//! Two layers. The executor layer (`executor`, `lifecycle`, `dispatch`)
//! runs generic HTTP requests and reports each one back through a callback
//! exactly once: success, failure, or cancellation. The API layer (`client`)
//! builds signed requests for the comics endpoints on top of it and exposes
//! them as `async fn`s returning decoded payloads.
//!
//! # Design
//! - Value types (`http`, `status`, `types`) carry no behaviour beyond
//!   construction and lookup, so requests can be built and inspected
//!   without a network.
//! - The transport is blocking `ureq` driven from `spawn_blocking`; results
//!   and callbacks flow back through the tokio runtime the executor was
//!   created on.
//! - There is no global client. Build a `ClientConfiguration`, hand it to
//!   `ComicsClient`, and pass the client around.

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod requests;
pub mod response;
pub mod status;
pub mod types;

pub use client::{ComicsClient, EndpointIdentifier};
pub use config::ClientConfiguration;
pub use error::{ApiError, ConfigurationError, ErrorItem, Fault};
pub use executor::{HttpRequestExecutor, HttpResponseCallback, UreqRequestExecutor};
pub use http::{HttpMethod, HttpRequest, RequestPayload, ResponseItem};
pub use lifecycle::{Outcome, RequestHandle, RequestId, RequestLifecycle, RequestState};
pub use requests::{GetComicByIdRequest, GetComicsRequest};
pub use response::Response;
pub use status::HttpStatusCode;
pub use types::{Comic, Data, EmptyState, GetComicByIdResponse, GetComicsResponse, Thumbnail};
