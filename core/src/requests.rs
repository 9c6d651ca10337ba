//! Per-endpoint request descriptors.
//!
//! Each carries the endpoint's parameters and, optionally, a cancellation
//! token. When the token fires while the call is outstanding, the client
//! cancels that call and the operation resolves with `ApiError::Cancelled`.

use tokio_util::sync::CancellationToken;

use crate::error::ConfigurationError;

/// Parameters for `GET /v1/public/comics`.
#[derive(Debug, Clone, Default)]
pub struct GetComicsRequest {
    cancellation: Option<CancellationToken>,
}

impl GetComicsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

/// Parameters for `GET /v1/public/comics/{comicId}`.
#[derive(Debug, Clone)]
pub struct GetComicByIdRequest {
    comic_id: i64,
    cancellation: Option<CancellationToken>,
}

impl GetComicByIdRequest {
    pub fn new(comic_id: i64) -> Self {
        Self {
            comic_id,
            cancellation: None,
        }
    }

    pub fn builder() -> GetComicByIdRequestBuilder {
        GetComicByIdRequestBuilder::default()
    }

    pub fn comic_id(&self) -> i64 {
        self.comic_id
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetComicByIdRequestBuilder {
    comic_id: Option<i64>,
    cancellation: Option<CancellationToken>,
}

impl GetComicByIdRequestBuilder {
    /// REQUIRED.
    pub fn comic_id(mut self, comic_id: i64) -> Self {
        self.comic_id = Some(comic_id);
        self
    }

    /// Like `comic_id`, for an id read from a previous response that may be
    /// absent. `None` makes `create` fail.
    pub fn optional_comic_id(mut self, comic_id: Option<i64>) -> Self {
        self.comic_id = comic_id;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn create(self) -> Result<GetComicByIdRequest, ConfigurationError> {
        let comic_id = self.comic_id.ok_or(ConfigurationError::MissingComicId)?;
        Ok(GetComicByIdRequest {
            comic_id,
            cancellation: self.cancellation,
        })
    }
}
