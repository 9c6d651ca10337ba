//! Domain payloads for the comics API.
//!
//! # Design
//! Every field is optional and defaults when absent, so a response that
//! omits `data` (or anything inside it) still decodes. A body that is not a
//! JSON object at all fails decoding as a whole; nothing is ever partially
//! filled in.

use serde::{Deserialize, Serialize};

/// Payload types that have a canonical "empty" value, substituted when a
/// successful response arrives without a body.
pub trait EmptyState: Default + PartialEq {
    fn empty() -> Self {
        Self::default()
    }

    /// `true` if every field holds its default.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Response for `GET /v1/public/comics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetComicsResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Data>,
}

impl EmptyState for GetComicsResponse {}

/// Response for `GET /v1/public/comics/{comicId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetComicByIdResponse {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Data>,
}

impl EmptyState for GetComicByIdResponse {}

impl GetComicByIdResponse {
    /// The single comic in the result set, if the server returned one.
    pub fn comic(&self) -> Option<&Comic> {
        self.data.as_ref()?.results.first()
    }
}

impl GetComicsResponse {
    pub fn comics(&self) -> &[Comic] {
        self.data.as_ref().map(|data| data.results.as_slice()).unwrap_or_default()
    }
}

/// Paging envelope around a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub results: Vec<Comic>,
}

impl EmptyState for Data {}

/// A single comic issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variant_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

impl EmptyState for Comic {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

impl EmptyState for Thumbnail {}

impl Thumbnail {
    /// `path.extension`, the form image URLs are served under.
    pub fn url(&self) -> Option<String> {
        match (&self.path, &self.extension) {
            (Some(path), Some(extension)) => Some(format!("{path}.{extension}")),
            (Some(path), None) => Some(path.clone()),
            _ => None,
        }
    }
}
