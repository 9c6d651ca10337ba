//! Client configuration: credentials and endpoint URLs.
//!
//! # Design
//! Both API keys are required. `Builder::create` checks them before anything
//! else can happen, so a client can never be built around missing
//! credentials. The base URL defaults to the public gateway and can be
//! pointed elsewhere (a local mock server in tests).

use url::Url;

use crate::error::ConfigurationError;

pub const DEFAULT_BASE_URL: &str = "https://gateway.marvel.com/";

/// Path placeholder replaced by the comic id.
pub const PLACEHOLDER_COMIC_ID: &str = "{comicId}";

const PATH_GET_COMICS: &str = "v1/public/comics";
const PATH_GET_COMIC_BY_ID: &str = "v1/public/comics/{comicId}";

pub const ENV_API_KEY_PUBLIC: &str = "COMICS_API_PUBLIC_KEY";
pub const ENV_API_KEY_PRIVATE: &str = "COMICS_API_PRIVATE_KEY";
pub const ENV_BASE_URL: &str = "COMICS_API_BASE_URL";

/// Validated configuration for `ComicsClient`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    api_key_public: String,
    api_key_private: String,
    base_url: Url,
}

impl ClientConfiguration {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Build from `COMICS_API_PUBLIC_KEY`, `COMICS_API_PRIVATE_KEY` and the
    /// optional `COMICS_API_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mut builder = Builder::default();
        if let Ok(key) = std::env::var(ENV_API_KEY_PUBLIC) {
            builder = builder.api_key_public(key);
        }
        if let Ok(key) = std::env::var(ENV_API_KEY_PRIVATE) {
            builder = builder.api_key_private(key);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }
        builder.create()
    }

    pub fn api_key_public(&self) -> &str {
        &self.api_key_public
    }

    pub fn api_key_private(&self) -> &str {
        &self.api_key_private
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn comics_url(&self) -> String {
        format!("{}{PATH_GET_COMICS}", self.base_url)
    }

    /// Still contains the `{comicId}` placeholder.
    pub fn comic_by_id_url(&self) -> String {
        format!("{}{PATH_GET_COMIC_BY_ID}", self.base_url)
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("api_key_public", &self.api_key_public)
            .field("api_key_private", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Builder for `ClientConfiguration`.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    api_key_public: Option<String>,
    api_key_private: Option<String>,
    base_url: Option<String>,
}

impl Builder {
    /// REQUIRED.
    pub fn api_key_public(mut self, key: impl Into<String>) -> Self {
        self.api_key_public = Some(key.into());
        self
    }

    /// REQUIRED.
    pub fn api_key_private(mut self, key: impl Into<String>) -> Self {
        self.api_key_private = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Fails on a missing or empty public key first, then private key, then
    /// an unusable base URL.
    pub fn create(self) -> Result<ClientConfiguration, ConfigurationError> {
        let api_key_public = self
            .api_key_public
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingPublicKey)?;
        let api_key_private = self
            .api_key_private
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingPrivateKey)?;
        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        Ok(ClientConfiguration {
            api_key_public,
            api_key_private,
            base_url,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    // A trailing slash makes the endpoint paths append instead of replace.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("base URL must not carry a query or fragment".to_string()));
    }
    Ok(url)
}
