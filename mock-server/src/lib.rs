//! Local stand-in for the comics API.
//!
//! Serves the two comics endpoints from an in-memory catalogue behind the
//! same `ts`/`apikey`/`hash` query authentication as the real gateway, plus
//! a handful of transport fixtures (`/success/*`, `/failure/*`, `/delayed`,
//! `/echo`) used to exercise the client's executor.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PUBLIC_KEY: &str = "public-key";
pub const DEFAULT_PRIVATE_KEY: &str = "private-key";

/// Keys the server accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// `md5(ts + private + public)` as lowercase hex.
    pub fn expected_hash(&self, ts: &str) -> String {
        let digest = Md5::digest(format!("{ts}{}{}", self.private_key, self.public_key));
        hex::encode(digest)
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_KEY, DEFAULT_PRIVATE_KEY)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub path: String,
    pub extension: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: i64,
    pub title: String,
    pub variant_description: String,
    pub description: Option<String>,
    pub thumbnail: Thumbnail,
}

/// Paging block of a successful response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataContainer {
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
    pub count: usize,
    pub results: Vec<Comic>,
}

/// Body of every successful comics response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataWrapper {
    pub code: u16,
    pub status: String,
    pub data: DataContainer,
}

impl DataWrapper {
    fn page(results: Vec<Comic>, total: usize) -> Self {
        Self {
            code: 200,
            status: "Ok".to_string(),
            data: DataContainer {
                offset: 0,
                limit: PAGE_LIMIT,
                total,
                count: results.len(),
                results,
            },
        }
    }
}

const PAGE_LIMIT: usize = 20;

pub type Catalogue = Arc<RwLock<BTreeMap<i64, Comic>>>;

#[derive(Clone)]
struct AppState {
    credentials: Arc<Credentials>,
    catalogue: Catalogue,
}

/// A few comics to serve when no catalogue is given.
pub fn sample_comics() -> Vec<Comic> {
    let comic = |id: i64, title: &str, description: Option<&str>| Comic {
        id,
        title: title.to_string(),
        variant_description: String::new(),
        description: description.map(str::to_string),
        thumbnail: Thumbnail {
            path: format!("http://i.annihil.us/u/prod/marvel/i/mg/comics/{id}"),
            extension: "jpg".to_string(),
        },
    };
    vec![
        comic(82967, "Marvel Previews (2017)", None),
        comic(82965, "Marvel Previews (2017)", Some("Previews of the month ahead.")),
        comic(1689, "Official Handbook of the Marvel Universe (2004) #10", None),
        comic(1308, "Marvel Age Spider-Man Vol. 2: Everyday Hero (Digest)", Some("Spidey's back in action.")),
    ]
}

pub fn app(credentials: Credentials) -> Router {
    app_with_catalogue(credentials, sample_comics())
}

pub fn app_with_catalogue(credentials: Credentials, comics: Vec<Comic>) -> Router {
    let catalogue: Catalogue = Arc::new(RwLock::new(
        comics.into_iter().map(|comic| (comic.id, comic)).collect(),
    ));
    let state = AppState {
        credentials: Arc::new(credentials),
        catalogue,
    };
    Router::new()
        .route("/v1/public/comics", get(list_comics))
        .route("/v1/public/comics/{comic_id}", get(get_comic))
        .with_state(state)
        .merge(fixtures())
}

/// Transport fixtures: fixed statuses and bodies, artificial delay, echo.
pub fn fixtures() -> Router {
    Router::new()
        .route("/success/empty_json", get(empty_json))
        .route("/success/empty_body", get(empty_body))
        .route("/failure/http", get(http_failure))
        .route("/delayed/{tag}", get(delayed))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app(credentials)).await
}

// --- auth ---

fn rejection(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

/// Checks `ts`, `apikey` and `hash`: 409 when one is missing, 401 when the
/// key or hash does not match.
fn authorize(credentials: &Credentials, params: &HashMap<String, String>) -> Result<(), Response> {
    let param = |name: &str| params.get(name).filter(|value| !value.is_empty());

    let Some(apikey) = param("apikey") else {
        return Err(rejection(StatusCode::CONFLICT, "MissingParameter", "You must provide a user key."));
    };
    let Some(ts) = param("ts") else {
        return Err(rejection(StatusCode::CONFLICT, "MissingParameter", "You must provide a timestamp."));
    };
    let Some(hash) = param("hash") else {
        return Err(rejection(StatusCode::CONFLICT, "MissingParameter", "You must provide a hash."));
    };

    if *apikey != credentials.public_key {
        tracing::debug!(%apikey, "rejecting unknown api key");
        return Err(rejection(StatusCode::UNAUTHORIZED, "InvalidCredentials", "The passed API key is invalid."));
    }
    if *hash != credentials.expected_hash(ts) {
        tracing::debug!(%ts, "rejecting hash mismatch");
        return Err(rejection(
            StatusCode::UNAUTHORIZED,
            "InvalidCredentials",
            "That hash, timestamp and key combination is invalid.",
        ));
    }
    Ok(())
}

// --- comics ---

async fn list_comics(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DataWrapper>, Response> {
    authorize(&state.credentials, &params)?;
    let catalogue = state.catalogue.read().await;
    let results: Vec<Comic> = catalogue.values().take(PAGE_LIMIT).cloned().collect();
    Ok(Json(DataWrapper::page(results, catalogue.len())))
}

async fn get_comic(
    State(state): State<AppState>,
    Path(comic_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DataWrapper>, Response> {
    authorize(&state.credentials, &params)?;
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": 404, "status": "We couldn't find that comic_issue" })),
        )
            .into_response()
    };
    let comic_id: i64 = comic_id.parse().map_err(|_| not_found())?;
    let catalogue = state.catalogue.read().await;
    let comic = catalogue.get(&comic_id).cloned().ok_or_else(not_found)?;
    Ok(Json(DataWrapper::page(vec![comic], 1)))
}

// --- fixtures ---

async fn empty_json() -> Json<serde_json::Value> {
    Json(json!({}))
}

async fn empty_body() -> StatusCode {
    StatusCode::OK
}

async fn http_failure() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "http" })))
}

#[derive(Deserialize)]
struct DelayParams {
    #[serde(default)]
    delay_ms: u64,
}

async fn delayed(Path(tag): Path<String>, Query(params): Query<DelayParams>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(params.delay_ms)).await;
    Json(json!({ "tag": tag }))
}

/// What the server saw, for checking method, query, content type and body.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Json(Echo {
        method: method.to_string(),
        query,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_hash_matches_known_vector() {
        let credentials = Credentials::new("1234", "abcd");
        assert_eq!(credentials.expected_hash("1"), "ffd275c5130566a2916217b101f26150");
    }

    #[test]
    fn comic_serializes_camel_case() {
        let comic = &sample_comics()[0];
        let json = serde_json::to_value(comic).unwrap();
        assert_eq!(json["id"], 82967);
        assert!(json.get("variantDescription").is_some());
        assert!(json["description"].is_null());
        assert_eq!(json["thumbnail"]["extension"], "jpg");
    }

    #[test]
    fn page_counts_results() {
        let page = DataWrapper::page(sample_comics(), 10);
        assert_eq!(page.data.count, 4);
        assert_eq!(page.data.total, 10);
        assert_eq!(page.data.limit, PAGE_LIMIT);
        assert_eq!(page.code, 200);
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn authorize_accepts_valid_signature() {
        let credentials = Credentials::new("1234", "abcd");
        let params = params(&[("ts", "1"), ("apikey", "1234"), ("hash", "ffd275c5130566a2916217b101f26150")]);
        assert!(authorize(&credentials, &params).is_ok());
    }

    #[test]
    fn authorize_missing_parameter_is_conflict() {
        let credentials = Credentials::default();
        let err = authorize(&credentials, &params(&[("ts", "1"), ("apikey", DEFAULT_PUBLIC_KEY)])).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn authorize_wrong_key_or_hash_is_unauthorized() {
        let credentials = Credentials::new("1234", "abcd");
        let wrong_key = params(&[("ts", "1"), ("apikey", "9999"), ("hash", "ffd275c5130566a2916217b101f26150")]);
        assert_eq!(authorize(&credentials, &wrong_key).unwrap_err().status(), StatusCode::UNAUTHORIZED);

        let wrong_hash = params(&[("ts", "2"), ("apikey", "1234"), ("hash", "ffd275c5130566a2916217b101f26150")]);
        assert_eq!(authorize(&credentials, &wrong_hash).unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }
}
