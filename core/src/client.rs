//! Typed client for the comics API.
//!
//! # Design
//! `ComicsClient` turns each endpoint into an `async fn` on top of the
//! callback-based `HttpRequestExecutor`. A call builds an `HttpRequest`
//! (`build_*`, pure and testable), hands the executor a callback that feeds a
//! oneshot channel, and awaits that channel. The channel can resolve only
//! once, and the executor delivers only once, so every call resolves exactly
//! once: decoded payload, the fault behind the failure, or cancellation.
//!
//! The client is constructed explicitly and passed to whoever needs it;
//! there is no global instance. Configuration can be swapped at runtime and
//! applies to calls started afterwards.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::auth;
use crate::config::{ClientConfiguration, PLACEHOLDER_COMIC_ID};
use crate::error::{ApiError, ErrorItem, Fault};
use crate::executor::{HttpRequestExecutor, HttpResponseCallback, UreqRequestExecutor};
use crate::http::{HttpMethod, HttpRequest, RequestPayload, ResponseItem};
use crate::lifecycle::Outcome;
use crate::requests::{GetComicByIdRequest, GetComicsRequest};
use crate::response::Response;
use crate::types::{EmptyState, GetComicByIdResponse, GetComicsResponse};

/// Names the endpoint a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointIdentifier {
    GetComics,
    GetComicById,
}

impl fmt::Display for EndpointIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointIdentifier::GetComics => "GetComics",
            EndpointIdentifier::GetComicById => "GetComicById",
        })
    }
}

/// Client for the comics API.
pub struct ComicsClient<E = UreqRequestExecutor> {
    configuration: RwLock<Arc<ClientConfiguration>>,
    executor: E,
}

impl ComicsClient<UreqRequestExecutor> {
    /// Client backed by a default `UreqRequestExecutor` on `runtime`.
    pub fn with_runtime(configuration: ClientConfiguration, runtime: Handle) -> Self {
        Self::new(configuration, UreqRequestExecutor::new(runtime))
    }
}

impl<E: HttpRequestExecutor> ComicsClient<E> {
    pub fn new(configuration: ClientConfiguration, executor: E) -> Self {
        Self {
            configuration: RwLock::new(Arc::new(configuration)),
            executor,
        }
    }

    pub fn configuration(&self) -> Arc<ClientConfiguration> {
        Arc::clone(&self.configuration.read())
    }

    /// Replace the configuration. Calls already in flight keep the old one.
    pub fn update_configuration(&self, configuration: ClientConfiguration) {
        *self.configuration.write() = Arc::new(configuration);
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn build_get_comics(&self, timestamp: &str) -> HttpRequest {
        let configuration = self.configuration();
        signed_get(&configuration, configuration.comics_url(), timestamp)
    }

    pub fn build_get_comic_by_id(&self, comic_id: i64, timestamp: &str) -> HttpRequest {
        let configuration = self.configuration();
        let url = configuration
            .comic_by_id_url()
            .replace(PLACEHOLDER_COMIC_ID, &comic_id.to_string());
        signed_get(&configuration, url, timestamp)
    }

    /// `GET /v1/public/comics`
    pub async fn get_comics(&self, request: &GetComicsRequest) -> Result<GetComicsResponse, ApiError> {
        let http_request = self.build_get_comics(&auth::current_timestamp());
        self.send(EndpointIdentifier::GetComics, http_request, request.cancellation())
            .await
    }

    /// `GET /v1/public/comics/{comicId}`
    pub async fn get_comic_by_id(&self, request: &GetComicByIdRequest) -> Result<GetComicByIdResponse, ApiError> {
        let http_request = self.build_get_comic_by_id(request.comic_id(), &auth::current_timestamp());
        self.send(EndpointIdentifier::GetComicById, http_request, request.cancellation())
            .await
    }

    async fn send<T>(
        &self,
        endpoint: EndpointIdentifier,
        request: HttpRequest,
        cancellation: Option<&CancellationToken>,
    ) -> Result<T, ApiError>
    where
        T: EmptyState + DeserializeOwned,
    {
        let span = tracing::debug_span!("api_call", %endpoint);
        async move {
            let (tx, mut rx) = oneshot::channel();
            let handle = self
                .executor
                .execute(request, Some(Box::new(ResumeOnce(tx))));

            let delivered = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    delivered = &mut rx => delivered,
                    _ = token.cancelled() => {
                        handle.cancel();
                        rx.await
                    }
                },
                None => rx.await,
            };

            let identifier = Some(endpoint.to_string());
            match delivered {
                Ok(Outcome::Success(item)) => Response::<T>::decode(item, identifier).into_result(),
                Ok(Outcome::Failure(error)) => Response::<T>::failure(error, identifier).into_result(),
                Ok(Outcome::Cancelled) => Err(ApiError::Cancelled),
                Err(_) => {
                    tracing::error!(request_id = %handle.id(), "executor dropped the response callback");
                    Err(ApiError::Fault(Fault::Worker(
                        "response callback dropped without a result".to_string(),
                    )))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn signed_get(configuration: &ClientConfiguration, url: String, timestamp: &str) -> HttpRequest {
    HttpRequest {
        url: Some(url),
        method: HttpMethod::Get,
        payload: Some(RequestPayload::UrlQueryParameters(auth::query_parameters(
            configuration,
            timestamp,
        ))),
    }
}

/// Forwards the executor's single callback into a oneshot channel.
struct ResumeOnce(oneshot::Sender<Outcome>);

impl HttpResponseCallback for ResumeOnce {
    fn on_success(self: Box<Self>, item: ResponseItem) {
        let _ = self.0.send(Outcome::Success(item));
    }

    fn on_failure(self: Box<Self>, error: ErrorItem) {
        let _ = self.0.send(Outcome::Failure(error));
    }

    fn on_cancelled(self: Box<Self>) {
        let _ = self.0.send(Outcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CallbackDispatcher;
    use crate::lifecycle::{RequestHandle, RequestState, TracingLifecycle};
    use crate::status::HttpStatusCode;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use url::Url;

    enum Script {
        Respond(Outcome),
        Hang,
        DropCallback,
    }

    /// Executor that answers from a script instead of the network.
    struct ScriptedExecutor {
        dispatcher: CallbackDispatcher,
        script: Mutex<VecDeque<Script>>,
        requests: Mutex<Vec<HttpRequest>>,
        pending: Mutex<Option<RequestHandle>>,
    }

    impl ScriptedExecutor {
        fn new(script: impl IntoIterator<Item = Script>) -> Self {
            Self {
                dispatcher: CallbackDispatcher::spawn(&Handle::current()),
                script: Mutex::new(script.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
                pending: Mutex::new(None),
            }
        }
    }

    impl HttpRequestExecutor for ScriptedExecutor {
        fn execute(
            &self,
            request: HttpRequest,
            callback: Option<Box<dyn HttpResponseCallback>>,
        ) -> RequestHandle {
            self.requests.lock().push(request);
            let step = self.script.lock().pop_front().expect("script exhausted");
            let callback = match step {
                Script::DropCallback => None,
                _ => callback,
            };
            let handle = RequestHandle::new(callback, Arc::new(TracingLifecycle), self.dispatcher.clone());
            handle.begin();
            match step {
                Script::Respond(outcome) => {
                    handle.complete(outcome);
                }
                Script::Hang => *self.pending.lock() = Some(handle.clone()),
                Script::DropCallback => {}
            }
            handle
        }

        fn cancel(&self) {
            if let Some(handle) = self.pending.lock().take() {
                handle.cancel();
            }
        }
    }

    fn configuration(public: &str, private: &str) -> ClientConfiguration {
        ClientConfiguration::builder()
            .api_key_public(public)
            .api_key_private(private)
            .base_url("http://localhost:3000")
            .create()
            .unwrap()
    }

    fn client(script: impl IntoIterator<Item = Script>) -> ComicsClient<ScriptedExecutor> {
        ComicsClient::new(configuration("1234", "abcd"), ScriptedExecutor::new(script))
    }

    fn ok_body(body: &str) -> Script {
        Script::Respond(Outcome::Success(ResponseItem::StringResponse {
            status: HttpStatusCode::OK,
            body: body.to_string(),
        }))
    }

    fn query(request: &HttpRequest) -> Vec<(String, String)> {
        let mut url = Url::parse(request.url.as_deref().unwrap()).unwrap();
        if let Some(RequestPayload::UrlQueryParameters(params)) = &request.payload {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn endpoint_identifiers() {
        assert_eq!(EndpointIdentifier::GetComics.to_string(), "GetComics");
        assert_eq!(EndpointIdentifier::GetComicById.to_string(), "GetComicById");
    }

    #[tokio::test]
    async fn build_get_comics_signs_request() {
        let client = client([]);
        let request = client.build_get_comics("1");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.as_deref(), Some("http://localhost:3000/v1/public/comics"));
        assert_eq!(
            query(&request),
            vec![
                ("apikey".to_string(), "1234".to_string()),
                ("hash".to_string(), "ffd275c5130566a2916217b101f26150".to_string()),
                ("ts".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn build_get_comic_by_id_substitutes_placeholder() {
        let client = client([]);
        let request = client.build_get_comic_by_id(42, "1");
        let url = request.url.unwrap();
        assert_eq!(url, "http://localhost:3000/v1/public/comics/42");
        assert!(!url.contains(PLACEHOLDER_COMIC_ID));
    }

    #[tokio::test]
    async fn get_comics_decodes_body() {
        let client = client([ok_body(r#"{"code":200,"data":{"count":1,"results":[{"id":7,"title":"X"}]}}"#)]);
        let response = client.get_comics(&GetComicsRequest::new()).await.unwrap();
        assert_eq!(response.comics().len(), 1);
        assert_eq!(response.comics()[0].id, Some(7));

        let sent = client.executor().requests.lock();
        assert_eq!(sent.len(), 1);
        assert!(query(&sent[0]).iter().any(|(k, v)| k == "apikey" && v == "1234"));
    }

    #[tokio::test]
    async fn empty_body_resolves_to_empty_instance() {
        let client = client([Script::Respond(Outcome::Success(ResponseItem::EmptyResponse {
            status: HttpStatusCode::OK,
        }))]);
        let response = client
            .get_comic_by_id(&GetComicByIdRequest::new(1))
            .await
            .unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn http_failure_rejects_with_status() {
        let client = client([Script::Respond(Outcome::Failure(ErrorItem::http(
            HttpStatusCode::NOT_FOUND,
            None,
            Some(r#"{"code":404}"#.to_string()),
        )))]);
        let err = client
            .get_comic_by_id(&GetComicByIdRequest::new(9999))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(&HttpStatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn decode_failure_rejects_with_decode_fault() {
        let client = client([ok_body("<html>")]);
        let err = client.get_comics(&GetComicsRequest::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Fault(Fault::Decode(_))));
    }

    #[tokio::test]
    async fn cancellation_token_cancels_pending_call() {
        let client = Arc::new(client([Script::Hang]));
        let token = CancellationToken::new();
        let request = GetComicsRequest::new().with_cancellation(token.clone());

        let call = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_comics(&request).await })
        };
        tokio::task::yield_now().await;
        token.cancel();

        let err = call.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        let pending = client.executor().pending.lock();
        assert_eq!(pending.as_ref().map(RequestHandle::state), Some(RequestState::Cancelled));
    }

    #[tokio::test]
    async fn token_fired_after_completion_is_ignored() {
        let client = client([ok_body("{}")]);
        let token = CancellationToken::new();
        let request = GetComicsRequest::new().with_cancellation(token.clone());

        let response = client.get_comics(&request).await.unwrap();
        token.cancel();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn executor_cancel_rejects_as_cancelled() {
        let client = Arc::new(client([Script::Hang]));
        let call = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_comics(&GetComicsRequest::new()).await })
        };
        while client.executor().pending.lock().is_none() {
            tokio::task::yield_now().await;
        }
        client.executor().cancel();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn dropped_callback_is_a_worker_fault() {
        let client = client([Script::DropCallback]);
        let err = client.get_comics(&GetComicsRequest::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Fault(Fault::Worker(_))));
    }

    #[tokio::test]
    async fn updated_configuration_applies_to_next_request() {
        let client = client([]);
        let before = client.configuration();
        client.update_configuration(configuration("5678", "efgh"));

        assert_ne!(*before, *client.configuration());
        let request = client.build_get_comics("1");
        assert!(query(&request).iter().any(|(k, v)| k == "apikey" && v == "5678"));
        assert!(query(&request)
            .iter()
            .any(|(k, v)| k == "hash" && *v == auth::request_hash("1", "efgh", "5678")));
    }
}
