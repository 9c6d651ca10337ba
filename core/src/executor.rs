//! Callback-based HTTP request execution.
//!
//! # Design
//! `HttpRequestExecutor` hides the HTTP library behind two calls: `execute`
//! and `cancel`. `UreqRequestExecutor` is the production implementation.
//! Each request runs as a tokio task that hands the blocking `ureq` call to
//! the blocking pool and races it against the request's cancellation token.
//! Whatever happens, the outcome goes through the request's
//! `RequestHandle`, which guarantees a single terminal callback.
//!
//! Cancelling does not interrupt the blocking call; the worker stops waiting
//! for it and the result is discarded when it eventually arrives. The
//! agent's global timeout bounds how long that can take.
//!
//! `build_url`, `build_body`, and `build_request` are pure and public so the
//! transport-level request can be checked without a server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::Instrument;
use url::Url;

use crate::dispatch::CallbackDispatcher;
use crate::error::{ErrorItem, Fault};
use crate::http::{HttpMethod, HttpRequest, RequestPayload, ResponseItem};
use crate::lifecycle::{Outcome, RequestHandle, RequestLifecycle, TracingLifecycle};
use crate::status::HttpStatusCode;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives the single outcome of an executed request.
///
/// Each method consumes the callback, so at most one of them runs.
pub trait HttpResponseCallback: Send + 'static {
    fn on_success(self: Box<Self>, item: ResponseItem);

    fn on_failure(self: Box<Self>, error: ErrorItem);

    fn on_cancelled(self: Box<Self>);
}

/// Executes HTTP requests and reports results through callbacks.
pub trait HttpRequestExecutor: Send + Sync {
    /// Start `request`. Never fails synchronously: an unusable request is
    /// reported through `callback.on_failure`. The returned handle cancels
    /// this request only.
    fn execute(
        &self,
        request: HttpRequest,
        callback: Option<Box<dyn HttpResponseCallback>>,
    ) -> RequestHandle;

    /// Cancel the most recently issued request that is still tracked.
    fn cancel(&self);
}

impl<E: HttpRequestExecutor + ?Sized> HttpRequestExecutor for Arc<E> {
    fn execute(
        &self,
        request: HttpRequest,
        callback: Option<Box<dyn HttpResponseCallback>>,
    ) -> RequestHandle {
        (**self).execute(request, callback)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

/// A request body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBody {
    pub content_type: Option<String>,
    pub content: String,
}

/// A transport-level request: validated URL plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<PreparedBody>,
}

/// Parse `url` and append query parameters from `payload`.
///
/// Empty, unparseable, and non-http(s) URLs are rejected.
pub fn build_url(url: Option<&str>, payload: Option<&RequestPayload>) -> Result<Url, Fault> {
    let raw = url.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(Fault::InvalidUrl(raw.to_string()));
    }
    let mut parsed = Url::parse(raw).map_err(|_| Fault::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Fault::InvalidUrl(raw.to_string()));
    }

    if let Some(RequestPayload::UrlQueryParameters(params)) = payload {
        if !params.is_empty() {
            parsed.query_pairs_mut().extend_pairs(params.iter());
        }
    }
    Ok(parsed)
}

/// The body to send for `payload`, if any.
pub fn build_body(payload: Option<&RequestPayload>) -> Option<PreparedBody> {
    match payload? {
        RequestPayload::Empty => Some(PreparedBody {
            content_type: None,
            content: String::new(),
        }),
        RequestPayload::StringBody { content_type, body } => Some(PreparedBody {
            content_type: Some(content_type.clone()),
            content: body.clone(),
        }),
        RequestPayload::UrlQueryParameters(_) => None,
    }
}

pub fn build_request(request: &HttpRequest) -> Result<PreparedRequest, Fault> {
    let payload = request.payload.as_ref();
    Ok(PreparedRequest {
        method: request.method,
        url: build_url(request.url.as_deref(), payload)?,
        body: build_body(payload),
    })
}

/// Status and body exactly as the transport returned them.
#[derive(Debug)]
struct RawResponse {
    status: u16,
    body: String,
}

/// The default agent: HTTP statuses are data, not errors.
pub fn default_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(DEFAULT_TIMEOUT))
        .build()
        .new_agent()
}

/// `HttpRequestExecutor` backed by a `ureq` agent.
pub struct UreqRequestExecutor {
    agent: ureq::Agent,
    runtime: Handle,
    dispatcher: CallbackDispatcher,
    lifecycle: Arc<dyn RequestLifecycle>,
    current: Arc<Mutex<Option<RequestHandle>>>,
}

impl UreqRequestExecutor {
    /// Executor with the default agent. Request tasks and callback delivery
    /// run on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self::with_agent(default_agent(), runtime)
    }

    /// The agent must be configured with `http_status_as_error(false)`;
    /// otherwise every non-2xx response surfaces as a transport fault.
    pub fn with_agent(agent: ureq::Agent, runtime: Handle) -> Self {
        let dispatcher = CallbackDispatcher::spawn(&runtime);
        Self {
            agent,
            runtime,
            dispatcher,
            lifecycle: Arc::new(TracingLifecycle),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn RequestLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// The request `cancel` would currently target.
    pub fn current_request(&self) -> Option<RequestHandle> {
        self.current.lock().clone()
    }
}

impl HttpRequestExecutor for UreqRequestExecutor {
    fn execute(
        &self,
        request: HttpRequest,
        callback: Option<Box<dyn HttpResponseCallback>>,
    ) -> RequestHandle {
        let handle = RequestHandle::new(callback, Arc::clone(&self.lifecycle), self.dispatcher.clone());

        let prepared = match build_request(&request) {
            Ok(prepared) => prepared,
            Err(fault) => {
                tracing::warn!(request_id = %handle.id(), error = %fault, "rejecting request before dispatch");
                handle.complete(Outcome::Failure(ErrorItem::generic(fault)));
                return handle;
            }
        };

        *self.current.lock() = Some(handle.clone());

        let span = tracing::debug_span!(
            "http_request",
            request_id = %handle.id(),
            method = %prepared.method,
            host = prepared.url.host_str().unwrap_or_default(),
            path = prepared.url.path(),
        );
        let agent = self.agent.clone();
        let task = handle.clone();
        let current = Arc::clone(&self.current);
        self.runtime.spawn(
            async move {
                run(agent, prepared, &task).await;
                release(&current, &task);
            }
            .instrument(span),
        );

        handle
    }

    fn cancel(&self) {
        let tracked = self.current.lock().clone();
        match tracked {
            Some(handle) => {
                if handle.cancel() {
                    tracing::debug!(request_id = %handle.id(), "cancelled request");
                }
            }
            None => tracing::trace!("no request to cancel"),
        }
    }
}

async fn run(agent: ureq::Agent, request: PreparedRequest, handle: &RequestHandle) {
    if !handle.begin() {
        return;
    }

    let started = Instant::now();
    let call = tokio::task::spawn_blocking(move || send(&agent, &request));
    let joined = tokio::select! {
        biased;
        _ = handle.cancelled() => {
            tracing::debug!("abandoning in-flight transport call");
            return;
        }
        joined = call => joined,
    };

    let outcome = match joined {
        Ok(Ok(raw)) => classify(raw, started.elapsed()),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "transport failure");
            Outcome::Failure(ErrorItem::generic(err))
        }
        Err(join) => {
            tracing::error!(error = %join, "transport worker failed");
            Outcome::Failure(ErrorItem::generic(Fault::Worker(join.to_string())))
        }
    };
    handle.complete(outcome);
}

fn release(current: &Mutex<Option<RequestHandle>>, finished: &RequestHandle) {
    let mut current = current.lock();
    if current.as_ref().is_some_and(|tracked| tracked.same_request(finished)) {
        *current = None;
    }
}

fn send(agent: &ureq::Agent, request: &PreparedRequest) -> Result<RawResponse, ureq::Error> {
    let url = request.url.as_str();
    let body = request.body.as_ref();
    if body.is_some() && !request.method.requires_body() {
        tracing::debug!(method = %request.method, "ignoring body for method without one");
    }

    let mut response = match request.method {
        HttpMethod::Get => agent.get(url).call(),
        HttpMethod::Delete => agent.delete(url).call(),
        HttpMethod::Head => agent.head(url).call(),
        HttpMethod::Post => send_with_body(agent.post(url), body),
        HttpMethod::Put => send_with_body(agent.put(url), body),
        HttpMethod::Patch => send_with_body(agent.patch(url), body),
    }?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    Ok(RawResponse { status, body })
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&PreparedBody>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(PreparedBody {
            content_type: Some(content_type),
            content,
        }) => builder
            .content_type(content_type.as_str())
            .send(content.as_bytes()),
        Some(PreparedBody {
            content_type: None,
            content,
        }) if !content.is_empty() => builder.send(content.as_bytes()),
        _ => builder.send_empty(),
    }
}

fn classify(raw: RawResponse, elapsed: Duration) -> Outcome {
    let status = HttpStatusCode::from_code(raw.status);
    tracing::debug!(status = raw.status, elapsed_ms = elapsed.as_millis() as u64, "response received");

    if !status.is_successful() {
        let body = (!raw.body.is_empty()).then_some(raw.body);
        return Outcome::Failure(ErrorItem::http(status, Some(elapsed), body));
    }
    if raw.body.is_empty() {
        Outcome::Success(ResponseItem::EmptyResponse { status })
    } else {
        Outcome::Success(ResponseItem::StringResponse {
            status,
            body: raw.body,
        })
    }
}
