//! Per-request lifecycle tracking.
//!
//! # Design
//! A `RequestHandle` is created for every executed request and is the only
//! place its state changes. The state and the pending callback sit behind one
//! lock: whoever moves the request into a terminal state takes the callback,
//! so exactly one of success, failure, or cancellation is ever delivered and
//! nothing is reported afterwards. Cancelling simply races for that lock;
//! if it wins, a transport result that shows up later is discarded.
//!
//! Lifecycle observers are notified while the lock is held, which keeps the
//! Queued -> InFlight -> terminal order strict. Observers must not call back
//! into the handle that is notifying them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::dispatch::CallbackDispatcher;
use crate::error::ErrorItem;
use crate::executor::HttpResponseCallback;
use crate::http::ResponseItem;

/// Random identifier assigned to each executed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    Queued,
    InFlight,
    Successful,
    Failed,
    Cancelled,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Successful | RequestState::Failed | RequestState::Cancelled
        )
    }
}

/// Observer of request state transitions.
pub trait RequestLifecycle: Send + Sync {
    fn on_state_changed(&self, request: RequestId, state: RequestState);
}

impl<F> RequestLifecycle for F
where
    F: Fn(RequestId, RequestState) + Send + Sync,
{
    fn on_state_changed(&self, request: RequestId, state: RequestState) {
        self(request, state)
    }
}

/// Default observer: logs every transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLifecycle;

impl RequestLifecycle for TracingLifecycle {
    fn on_state_changed(&self, request: RequestId, state: RequestState) {
        tracing::debug!(request_id = %request, ?state, "request state changed");
    }
}

/// How a request ended.
#[derive(Debug)]
pub enum Outcome {
    Success(ResponseItem),
    Failure(ErrorItem),
    Cancelled,
}

impl Outcome {
    pub fn state(&self) -> RequestState {
        match self {
            Outcome::Success(_) => RequestState::Successful,
            Outcome::Failure(_) => RequestState::Failed,
            Outcome::Cancelled => RequestState::Cancelled,
        }
    }

    fn deliver(self, callback: Box<dyn HttpResponseCallback>) {
        match self {
            Outcome::Success(item) => callback.on_success(item),
            Outcome::Failure(error) => callback.on_failure(error),
            Outcome::Cancelled => callback.on_cancelled(),
        }
    }
}

struct Slot {
    state: RequestState,
    callback: Option<Box<dyn HttpResponseCallback>>,
}

struct Tracked {
    id: RequestId,
    token: CancellationToken,
    lifecycle: Arc<dyn RequestLifecycle>,
    dispatcher: CallbackDispatcher,
    slot: Mutex<Slot>,
}

/// Shared handle to one request's lifecycle. Cheap to clone.
#[derive(Clone)]
pub struct RequestHandle {
    inner: Arc<Tracked>,
}

impl RequestHandle {
    /// Start tracking a new request. Reports `Queued` immediately.
    pub fn new(
        callback: Option<Box<dyn HttpResponseCallback>>,
        lifecycle: Arc<dyn RequestLifecycle>,
        dispatcher: CallbackDispatcher,
    ) -> Self {
        let id = RequestId::new();
        lifecycle.on_state_changed(id, RequestState::Queued);
        Self {
            inner: Arc::new(Tracked {
                id,
                token: CancellationToken::new(),
                lifecycle,
                dispatcher,
                slot: Mutex::new(Slot {
                    state: RequestState::Queued,
                    callback,
                }),
            }),
        }
    }

    pub fn id(&self) -> RequestId {
        self.inner.id
    }

    pub fn state(&self) -> RequestState {
        self.inner.slot.lock().state
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Move from `Queued` to `InFlight`. Returns `false` if the request
    /// already left the queue, typically because it was cancelled.
    pub fn begin(&self) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.state != RequestState::Queued {
            return false;
        }
        slot.state = RequestState::InFlight;
        self.inner.lifecycle.on_state_changed(self.inner.id, RequestState::InFlight);
        true
    }

    /// Finish the request with `outcome` and post the matching callback.
    /// Returns `false`, dropping the outcome, if the request already finished.
    pub fn complete(&self, outcome: Outcome) -> bool {
        let state = outcome.state();
        let callback = {
            let mut slot = self.inner.slot.lock();
            if slot.state.is_terminal() {
                tracing::trace!(
                    request_id = %self.inner.id,
                    finished = ?slot.state,
                    discarded = ?state,
                    "request already finished; discarding outcome"
                );
                return false;
            }
            slot.state = state;
            self.inner.lifecycle.on_state_changed(self.inner.id, state);
            slot.callback.take()
        };

        if let Some(callback) = callback {
            self.inner.dispatcher.post(move || outcome.deliver(callback));
        }
        true
    }

    /// Cancel the request. Returns `true` if this call is what ended it; a
    /// request that already finished is left alone.
    pub fn cancel(&self) -> bool {
        let cancelled = self.complete(Outcome::Cancelled);
        if cancelled {
            self.inner.token.cancel();
        }
        cancelled
    }

    /// Resolves once the request has been cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    pub fn same_request(&self, other: &RequestHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;
    use crate::status::HttpStatusCode;
    use std::time::Duration;
    use tokio::runtime::Handle;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Success(u16),
        Failure,
        Cancelled,
    }

    struct Recorder(mpsc::UnboundedSender<Event>);

    impl HttpResponseCallback for Recorder {
        fn on_success(self: Box<Self>, item: ResponseItem) {
            let _ = self.0.send(Event::Success(item.status().code()));
        }

        fn on_failure(self: Box<Self>, _error: ErrorItem) {
            let _ = self.0.send(Event::Failure);
        }

        fn on_cancelled(self: Box<Self>) {
            let _ = self.0.send(Event::Cancelled);
        }
    }

    fn tracked() -> (
        RequestHandle,
        mpsc::UnboundedReceiver<Event>,
        Arc<Mutex<Vec<RequestState>>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        let lifecycle = move |_: RequestId, state: RequestState| sink.lock().push(state);
        let handle = RequestHandle::new(
            Some(Box::new(Recorder(tx))),
            Arc::new(lifecycle),
            CallbackDispatcher::spawn(&Handle::current()),
        );
        (handle, rx, states)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn success_path_reports_ordered_states() {
        let (handle, mut rx, states) = tracked();
        assert!(handle.begin());
        assert!(handle.complete(Outcome::Success(ResponseItem::EmptyResponse {
            status: HttpStatusCode::OK,
        })));

        assert_eq!(next(&mut rx).await, Event::Success(200));
        assert_eq!(
            *states.lock(),
            vec![RequestState::Queued, RequestState::InFlight, RequestState::Successful]
        );
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn cancel_wins_over_late_result() {
        let (handle, mut rx, states) = tracked();
        assert!(handle.begin());
        assert!(handle.cancel());
        assert!(!handle.complete(Outcome::Failure(ErrorItem::generic(Fault::Worker(
            "late".to_string()
        )))));
        assert!(!handle.cancel());

        assert_eq!(next(&mut rx).await, Event::Cancelled);
        assert!(rx.try_recv().is_err());
        assert_eq!(
            *states.lock(),
            vec![RequestState::Queued, RequestState::InFlight, RequestState::Cancelled]
        );
    }

    #[tokio::test]
    async fn cancel_before_begin_skips_in_flight() {
        let (handle, mut rx, states) = tracked();
        assert!(handle.cancel());
        assert!(!handle.begin());
        handle.cancelled().await;

        assert_eq!(next(&mut rx).await, Event::Cancelled);
        assert_eq!(*states.lock(), vec![RequestState::Queued, RequestState::Cancelled]);
    }

    #[tokio::test]
    async fn cancel_after_completion_is_noop() {
        let (handle, mut rx, states) = tracked();
        assert!(handle.complete(Outcome::Failure(ErrorItem::http(
            HttpStatusCode::BAD_REQUEST,
            None,
            None
        ))));
        assert!(!handle.cancel());

        assert_eq!(next(&mut rx).await, Event::Failure);
        assert_eq!(states.lock().last(), Some(&RequestState::Failed));
        assert_eq!(handle.state(), RequestState::Failed);
    }

    #[test]
    fn terminal_states() {
        assert!(!RequestState::Queued.is_terminal());
        assert!(!RequestState::InFlight.is_terminal());
        assert!(RequestState::Successful.is_terminal());
        assert!(RequestState::Failed.is_terminal());
        assert!(RequestState::Cancelled.is_terminal());
    }
}
