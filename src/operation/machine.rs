use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{AttemptId, ErrorInfo, OperationState};
use crate::config::ValidationConfig;
use crate::contracts::{Operation, ValidationError, dispatch};
use crate::notify::NotificationSink;
use crate::observability::Metrics;
use crate::transport::Transport;

#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// Another attempt on this instance has not settled yet
    #[error("an attempt is already in flight")]
    AlreadyInFlight,
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Failed(ErrorInfo),
}

impl SubmitError {
    pub fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            SubmitError::Failed(info) => Some(info),
            _ => None,
        }
    }
}

/// Lifecycle tracker and single-flight guard for one operation instance
///
/// Owned by whatever triggered the operation (a view, a CLI command). Every
/// attempt that gets past validation settles into exactly one terminal state
/// and produces exactly one notification, including attempts whose future is
/// dropped before completion.
pub struct OperationMachine<O: Operation> {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    metrics: Arc<Metrics>,
    policy: ValidationConfig,
    deadline: Option<Duration>,
    state: watch::Sender<OperationState<O::Response>>,
    _operation: PhantomData<fn() -> O>,
}

impl<O: Operation> OperationMachine<O> {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn NotificationSink>) -> Self {
        let (state, _) = watch::channel(OperationState::Idle);
        Self {
            transport,
            sink,
            metrics: Arc::new(Metrics::new()),
            policy: ValidationConfig::default(),
            deadline: None,
            state,
            _operation: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: ValidationConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each attempt; an attempt exceeding it settles as a timeout failure
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> OperationState<O::Response> {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<OperationState<O::Response>> {
        self.state.subscribe()
    }

    /// Submit a request and wait for it to settle
    pub async fn submit(&self, request: O::Request) -> Result<O::Response, SubmitError> {
        self.submit_with_cancel(request, CancellationToken::new()).await
    }

    /// Like [`submit`](Self::submit); cancelling `cancel` aborts the request and
    /// settles the attempt as a cancelled failure.
    pub async fn submit_with_cancel(
        &self,
        request: O::Request,
        cancel: CancellationToken,
    ) -> Result<O::Response, SubmitError> {
        // A pending instance refuses every submit, valid or not
        if self.is_pending() {
            return Err(self.rejected());
        }

        if let Err(err) = O::validate(&request, &self.policy) {
            debug!(operation = O::NAME, error = %err, "Request rejected locally");
            return Err(SubmitError::Validation(err));
        }

        let in_flight = self.begin()?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ErrorInfo::cancelled(failure_message::<O>())),
            result = self.run(&request) => result,
        };

        in_flight.settle(outcome)
    }

    /// Return a settled instance to `Idle`
    pub fn reset(&self) -> Result<(), SubmitError> {
        let mut in_flight = false;
        self.state.send_if_modified(|state| {
            if state.is_pending() {
                in_flight = true;
                return false;
            }
            !std::mem::replace(state, OperationState::Idle).is_idle()
        });

        if in_flight {
            return Err(SubmitError::AlreadyInFlight);
        }
        Ok(())
    }

    /// Claim the instance: the pending check and the transition happen under one lock
    fn begin(&self) -> Result<InFlight<'_, O>, SubmitError> {
        let attempt = AttemptId::new();

        let claimed = self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = OperationState::Pending { attempt };
            true
        });

        if !claimed {
            return Err(self.rejected());
        }

        self.metrics.operation_submitted();
        info!(operation = O::NAME, %attempt, "Operation pending");

        Ok(InFlight {
            machine: self,
            attempt,
            settled: false,
        })
    }

    fn rejected(&self) -> SubmitError {
        self.metrics.operation_rejected();
        debug!(operation = O::NAME, "Submit rejected, attempt already in flight");
        SubmitError::AlreadyInFlight
    }

    async fn run(&self, request: &O::Request) -> Result<O::Response, ErrorInfo> {
        let call = dispatch::<O>(self.transport.as_ref(), request);

        let result = match self.deadline {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => return Err(ErrorInfo::timed_out(limit, failure_message::<O>())),
            },
            None => call.await,
        };

        result.map_err(|err| ErrorInfo::from_transport(err, failure_message::<O>()))
    }

    fn settle(
        &self,
        attempt: AttemptId,
        outcome: Result<O::Response, ErrorInfo>,
    ) -> Result<O::Response, SubmitError> {
        match outcome {
            Ok(value) => {
                self.state.send_replace(OperationState::Success {
                    attempt,
                    value: value.clone(),
                });
                self.metrics.operation_succeeded();
                info!(operation = O::NAME, %attempt, "Operation succeeded");
                self.sink.notify(O::success_notice(&value));
                Ok(value)
            }
            Err(error) => {
                self.state.send_replace(OperationState::Failure {
                    attempt,
                    error: error.clone(),
                });
                self.metrics.operation_failed();
                warn!(
                    operation = O::NAME,
                    %attempt,
                    kind = ?error.kind,
                    cause = %error.detail(),
                    "Operation failed"
                );
                self.sink.notify(O::failure_notice());
                Err(SubmitError::Failed(error))
            }
        }
    }
}

fn failure_message<O: Operation>() -> String {
    O::failure_notice().description
}

/// A claimed attempt; settles as cancelled if dropped before completion
struct InFlight<'a, O: Operation> {
    machine: &'a OperationMachine<O>,
    attempt: AttemptId,
    settled: bool,
}

impl<O: Operation> InFlight<'_, O> {
    fn settle(mut self, outcome: Result<O::Response, ErrorInfo>) -> Result<O::Response, SubmitError> {
        self.settled = true;
        self.machine.settle(self.attempt, outcome)
    }
}

impl<O: Operation> Drop for InFlight<'_, O> {
    fn drop(&mut self) {
        if !self.settled {
            debug!(operation = O::NAME, attempt = %self.attempt, "Attempt abandoned before settling");
            let _ = self
                .machine
                .settle(self.attempt, Err(ErrorInfo::cancelled(failure_message::<O>())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ApplyToJob, JobApplicationRequest, JobApplicationResult};
    use crate::notify::MemorySink;
    use crate::operation::ErrorKind;
    use crate::transport::{Method, TransportError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Counts calls and holds each one until released
    struct GatedTransport {
        calls: AtomicUsize,
        gate: Notify,
        gated: bool,
        reply: Result<Value, TransportError>,
    }

    impl GatedTransport {
        fn immediate(reply: Result<Value, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                gated: false,
                reply,
            })
        }

        fn held(reply: Result<Value, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                gated: true,
                reply,
            })
        }

        fn release(&self) {
            self.gate.notify_one();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(
            &self,
            _method: Method,
            _path: &str,
            _body: Option<Value>,
        ) -> crate::transport::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.gate.notified().await;
            }
            self.reply.clone()
        }

        async fn fetch_binary(&self, _path: &str) -> crate::transport::Result<Bytes> {
            unreachable!("operations never fetch binaries")
        }
    }

    fn machine(
        transport: Arc<GatedTransport>,
        sink: Arc<MemorySink>,
    ) -> Arc<OperationMachine<ApplyToJob>> {
        Arc::new(OperationMachine::new(transport, sink))
    }

    fn request() -> JobApplicationRequest {
        JobApplicationRequest::new("https://www.linkedin.com/jobs/view/42")
    }

    async fn wait_pending(machine: &OperationMachine<ApplyToJob>) {
        let mut rx = machine.subscribe();
        rx.wait_for(|state| state.is_pending()).await.unwrap();
    }

    #[tokio::test]
    async fn success_settles_and_notifies_once() {
        let transport = GatedTransport::immediate(Ok(json!({ "message": "Applied" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());

        assert!(machine.state().is_idle());

        let result = machine.submit(request()).await.unwrap();
        assert_eq!(result.message, "Applied");

        let first = machine.state();
        let second = machine.state();
        assert_eq!(first, second);
        assert_eq!(
            first.value(),
            Some(&JobApplicationResult { message: "Applied".to_string() })
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "Applied");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_rejected() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());

        let first = tokio::spawn({
            let machine = machine.clone();
            async move { machine.submit(request()).await }
        });

        wait_pending(&machine).await;

        let second = machine.submit(request()).await;
        assert!(matches!(second, Err(SubmitError::AlreadyInFlight)));
        assert!(sink.is_empty());

        transport.release();
        first.await.unwrap().unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(sink.len(), 1);
        assert!(machine.state().is_terminal());
    }

    #[tokio::test]
    async fn invalid_submit_while_pending_is_rejected_as_in_flight() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let metrics = Arc::new(Metrics::new());
        let machine = Arc::new(
            OperationMachine::<ApplyToJob>::new(transport.clone(), sink.clone())
                .with_metrics(metrics.clone()),
        );

        let first = tokio::spawn({
            let machine = machine.clone();
            async move { machine.submit(request()).await }
        });

        wait_pending(&machine).await;
        let pending_attempt = machine.state().attempt();

        let second = machine.submit(JobApplicationRequest::new("")).await;
        assert!(matches!(second, Err(SubmitError::AlreadyInFlight)));
        assert!(machine.is_pending());
        assert_eq!(machine.state().attempt(), pending_attempt);
        assert!(sink.is_empty());

        transport.release();
        first.await.unwrap().unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(metrics.snapshot().operations_rejected, 1);
    }

    #[tokio::test]
    async fn validation_failure_leaves_state_untouched() {
        let transport = GatedTransport::immediate(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());

        let err = machine.submit(JobApplicationRequest::new(" ")).await.unwrap_err();

        assert!(matches!(err, SubmitError::Validation(ValidationError::MissingField("job_url"))));
        assert!(machine.state().is_idle());
        assert_eq!(transport.calls(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_cause_and_allows_resubmission() {
        let transport = GatedTransport::immediate(Err(TransportError::HttpFailure {
            status: 500,
            body: Some("boom".to_string()),
        }));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());

        let err = machine.submit(request()).await.unwrap_err();
        let info = err.error_info().unwrap();
        assert_eq!(info.kind, ErrorKind::Http);
        assert_eq!(info.status(), Some(500));
        assert_eq!(info.message, "Failed to process job application. Please try again.");

        let failed_attempt = machine.state().attempt();
        assert!(machine.submit(request()).await.is_err());
        assert_ne!(machine.state().attempt(), failed_attempt);

        assert_eq!(transport.calls(), 2);
        assert_eq!(sink.failures().len(), 2);
    }

    #[tokio::test]
    async fn cancellation_settles_as_cancelled_failure() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());
        let token = CancellationToken::new();

        let task = tokio::spawn({
            let machine = machine.clone();
            let token = token.clone();
            async move { machine.submit_with_cancel(request(), token).await }
        });

        wait_pending(&machine).await;
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.error_info().map(|i| i.kind), Some(ErrorKind::Cancelled));
        assert_eq!(machine.state().error().map(|e| e.kind), Some(ErrorKind::Cancelled));
        assert_eq!(sink.failures().len(), 1);
    }

    #[tokio::test]
    async fn dropped_submit_does_not_leave_state_pending() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), machine.submit(request())).await;
        assert!(abandoned.is_err());

        assert_eq!(machine.state().error().map(|e| e.kind), Some(ErrorKind::Cancelled));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn deadline_settles_as_timeout() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = OperationMachine::<ApplyToJob>::new(transport, sink.clone())
            .with_deadline(Some(Duration::from_millis(20)));

        let err = machine.submit(request()).await.unwrap_err();
        let info = err.error_info().unwrap();
        assert_eq!(info.kind, ErrorKind::Timeout);
        assert!(info.cause.as_ref().is_some_and(TransportError::is_timeout));
        assert_eq!(sink.failures().len(), 1);
    }

    #[tokio::test]
    async fn reset_is_refused_while_pending() {
        let transport = GatedTransport::held(Ok(json!({ "message": "ok" })));
        let sink = Arc::new(MemorySink::new());
        let machine = machine(transport.clone(), sink);

        let task = tokio::spawn({
            let machine = machine.clone();
            async move { machine.submit(request()).await }
        });
        wait_pending(&machine).await;

        assert!(matches!(machine.reset(), Err(SubmitError::AlreadyInFlight)));

        transport.release();
        task.await.unwrap().unwrap();

        machine.reset().unwrap();
        assert!(machine.state().is_idle());
    }

    #[tokio::test]
    async fn metrics_track_outcomes() {
        let transport = GatedTransport::immediate(Ok(json!({ "unexpected": true })));
        let sink = Arc::new(MemorySink::new());
        let metrics = Arc::new(Metrics::new());
        let machine = OperationMachine::<ApplyToJob>::new(transport, sink)
            .with_metrics(metrics.clone());

        let err = machine.submit(request()).await.unwrap_err();
        assert_eq!(err.error_info().map(|i| i.kind), Some(ErrorKind::Decode));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.operations_submitted, 1);
        assert_eq!(snapshot.operations_failed, 1);
        assert_eq!(snapshot.operations_succeeded, 0);
    }
}
