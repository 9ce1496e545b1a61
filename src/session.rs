//! Explicit client context
//!
//! A [`Session`] owns the immutable configuration and the shared collaborators
//! (transport, notification sink, metrics) and hands out operation machines
//! and download handlers wired to them. Changing the base endpoint means
//! building a new session.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::contracts::{ApplyToJob, GenerateDocuments, Operation, UpdateProfile};
use crate::download::{ArtifactSaver, DirectorySaver, DownloadHandler};
use crate::notify::NotificationSink;
use crate::observability::Metrics;
use crate::operation::OperationMachine;
use crate::transport::{BuildError, HttpTransport, Transport};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] BuildError),
}

#[derive(Clone)]
pub struct Session {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
    metrics: Arc<Metrics>,
}

impl Session {
    /// Build a session backed by [`HttpTransport`]
    pub fn connect(config: Config, sink: Arc<dyn NotificationSink>) -> Result<Self, SessionError> {
        let transport = HttpTransport::new(&config.backend)?;
        info!(base_url = %transport.base_url(), "Session connected");
        Ok(Self::with_transport(config, Arc::new(transport), sink))
    }

    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            sink,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// A fresh machine for `O`; each call returns an independent instance
    pub fn machine<O: Operation>(&self) -> OperationMachine<O> {
        OperationMachine::new(self.transport.clone(), self.sink.clone())
            .with_policy(self.config.validation.clone())
            .with_deadline(
                self.config
                    .backend
                    .operation_timeout
                    .map(|limit| limit.as_duration()),
            )
            .with_metrics(self.metrics.clone())
    }

    pub fn generate_documents(&self) -> OperationMachine<GenerateDocuments> {
        self.machine()
    }

    pub fn apply_to_job(&self) -> OperationMachine<ApplyToJob> {
        self.machine()
    }

    pub fn update_profile(&self) -> OperationMachine<UpdateProfile> {
        self.machine()
    }

    /// Download handler saving into the configured directory
    pub fn downloads(&self) -> DownloadHandler {
        let saver = DirectorySaver::new(self.config.downloads.directory.clone());
        self.downloads_with(Arc::new(saver))
    }

    pub fn downloads_with(&self, saver: Arc<dyn ArtifactSaver>) -> DownloadHandler {
        DownloadHandler::new(self.transport.clone(), saver, self.sink.clone())
            .with_metrics(self.metrics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;
    use crate::notify::MemorySink;

    #[test]
    fn connect_rejects_unparseable_base_url() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();

        let result = Session::connect(config, Arc::new(MemorySink::new()));
        assert!(matches!(result, Err(SessionError::Transport(_))));
    }

    #[tokio::test]
    async fn machines_are_independent_and_share_metrics() {
        let mut config = Config::default();
        config.backend.operation_timeout = Some(HumanDuration::from_secs(5));
        let session = Session::connect(config, Arc::new(MemorySink::new())).unwrap();

        let first = session.apply_to_job();
        let second = session.apply_to_job();
        assert!(first.state().is_idle());
        assert!(second.state().is_idle());

        let err = first
            .submit(crate::contracts::JobApplicationRequest::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::operation::SubmitError::Validation(_)));
        assert_eq!(session.metrics().snapshot().operations_submitted, 0);
    }
}
