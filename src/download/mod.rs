//! Artifact download and save
//!
//! Artifacts are retrieved by the identifier the service put in a
//! [`GeneratedDocumentSet`](crate::contracts::GeneratedDocumentSet) and handed
//! to an [`ArtifactSaver`] under their display name.

mod saver;

pub use saver::{ArtifactSaver, DirectorySaver, SaveError};

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::contracts::{ArtifactReference, DownloadArtifact, ValidationError};
use crate::notify::NotificationSink;
use crate::observability::Metrics;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Download failed: {cause}")]
    Fetch {
        #[source]
        cause: TransportError,
    },

    #[error("Download cancelled")]
    Cancelled,

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),

    #[error(transparent)]
    InvalidFilename(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Fetches artifacts and saves them, reporting each attempt to the sink
#[derive(Clone)]
pub struct DownloadHandler {
    transport: Arc<dyn Transport>,
    saver: Arc<dyn ArtifactSaver>,
    sink: Arc<dyn NotificationSink>,
    metrics: Arc<Metrics>,
}

impl DownloadHandler {
    pub fn new(
        transport: Arc<dyn Transport>,
        saver: Arc<dyn ArtifactSaver>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            transport,
            saver,
            sink,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn download(&self, artifact: &ArtifactReference) -> Result<PathBuf> {
        self.download_with_cancel(artifact, CancellationToken::new())
            .await
    }

    pub async fn download_with_cancel(
        &self,
        artifact: &ArtifactReference,
        cancel: CancellationToken,
    ) -> Result<PathBuf> {
        self.download_as_with_cancel(artifact.identifier(), artifact.display_name(), cancel)
            .await
    }

    /// Fetch `filename` and save it as `display_name`
    ///
    /// A rejected filename returns before any request and without a notification.
    pub async fn download_as(&self, filename: &str, display_name: &str) -> Result<PathBuf> {
        self.download_as_with_cancel(filename, display_name, CancellationToken::new())
            .await
    }

    /// Like [`download_as`](Self::download_as); cancelling `cancel` aborts the
    /// fetch and reports the attempt as failed. Saving is not interrupted.
    pub async fn download_as_with_cancel(
        &self,
        filename: &str,
        display_name: &str,
        cancel: CancellationToken,
    ) -> Result<PathBuf> {
        let path = DownloadArtifact::path(filename)?;
        debug!(%path, display_name, "Downloading artifact");

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(filename, "Artifact fetch cancelled");
                self.failed();
                return Err(DownloadError::Cancelled);
            }
            fetched = self.transport.fetch_binary(&path) => fetched,
        };

        let data = match fetched {
            Ok(data) => data,
            Err(cause) => {
                warn!(filename, error = %cause, "Artifact fetch failed");
                self.failed();
                return Err(DownloadError::Fetch { cause });
            }
        };

        let size = data.len();
        match self.saver.save(data, display_name).await {
            Ok(saved) => {
                info!(filename, path = %saved.display(), size, "Artifact downloaded");
                self.metrics.artifact_saved();
                self.sink.notify(DownloadArtifact::success_notice(display_name));
                Ok(saved)
            }
            Err(e) => {
                warn!(filename, error = %e, "Artifact save failed");
                self.failed();
                Err(e.into())
            }
        }
    }

    fn failed(&self) {
        self.metrics.download_failed();
        self.sink.notify(DownloadArtifact::failure_notice());
    }
}
