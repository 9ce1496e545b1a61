use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save task failed: {0}")]
    Task(String),
}

/// Save-as primitive: hands downloaded bytes to the host under a suggested name
#[async_trait]
pub trait ArtifactSaver: Send + Sync {
    /// Returns where the artifact ended up
    async fn save(&self, data: Bytes, suggested_name: &str) -> Result<PathBuf, SaveError>;
}

/// Saves artifacts into a fixed directory
///
/// Bytes are staged in a `.part` file next to the target and renamed into
/// place once fully written, so a failed save never leaves a partial file
/// under the final name. An existing file with the same name is replaced.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Final path for `suggested_name`; directory components are dropped
    pub fn target_for(&self, suggested_name: &str) -> Result<PathBuf, SaveError> {
        let name = Path::new(suggested_name.trim())
            .file_name()
            .ok_or_else(|| SaveError::InvalidName(suggested_name.to_string()))?;
        Ok(self.directory.join(name))
    }
}

#[async_trait]
impl ArtifactSaver for DirectorySaver {
    async fn save(&self, data: Bytes, suggested_name: &str) -> Result<PathBuf, SaveError> {
        let target = self.target_for(suggested_name)?;
        let directory = self.directory.clone();
        let size = data.len();

        let saved = tokio::task::spawn_blocking(move || write_staged(&directory, &target, &data))
            .await
            .map_err(|e| SaveError::Task(e.to_string()))??;

        info!(path = %saved.display(), size, "Artifact saved");
        Ok(saved)
    }
}

fn write_staged(directory: &Path, target: &Path, data: &[u8]) -> Result<PathBuf, SaveError> {
    std::fs::create_dir_all(directory)?;

    // Removed on drop unless persisted
    let mut staging = tempfile::Builder::new()
        .prefix(".jobflow-")
        .suffix(".part")
        .tempfile_in(directory)?;

    staging.write_all(data)?;
    staging.as_file().sync_all()?;

    staging.persist(target).map_err(|e| SaveError::Io(e.error))?;
    Ok(target.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn saves_under_suggested_name() {
        let dir = TempDir::new().unwrap();
        let saver = DirectorySaver::new(dir.path());

        let path = saver
            .save(Bytes::from_static(b"docx bytes"), "CV.docx")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("CV.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"docx bytes");
        assert_eq!(entries(dir.path()), vec!["CV.docx"]);
    }

    #[tokio::test]
    async fn creates_missing_directory_and_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("docs");
        let saver = DirectorySaver::new(&nested);

        saver.save(Bytes::from_static(b"old"), "CoverLetter.docx").await.unwrap();
        let path = saver.save(Bytes::from_static(b"new"), "CoverLetter.docx").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"new");
        assert_eq!(entries(&nested), vec!["CoverLetter.docx"]);
    }

    #[test]
    fn target_drops_directory_components() {
        let saver = DirectorySaver::new("/data/downloads");

        assert_eq!(
            saver.target_for("../../etc/CV.docx").unwrap(),
            PathBuf::from("/data/downloads/CV.docx")
        );
        assert!(matches!(saver.target_for(".."), Err(SaveError::InvalidName(_))));
        assert!(matches!(saver.target_for(""), Err(SaveError::InvalidName(_))));
    }

    #[tokio::test]
    async fn failed_save_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        // A directory occupying the target name makes the final rename fail
        std::fs::create_dir(dir.path().join("CV.docx")).unwrap();
        let saver = DirectorySaver::new(dir.path());

        let err = saver
            .save(Bytes::from_static(b"docx bytes"), "CV.docx")
            .await
            .unwrap_err();

        assert!(matches!(err, SaveError::Io(_)));
        assert_eq!(entries(dir.path()), vec!["CV.docx"]);
        assert!(dir.path().join("CV.docx").is_dir());
    }
}
