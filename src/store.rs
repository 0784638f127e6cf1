use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::AppError;
use crate::models::TrafficSample;

/// Append-only storage for traffic samples.
///
/// Implementations must keep records immutable: `append` may only add to the
/// backing medium, never rewrite it, so a crash mid-write can at worst lose
/// the record being written.
#[async_trait]
pub trait TrafficStore: Send + Sync {
    /// Durably records one sample.
    async fn append(&self, sample: &TrafficSample) -> Result<(), AppError>;

    /// Returns every record ever appended, in append order.
    ///
    /// Malformed records are skipped, not fatal. A missing backing store
    /// yields an empty list.
    async fn load_all(&self) -> Result<Vec<TrafficSample>, AppError>;
}

/// Line-delimited JSON file store, one record per line.
pub struct FileTrafficStore {
    path: PathBuf,
}

impl FileTrafficStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TrafficStore for FileTrafficStore {
    async fn append(&self, sample: &TrafficSample) -> Result<(), AppError> {
        let mut line = serde_json::to_string(sample)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<TrafficSample>, AppError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut samples = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TrafficSample>(line) {
                Ok(sample) => samples.push(sample),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed traffic log record"
                ),
            }
        }
        Ok(samples)
    }
}
