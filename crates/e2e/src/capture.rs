//! Capture sink: persist one screenshot per scenario
//!
//! The browser writes into a private staging file. Only once that file is
//! known to be a real PNG is it moved over the artifact path, so a failed
//! capture never leaves a half-written image behind.

use image::GenericImageView;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// A screenshot that has been written to its final path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: u64,
    pub width: u32,
    pub height: u32,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct CaptureSink {
    artifact_dir: PathBuf,
}

impl CaptureSink {
    /// The sink never creates `artifact_dir`. A missing directory fails the capture.
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn destination(&self, artifact: &str) -> PathBuf {
        self.artifact_dir.join(artifact)
    }

    /// [`CaptureSink::persist`] on the blocking pool
    pub async fn persist_async(&self, staged: PathBuf, artifact: String) -> E2eResult<Artifact> {
        let sink = self.clone();
        let destination = self.destination(&artifact);
        tokio::task::spawn_blocking(move || sink.persist(&staged, &artifact))
            .await
            .map_err(|e| E2eError::capture(destination, e))?
    }

    /// Move a staged screenshot onto `artifact`, replacing any earlier run's file
    pub fn persist(&self, staged: &Path, artifact: &str) -> E2eResult<Artifact> {
        let destination = self.destination(artifact);

        let data = std::fs::read(staged)
            .map_err(|e| E2eError::capture(&destination, format!("no screenshot produced: {}", e)))?;
        if data.is_empty() {
            return Err(E2eError::capture(&destination, "screenshot is empty"));
        }

        let decoded = image::load_from_memory_with_format(&data, image::ImageFormat::Png)
            .map_err(|e| E2eError::capture(&destination, format!("not a valid PNG: {}", e)))?;

        if !self.artifact_dir.is_dir() {
            return Err(E2eError::capture(
                &destination,
                format!("directory {} does not exist", self.artifact_dir.display()),
            ));
        }

        let mut tmp = NamedTempFile::new_in(&self.artifact_dir)
            .map_err(|e| E2eError::capture(&destination, e))?;
        tmp.write_all(&data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| E2eError::capture(&destination, e))?;
        tmp.persist(&destination)
            .map_err(|e| E2eError::capture(&destination, e.error))?;

        let (width, height) = decoded.dimensions();
        let artifact = Artifact {
            path: destination,
            bytes: data.len() as u64,
            width,
            height,
            sha256: sha256_hex(&data),
        };
        debug!(
            "Wrote {} ({}x{}, {} bytes)",
            artifact.path.display(),
            artifact.width,
            artifact.height,
            artifact.bytes
        );
        Ok(artifact)
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
