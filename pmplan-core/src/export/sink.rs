//! Destinations for export payloads

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use super::ExportPayload;
use crate::Result;

/// Somewhere an encoded export can be saved
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Save the payload and return where it went
    async fn save(&self, payload: &ExportPayload) -> Result<PathBuf>;
}

/// Writes payloads into a directory under their own file names
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, payload: &ExportPayload) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(&payload.file_name);
        fs::write(&path, &payload.bytes).await?;

        info!(path = %path.display(), bytes = payload.bytes.len(), "Saved export");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload(name: &str, body: &str) -> ExportPayload {
        ExportPayload {
            file_name: name.to_string(),
            mime_type: "text/csv".to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_directory_sink_creates_dir() {
        let temp = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp.path().join("exports"));

        let path = sink.save(&payload("plan.csv", "id\n")).await.unwrap();
        assert_eq!(path, temp.path().join("exports").join("plan.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\n");
    }

    #[tokio::test]
    async fn test_directory_sink_overwrites() {
        let temp = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp.path());

        sink.save(&payload("plan.json", "first")).await.unwrap();
        let path = sink.save(&payload("plan.json", "second")).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
    }
}
