use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid content key '{0}'")]
    InvalidKey(String),

    #[error("content '{0}' not found")]
    NotFound(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Post bodies on disk.
///
/// Each body is a flat file at `{dir}/{key}`. Keys are opaque; the document
/// store generates them and keeps them in the post row. There is no locking:
/// two writers to the same key race and the last one wins.
pub struct ContentBlobs {
    dir: PathBuf,
}

impl ContentBlobs {
    pub async fn new(dir: PathBuf) -> Result<Self, BlobError> {
        fs::create_dir_all(&dir).await?;
        info!("Content storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// A fresh random key for a new markdown body.
    pub fn new_key() -> String {
        format!("{}.md", Uuid::new_v4())
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() || key == "." || key.contains("..") || key.contains(['/', '\\', '\0']) {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }

    /// Creates or overwrites the body stored under `key`.
    pub async fn write(&self, key: &str, text: &str) -> Result<(), BlobError> {
        let path = self.file_path(key)?;
        fs::write(&path, text).await?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    pub async fn read(&self, key: &str) -> Result<String, BlobError> {
        let path = self.file_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
