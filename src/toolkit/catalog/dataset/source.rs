use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::{CatalogError, Result};


pub type DatasetReader = Box<dyn Read + Send>;


/// Where the provider document comes from. Compression is detected by the
/// loader, so sources hand back the bytes exactly as stored.
#[async_trait]
pub trait DatasetSource: Send + Sync {

    async fn open(&self) -> Result<DatasetReader>;


    fn describe(&self) -> String;
}


#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn open(&self) -> Result<DatasetReader> {
        debug!("Opening dataset file: {}", self.path.display());
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| CatalogError::Io(format!("{}: {}", self.path.display(), e)))?;
        Ok(Box::new(file.into_std().await))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}


#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::new(value.to_string())
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn open(&self) -> Result<DatasetReader> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }

    fn describe(&self) -> String {
        format!("memory:{} bytes", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_reopens_from_start() {
        let source = MemorySource::new("[]");
        for _ in 0..2 {
            let mut text = String::new();
            source.open().await.unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "[]");
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/definitely/not/here.json");
        let err = source.open().await.err().unwrap();
        assert!(matches!(err, CatalogError::Io(_)));
        assert!(source.describe().starts_with("file:"));
    }
}
