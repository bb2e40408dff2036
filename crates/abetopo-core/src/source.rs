//! Input file access. This is the only module that touches the file system.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a regular file: {path}")]
    NotAFile { path: String },
}

/// A topology container loaded into memory.
#[derive(Debug, Clone)]
pub struct TopologyFile {
    data: Vec<u8>,
    modified: Option<SystemTime>,
}

impl TopologyFile {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(SourceError::NotAFile {
                path: path.display().to_string(),
            });
        }
        let data = fs::read(path)?;
        Ok(Self {
            data,
            modified: meta.modified().ok(),
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Modification time reported by the file system, when available.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}
