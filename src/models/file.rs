use serde::Serialize;
use std::path::PathBuf;

/// A file found while walking the source
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    /// Path segments relative to the torrent root
    pub path: Vec<String>,
    /// Absolute path for reading the file
    pub full_path: PathBuf,
    /// File size in bytes at scan time
    pub len: u64,
}

/// File entry in the v1 "files" list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub length: u64,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FileEntry {
    pub fn new(path: Vec<String>, length: u64) -> Self {
        Self {
            length,
            path,
            attr: None,
        }
    }

    /// Synthetic zero-filled file aligning the next file to a piece boundary
    pub fn padding(length: u64) -> Self {
        Self {
            length,
            path: vec![".pad".to_string(), length.to_string()],
            attr: Some("p".to_string()),
        }
    }

    pub fn is_padding(&self) -> bool {
        self.attr.as_deref().is_some_and(|attr| attr.contains('p'))
    }
}
