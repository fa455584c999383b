use std::path::PathBuf;

use serde::Serialize;

/// One file of a torrent, placed within the concatenated piece data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    /// Single-file torrents use the torrent name; multi-file torrents root
    /// every path at the name.
    pub path: PathBuf,
    pub length: u64,
    /// Byte offset of the file's first byte in the concatenated data.
    pub offset: u64,
}

impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, length: u64, offset: u64) -> Self {
        Self {
            path: path.into(),
            length,
            offset,
        }
    }

    /// Offset one past the file's last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}
