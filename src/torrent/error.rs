use thiserror::Error;

/// Reasons a metainfo value is rejected. Decoding stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TorrentError {
    /// Not a dictionary at the top level, not bencode at all, or unreadable.
    #[error("Invalid torrent format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field '{0}'")]
    MissingRequiredField(&'static str),

    #[error("Invalid type for field '{0}'")]
    InvalidFieldType(&'static str),

    #[error("Invalid piece length {0}")]
    InvalidPieceLength(i64),

    #[error("Invalid piece hash data: {0} bytes is not a multiple of 20")]
    InvalidPieceHash(usize),
}
