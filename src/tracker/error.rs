use thiserror::Error;

use crate::bencode::BencodeError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Connection to tracker failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid tracker response: {0}")]
    InvalidResponse(String),

    /// The tracker answered with a `failure reason`.
    #[error("Tracker failure: {0}")]
    TrackerFailure(String),

    #[error("Tracker request timed out")]
    Timeout,

    #[error("Tracker response bencode error: {0}")]
    ParseError(#[from] BencodeError),
}
