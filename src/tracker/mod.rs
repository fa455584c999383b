//! Tracker announce: request URL building, the HTTP transport and the
//! response decoder.

pub mod error;
pub mod http;
pub mod peer;
pub mod request;
pub mod response;

pub use error::TrackerError;
pub use http::HttpTracker;
pub use peer::PeerInfo;
pub use request::{AnnounceRequest, TrackerEvent};
pub use response::{decode_response, TrackerResponse};
