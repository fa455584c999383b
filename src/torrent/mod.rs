pub mod error;
pub mod file;
pub mod infohash;
pub mod metadata;

pub use error::TorrentError;
pub use file::FileInfo;
pub use infohash::calculate_info_hash;
pub use metadata::{Torrent, TorrentInfo};
