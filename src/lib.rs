// lib.rs - Library interface for decoding torrent metainfo and tracker responses

pub mod bencode;
pub mod config;
pub mod hash;
pub mod torrent;
pub mod tracker;
pub mod utils;

// Re-export commonly used types
pub use bencode::{decode_bencode, encode_bvalue, parse, BValue, BencodeError};
pub use config::{Config, ConfigError};
pub use hash::{sha1, HexError, InfoHash, Sha1Hash};
pub use torrent::{FileInfo, Torrent, TorrentError, TorrentInfo};
pub use tracker::{
    decode_response, AnnounceRequest, HttpTracker, PeerInfo, TrackerError, TrackerEvent,
    TrackerResponse,
};
pub use utils::{generate_peer_id, PeerId};
