// infohash.rs
use crate::bencode::{encode_bvalue, BValue};
use crate::hash::{sha1, InfoHash};

/// Hashes the canonical encoding of the `info` value as it was parsed.
///
/// The digest is taken over the bencode value rather than over
/// `TorrentInfo`, so keys the descriptor does not model (`private`,
/// `source`, ...) still contribute to the hash. Also returns the encoded
/// bytes so callers can keep them.
pub fn calculate_info_hash(info: &BValue) -> (InfoHash, Vec<u8>) {
    let encoded = encode_bvalue(info);
    (sha1(&encoded), encoded)
}
