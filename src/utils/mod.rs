mod url_encode;

pub use url_encode::url_encode_bytes;
use rand::Rng;
use rand::distributions::Alphanumeric;

/// 20 raw bytes identifying this client to trackers.
pub type PeerId = [u8; 20];

/// Builds a peer id from an Azureus-style prefix (e.g. `-RM0001-`) followed
/// by random alphanumeric bytes. A prefix longer than 20 bytes is truncated.
pub fn generate_peer_id(prefix: &str) -> PeerId {
	let mut rng = rand::thread_rng();
	let mut peer_id = [0u8; 20];
	let prefix = &prefix.as_bytes()[..prefix.len().min(peer_id.len())];
	peer_id[..prefix.len()].copy_from_slice(prefix);
	for b in peer_id[prefix.len()..].iter_mut() {
		*b = rng.sample(Alphanumeric);
	}
	peer_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_peer_id_keeps_prefix() {
        let id = generate_peer_id("-RM0001-");
        assert_eq!(&id[..8], b"-RM0001-");
        assert!(id[8..].iter().all(u8::is_ascii_alphanumeric));
    }

    #[test]
    fn test_generate_peer_id_truncates_long_prefix() {
        let id = generate_peer_id("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(&id, b"abcdefghijklmnopqrst");
    }
}
