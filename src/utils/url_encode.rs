/// Percent-encodes arbitrary bytes using a minimal set of "unreserved" characters.
/// In many BitTorrent implementations, the `info_hash` and `peer_id` are
/// treated as raw bytes that must be percent-encoded (i.e., not assumed to be UTF-8).
///
/// This will produce uppercase hex (e.g. "%3A" not "%3a").
pub fn url_encode_bytes(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 3);
    for &b in bytes {
        if is_unreserved(b) {
            // "Safe" character: add as-is
            encoded.push(b as char);
        } else {
            encoded.push('%');
            encoded.push_str(&hex::encode_upper([b]));
        }
    }
    encoded
}

/// Defines which characters should remain unencoded. For standard "unreserved"
/// = ALPHA / DIGIT / "-" / "." / "_" / "~"
/// https://datatracker.ietf.org/doc/html/rfc3986
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'~')
}
