use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Size of one record in the compact peer format.
pub const COMPACT_PEER_LEN: usize = 6;

/// An IPv4 peer address handed out by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerInfo {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PeerInfo {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Decodes one compact record: 4 address octets then the port in
    /// network byte order.
    pub fn from_compact(chunk: &[u8; COMPACT_PEER_LEN]) -> Self {
        Self {
            ip: Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]),
            port: u16::from_be_bytes([chunk[4], chunk[5]]),
        }
    }

    pub fn octets(&self) -> [u8; 4] {
        self.ip.octets()
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }
}

impl From<PeerInfo> for SocketAddrV4 {
    fn from(peer: PeerInfo) -> Self {
        peer.socket_addr()
    }
}

impl fmt::Display for PeerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_compact() {
        let peer = PeerInfo::from_compact(&[0xC0, 0xA8, 0x01, 0x01, 0x1A, 0xE1]);
        assert_eq!(peer.octets(), [192, 168, 1, 1]);
        assert_eq!(peer.port, 6881);
        assert_eq!(peer.to_string(), "192.168.1.1:6881");
        assert_eq!(
            SocketAddrV4::from(peer),
            "192.168.1.1:6881".parse::<SocketAddrV4>().unwrap()
        );
    }
}
