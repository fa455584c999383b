use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use log::{debug, warn};

use crate::bencode::{parse, BValue};
use crate::tracker::peer::{PeerInfo, COMPACT_PEER_LEN};
use crate::tracker::TrackerError;

/// A decoded announce response, read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    interval: Duration,
    min_interval: Option<Duration>,
    tracker_id: Option<Vec<u8>>,
    complete: u64,
    incomplete: u64,
    peers: Vec<PeerInfo>,
    warning_message: Option<String>,
}

/// Decodes the body of a tracker announce response.
pub fn decode_response(body: &[u8]) -> Result<TrackerResponse, TrackerError> {
    let value = parse(body)?;
    TrackerResponse::from_bvalue(&value)
}

impl TrackerResponse {
    /// Builds a response from an already parsed bencode value.
    ///
    /// A `failure reason` key short-circuits everything else. Only
    /// `interval` is required; the other known keys fall back to their
    /// defaults when missing or of the wrong type.
    pub fn from_bvalue(value: &BValue) -> Result<Self, TrackerError> {
        let dict = value.as_dict().ok_or_else(|| {
            TrackerError::InvalidResponse(format!(
                "response is a {}, not a dictionary",
                value.kind()
            ))
        })?;

        if let Some(reason) = dict.get(b"failure reason".as_slice()) {
            let reason = reason
                .as_bytes()
                .map(|r| String::from_utf8_lossy(r).into_owned())
                .unwrap_or_default();
            warn!("tracker failure: {}", reason);
            return Err(TrackerError::TrackerFailure(reason));
        }

        let interval = dict
            .get(b"interval".as_slice())
            .and_then(BValue::as_integer)
            .ok_or_else(|| {
                TrackerError::InvalidResponse("missing or invalid 'interval'".to_string())
            })?;
        let interval = u64::try_from(interval).map_err(|_| {
            TrackerError::InvalidResponse(format!("negative interval {}", interval))
        })?;

        let response = TrackerResponse {
            interval: Duration::from_secs(interval),
            min_interval: optional_count(dict, "min interval").map(Duration::from_secs),
            tracker_id: dict
                .get(b"tracker id".as_slice())
                .and_then(BValue::as_bytes)
                .map(<[u8]>::to_vec),
            complete: optional_count(dict, "complete").unwrap_or_default(),
            incomplete: optional_count(dict, "incomplete").unwrap_or_default(),
            peers: parse_peers(dict.get(b"peers".as_slice()))?,
            warning_message: dict
                .get(b"warning message".as_slice())
                .and_then(BValue::as_bytes)
                .map(|w| String::from_utf8_lossy(w).into_owned()),
        };

        if let Some(warning) = &response.warning_message {
            warn!("tracker warning: {}", warning);
        }
        debug!(
            "parsed tracker response: interval={}s, peers={}, seeders={}, leechers={}",
            response.interval.as_secs(),
            response.peers.len(),
            response.complete,
            response.incomplete
        );

        Ok(response)
    }

    /// How long to wait before the next regular announce.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval
    }

    /// Opaque token to send back as `trackerid` on later announces.
    pub fn tracker_id(&self) -> Option<&[u8]> {
        self.tracker_id.as_deref()
    }

    /// Seeders.
    pub fn complete(&self) -> u64 {
        self.complete
    }

    /// Leechers.
    pub fn incomplete(&self) -> u64 {
        self.incomplete
    }

    pub fn peers(&self) -> &[PeerInfo] {
        &self.peers
    }

    pub fn warning_message(&self) -> Option<&str> {
        self.warning_message.as_deref()
    }
}

/// Non-negative integer field, `None` when missing or mistyped.
fn optional_count(dict: &BTreeMap<Vec<u8>, BValue>, key: &str) -> Option<u64> {
    dict.get(key.as_bytes())
        .and_then(BValue::as_integer)
        .and_then(|n| u64::try_from(n).ok())
}

/// The "peers" key can be a ByteString (compact) or a List of Dicts (non-compact).
fn parse_peers(peers: Option<&BValue>) -> Result<Vec<PeerInfo>, TrackerError> {
    match peers {
        None => Ok(Vec::new()),
        Some(BValue::ByteString(bytes)) => parse_compact_peers(bytes),
        Some(BValue::List(list)) => Ok(list.iter().filter_map(parse_peer_dict).collect()),
        Some(other) => Err(TrackerError::InvalidResponse(format!(
            "'peers' is a {}, expected byte string or list",
            other.kind()
        ))),
    }
}

// Compact mode: each peer is 6 bytes: [IP(4), Port(2)]
fn parse_compact_peers(bytes: &[u8]) -> Result<Vec<PeerInfo>, TrackerError> {
    if bytes.len() % COMPACT_PEER_LEN != 0 {
        return Err(TrackerError::InvalidResponse(format!(
            "compact peers length {} is not a multiple of {}",
            bytes.len(),
            COMPACT_PEER_LEN
        )));
    }

    Ok(bytes
        .chunks_exact(COMPACT_PEER_LEN)
        .filter_map(|chunk| <&[u8; COMPACT_PEER_LEN]>::try_from(chunk).ok())
        .map(PeerInfo::from_compact)
        .collect())
}

// Non-compact: a dict with "ip" and "port"; anything unusable is skipped.
fn parse_peer_dict(item: &BValue) -> Option<PeerInfo> {
    let ip = item.get(b"ip")?.as_str()?;
    let ip = match ip.parse::<Ipv4Addr>() {
        Ok(ip) => ip,
        Err(_) => {
            debug!("skipping non-IPv4 peer address {:?}", ip);
            return None;
        }
    };
    let port = item.get(b"port")?.as_integer()?;
    match u16::try_from(port) {
        Ok(port) => Some(PeerInfo::new(ip, port)),
        Err(_) => {
            debug!("skipping peer {} with out of range port {}", ip, port);
            None
        }
    }
}
