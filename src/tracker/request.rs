use serde::Serialize;

use crate::hash::InfoHash;
use crate::tracker::TrackerError;
use crate::utils::{url_encode_bytes, PeerId};

/// Lifecycle event reported with an announce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A regular periodic announce; no `event` parameter is sent.
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl TrackerEvent {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TrackerEvent::None => None,
            TrackerEvent::Started => Some("started"),
            TrackerEvent::Stopped => Some("stopped"),
            TrackerEvent::Completed => Some("completed"),
        }
    }
}

/// Client state sent to a tracker in an HTTP announce.
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    pub info_hash: InfoHash,
    pub peer_id: PeerId,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: TrackerEvent,
    pub numwant: Option<u32>,
    /// Echo of `tracker id` from a previous response.
    pub tracker_id: Option<Vec<u8>>,
}

#[derive(Debug, Serialize)]
struct QueryParams {
    port: u16,
    uploaded: u64,
    downloaded: u64,
    left: u64,
    compact: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    numwant: Option<u32>,
}

impl AnnounceRequest {
    pub fn new(info_hash: InfoHash, peer_id: PeerId, port: u16, left: u64) -> Self {
        Self {
            info_hash,
            peer_id,
            port,
            uploaded: 0,
            downloaded: 0,
            left,
            event: TrackerEvent::None,
            numwant: None,
            tracker_id: None,
        }
    }

    /// Builds the GET URL for `announce`, keeping any query it already has.
    ///
    /// `info_hash`, `peer_id` and `trackerid` are raw bytes and get
    /// percent-encoded byte by byte.
    pub fn url(&self, announce: &str) -> Result<String, TrackerError> {
        let query = serde_urlencoded::to_string(QueryParams {
            port: self.port,
            uploaded: self.uploaded,
            downloaded: self.downloaded,
            left: self.left,
            compact: 1,
            event: self.event.as_str(),
            numwant: self.numwant,
        })
        .map_err(|e| TrackerError::ConnectionFailed(format!("cannot encode announce query: {}", e)))?;

        let separator = match announce.find('?') {
            None => "?",
            Some(_) if announce.ends_with('?') || announce.ends_with('&') => "",
            Some(_) => "&",
        };

        let mut url = format!(
            "{announce}{separator}info_hash={info_hash}&peer_id={peer_id}&{query}",
            announce = announce,
            separator = separator,
            info_hash = url_encode_bytes(self.info_hash.as_bytes()),
            peer_id = url_encode_bytes(&self.peer_id),
            query = query,
        );
        if let Some(tracker_id) = &self.tracker_id {
            url.push_str("&trackerid=");
            url.push_str(&url_encode_bytes(tracker_id));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha1Hash;

    fn request() -> AnnounceRequest {
        let mut info_hash = [0u8; 20];
        info_hash[0] = 0xAB;
        info_hash[1] = b'z';
        AnnounceRequest::new(Sha1Hash(info_hash), *b"-RM0001-abcdefghijkl", 6881, 1024)
    }

    #[test]
    fn test_url_contains_all_parameters() {
        let url = request().url("http://tracker.example.com/announce").unwrap();
        assert_eq!(
            url,
            "http://tracker.example.com/announce?\
             info_hash=%ABz%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00\
             &peer_id=-RM0001-abcdefghijkl\
             &port=6881&uploaded=0&downloaded=0&left=1024&compact=1"
        );
    }

    #[test]
    fn test_url_with_event_numwant_and_tracker_id() {
        let mut req = request();
        req.event = TrackerEvent::Started;
        req.numwant = Some(50);
        req.tracker_id = Some(b"id 1".to_vec());
        let url = req.url("http://t.example/announce").unwrap();
        assert!(url.ends_with("&compact=1&event=started&numwant=50&trackerid=id%201"));
    }

    #[test]
    fn test_url_keeps_existing_query() {
        let url = request().url("http://t.example/announce?passkey=abc").unwrap();
        assert!(url.starts_with("http://t.example/announce?passkey=abc&info_hash="));

        let url = request().url("http://t.example/announce?").unwrap();
        assert!(url.starts_with("http://t.example/announce?info_hash="));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(TrackerEvent::None.as_str(), None);
        assert_eq!(TrackerEvent::Started.as_str(), Some("started"));
        assert_eq!(TrackerEvent::Stopped.as_str(), Some("stopped"));
        assert_eq!(TrackerEvent::Completed.as_str(), Some("completed"));
    }
}
