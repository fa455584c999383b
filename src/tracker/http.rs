use std::time::Duration;

use log::debug;
use reqwest::Client;

use crate::tracker::{decode_response, AnnounceRequest, TrackerError, TrackerResponse};

/// Announces over HTTP(S) and decodes the bencoded reply.
#[derive(Debug, Clone)]
pub struct HttpTracker {
    client: Client,
}

impl HttpTracker {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TrackerError::ConnectionFailed(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Sends one announce to `announce` and decodes the response body.
    ///
    /// A non-2xx status is reported as `TrackerFailure`.
    pub async fn announce(
        &self,
        announce: &str,
        request: &AnnounceRequest,
    ) -> Result<TrackerResponse, TrackerError> {
        let url = request.url(announce)?;
        debug!("announcing to {} (event {:?})", announce, request.event);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::TrackerFailure(format!("HTTP {}", status.as_u16())));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        debug!("received {} byte tracker response from {}", body.len(), announce);
        decode_response(&body)
    }
}

fn transport_error(err: reqwest::Error) -> TrackerError {
    if err.is_timeout() {
        TrackerError::Timeout
    } else {
        TrackerError::ConnectionFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;
    use crate::hash::Sha1Hash;
    use crate::tracker::PeerInfo;

    fn tracker(timeout: Duration) -> HttpTracker {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        HttpTracker::with_client(client)
    }

    fn request() -> AnnounceRequest {
        AnnounceRequest::new(Sha1Hash([1; 20]), *b"-RM0001-000000000000", 6881, 100)
    }

    /// Serves a single HTTP response and hands back the request head.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> (SocketAddr, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(&body);
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (addr, rx)
    }

    #[tokio::test]
    async fn test_announce_success() {
        let mut body = b"d8:intervali900e5:peers6:".to_vec();
        body.extend_from_slice(&[127, 0, 0, 1, 0x1A, 0xE1]);
        body.push(b'e');
        let (addr, head) = serve_once("200 OK", body).await;

        let response = tracker(Duration::from_secs(5))
            .announce(&format!("http://{}/announce", addr), &request())
            .await
            .unwrap();

        assert_eq!(response.interval(), Duration::from_secs(900));
        assert_eq!(response.peers(), vec![PeerInfo::new(Ipv4Addr::LOCALHOST, 6881)]);

        let head = head.await.unwrap();
        assert!(head.starts_with("GET /announce?info_hash=%01%01"));
        assert!(head.contains("&peer_id=-RM0001-000000000000&port=6881"));
        assert!(head.contains("&left=100&compact=1"));
    }

    #[tokio::test]
    async fn test_announce_http_error_status() {
        let (addr, _head) = serve_once("500 Internal Server Error", b"oops".to_vec()).await;

        let err = tracker(Duration::from_secs(5))
            .announce(&format!("http://{}/announce", addr), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::TrackerFailure(ref r) if r == "HTTP 500"));
    }

    #[tokio::test]
    async fn test_announce_failure_reason() {
        let (addr, _head) =
            serve_once("200 OK", b"d14:failure reason7:unknowne".to_vec()).await;

        let err = tracker(Duration::from_secs(5))
            .announce(&format!("http://{}/announce", addr), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::TrackerFailure(ref r) if r == "unknown"));
    }

    #[tokio::test]
    async fn test_announce_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let err = tracker(Duration::from_millis(200))
            .announce(&format!("http://{}/announce", addr), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Timeout));
    }

    #[tokio::test]
    async fn test_announce_connection_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = tracker(Duration::from_secs(5))
            .announce(&format!("http://{}/announce", addr), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::ConnectionFailed(_)));
    }
}
