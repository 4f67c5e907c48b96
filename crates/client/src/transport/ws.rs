// Production WebSocket transport (tokio-tungstenite).

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::{Host, Url};

use super::{Incoming, SessionTransport};
use crate::error::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport to the session authority.
#[derive(Default)]
pub struct WsTransport {
    stream: Option<WsStream>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionTransport for WsTransport {
    async fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        validate_ws_url(url)?;
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Incoming, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        loop {
            match stream.next().await {
                None => {
                    self.stream = None;
                    return Ok(Incoming::Closed { code: None });
                }
                Some(Ok(Message::Text(text))) => return Ok(Incoming::Frame(text.to_string())),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    debug!(?code, "peer closed connection");
                    self.stream = None;
                    return Ok(Incoming::Closed { code });
                }
                // Ping/pong is handled by the protocol layer; binary
                // frames are not part of this protocol.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(TransportError::WebSocket(e.to_string()));
                }
            }
        }
    }

    async fn close(&mut self, code: u16) {
        if let Some(mut stream) = self.stream.take() {
            let frame = CloseFrame { code: CloseCode::from(code), reason: "".into() };
            let _ = stream.close(Some(frame)).await;
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// Require `wss` everywhere except loopback, mirroring how a hosted
/// page selects its scheme.
pub fn validate_ws_url(value: &str) -> Result<(), TransportError> {
    let parsed = Url::parse(value).map_err(|_| TransportError::InvalidUrl(value.to_string()))?;
    match parsed.scheme() {
        "wss" => Ok(()),
        "ws" if is_loopback_host(parsed.host()) => Ok(()),
        _ => Err(TransportError::InvalidUrl(value.to_string())),
    }
}

// `host_str()` keeps the brackets around IPv6 literals, so match the
// parsed host instead of re-parsing the string.
fn is_loopback_host(host: Option<Host<&str>>) -> bool {
    match host {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wss_is_accepted() {
        assert!(validate_ws_url("wss://quiz.example.com/ws").is_ok());
    }

    #[test]
    fn plain_ws_is_loopback_only() {
        assert!(validate_ws_url("ws://localhost:3000/ws").is_ok());
        assert!(validate_ws_url("ws://127.0.0.1:3000/ws").is_ok());
        assert!(validate_ws_url("ws://[::1]:3000/ws").is_ok());
        assert!(validate_ws_url("ws://quiz.example.com/ws").is_err());
        assert!(validate_ws_url("ws://[2001:db8::1]:3000/ws").is_err());
        assert!(validate_ws_url("ws://192.168.1.20:3000/ws").is_err());
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(validate_ws_url("https://quiz.example.com/ws").is_err());
        assert!(validate_ws_url("not a url").is_err());
    }

    #[tokio::test]
    async fn send_without_connect_is_not_connected() {
        let mut t = WsTransport::new();
        assert!(!t.is_open());
        assert_eq!(t.send("{}".into()).await, Err(TransportError::NotConnected));
    }
}
