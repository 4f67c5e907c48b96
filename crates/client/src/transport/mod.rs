// Transport abstraction for the session connection.
//
// The client is written against this trait for testability; the
// production WebSocket implementation lives in `ws`. Only the
// connection manager opens or closes a transport — every other
// component observes connection state through the event loop.

pub mod ws;

use async_trait::async_trait;

use crate::error::TransportError;

/// Normal closure; the client is done with the connection.
pub const CLOSE_NORMAL: u16 = 1000;
/// Endpoint going away (page navigation / shutdown).
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Whether a close code marks a closure the client should not retry.
pub fn is_intentional_close(code: Option<u16>) -> bool {
    matches!(code, Some(CLOSE_NORMAL) | Some(CLOSE_GOING_AWAY))
}

/// One inbound transport item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A complete UTF-8 text frame.
    Frame(String),
    /// The peer closed the connection. `None` when the socket died
    /// without a close frame.
    Closed { code: Option<u16> },
}

/// Duplex text-frame transport to the session authority.
#[async_trait]
pub trait SessionTransport: Send {
    /// Establish the connection. Must be a no-op error (not a panic)
    /// if the endpoint is unreachable.
    async fn connect(&mut self, url: &str) -> Result<(), TransportError>;

    /// Send one text frame. Fails with `NotConnected` when closed.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Receive the next inbound item. Resolves to `Closed` exactly
    /// once per connection; errors represent socket-level failures.
    async fn recv(&mut self) -> Result<Incoming, TransportError>;

    /// Close with the given code. Idempotent.
    async fn close(&mut self, code: u16);

    fn is_open(&self) -> bool;
}
