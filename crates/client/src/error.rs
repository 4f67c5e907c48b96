// Error taxonomy for the session client.
//
// Everything here is recoverable at this layer: transport failures
// degrade to a disconnected status with one scheduled retry, protocol
// failures drop the offending frame, and local command rejections are
// surfaced synchronously to the caller.

use thiserror::Error;

/// Socket-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,

    #[error("invalid server url `{0}`")]
    InvalidUrl(String),

    #[error("websocket failure: {0}")]
    WebSocket(String),
}

/// Errors surfaced by the session client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Socket-level failure; recorded and surfaced, reconnection is
    /// decided by close handling, never here.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed or unparseable frame. Logged and dropped by the
    /// router; only returned where a caller asked for the decode.
    #[error("protocol violation: {reason}")]
    Protocol { reason: String },

    /// An outbound action refused locally, before any network send.
    #[error("command rejected: {reason}")]
    CommandRejected { reason: String },

    /// Explicit `error` frame from the session authority. Non-fatal.
    #[error("authority error{}: {message}", code_suffix(.code))]
    Authority { code: Option<String>, message: String },
}

impl ClientError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ClientError::CommandRejected { reason: reason.into() }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" [{code}]"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_formats_reason() {
        let err = ClientError::rejected("no active session");
        assert_eq!(err.to_string(), "command rejected: no active session");
    }

    #[test]
    fn authority_error_includes_code_when_present() {
        let err = ClientError::Authority {
            code: Some("SESSION_FULL".into()),
            message: "session is at capacity".into(),
        };
        assert_eq!(err.to_string(), "authority error [SESSION_FULL]: session is at capacity");

        let err = ClientError::Authority { code: None, message: "nope".into() };
        assert_eq!(err.to_string(), "authority error: nope");
    }

    #[test]
    fn transport_error_is_transparent() {
        let err: ClientError = TransportError::NotConnected.into();
        assert_eq!(err.to_string(), "not connected");
    }
}
