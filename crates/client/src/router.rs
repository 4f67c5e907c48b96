// Inbound frame routing.
//
// Parses raw frames and dispatches them into session state. A frame
// that fails to parse is logged and dropped — a hostile or buggy
// broadcast must never take the session down. Unknown message types
// are ignored for forward compatibility. Routing performs no outbound
// sends; replies are always explicit user or host actions.

use tokio::time::Instant;
use tracing::{debug, warn};

use quizlink_common::protocol::ws::{Envelope, ServerMessage};

use crate::events::SessionEvent;
use crate::state::SessionState;

/// Decode one raw frame and apply it to `state`. Returns the
/// observable changes, empty when the frame was dropped.
pub fn handle(state: &mut SessionState, raw: &str, now: Instant) -> Vec<SessionEvent> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "dropping unparseable frame");
            return Vec::new();
        }
    };

    let message_type = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<missing>")
        .to_owned();

    match serde_json::from_value::<Envelope<ServerMessage>>(value) {
        Ok(envelope) => {
            debug!(%message_type, "dispatching frame");
            state.apply(envelope, now)
        }
        Err(error) => {
            // Unknown `type` values land here too; that is the
            // forward-compatibility path, not a failure.
            warn!(%message_type, %error, "ignoring unrecognized frame");
            Vec::new()
        }
    }
}
