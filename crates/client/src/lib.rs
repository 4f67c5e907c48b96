// quizlink-client: session protocol client for real-time quiz sessions.
//
// One persistent WebSocket to the session authority; inbound frames
// flow Connection → Router → State/Roster/Leaderboard → SessionEvent,
// outbound commands flow action methods → Connection → wire. Confirmed
// state only ever changes in response to inbound messages; the single
// deliberate exception is the optimistic `AnswerState::Pending` set on
// a successful `submit_answer` send.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod roster;
pub mod router;
pub mod state;
pub mod timer;
pub mod transport;

pub use client::{ConnectionStatus, SessionClient};
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use events::SessionEvent;
pub use state::{ActiveQuestion, AnswerState, QuestionPhase};
pub use transport::{ws::WsTransport, Incoming, SessionTransport};
