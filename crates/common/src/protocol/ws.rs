// WebSocket message types for the quizlink session protocol.
//
// Every frame is a UTF-8 JSON object with the envelope
// `{ "type": ..., "sessionId": ..., "timestamp": ..., ...payload }`.
// The `type` field discriminates the payload; `timestamp` is stamped
// by the authority on broadcast and therefore absent on outbound
// commands. Unknown payload fields are ignored by a conformant
// client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    AnswerDistribution, LeaderboardEntry, Participant, Question, Session, SessionSettings,
    SessionStatus,
};

/// Shared frame envelope. The payload enum is flattened next to the
/// routing fields, so `type` and the payload live at the top level of
/// the JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<M> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub message: M,
}

impl<M> Envelope<M> {
    /// Outbound envelope: no timestamp, the authority sets it.
    pub fn command(session_id: Option<String>, message: M) -> Self {
        Self { session_id, timestamp: None, message }
    }
}

/// Authority → client broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full session record; also used as the carrier for wholesale
    /// status/index updates (pause and resume acknowledgements).
    SessionCreated {
        session: Session,
    },

    SessionStarted {
        status: SessionStatus,
        #[serde(default)]
        question_index: u32,
    },

    SessionEnded {
        status: SessionStatus,
    },

    ParticipantJoined {
        participant: Participant,
    },

    ParticipantLeft {
        participant_id: String,
    },

    /// Opens the answer window for one question.
    QuestionStarted {
        question: Question,
        question_index: u32,
        total_questions: u32,
        /// Answer window in seconds.
        time_limit: u32,
    },

    /// Closes the answer window; may carry the post-question standings.
    QuestionEnded {
        question_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_answer: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        leaderboard: Option<Vec<LeaderboardEntry>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distribution: Option<AnswerDistribution>,
    },

    /// The authority's verdict on one submission.
    AnswerSubmitted {
        participant_id: String,
        question_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        points: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_time: Option<u64>,
    },

    /// Complete standings replacement; never a partial patch.
    LeaderboardUpdated {
        leaderboard: Vec<LeaderboardEntry>,
    },

    AnswerDistribution {
        distribution: AnswerDistribution,
    },

    ChatMessage {
        participant_id: String,
        display_name: String,
        message: String,
        #[serde(default)]
        is_host: bool,
    },

    /// Non-fatal authority-side error.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        message: String,
    },
}

/// Client → authority commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    CreateSession {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        question_ids: Vec<String>,
        settings: SessionSettings,
    },

    JoinSession {
        display_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },

    LeaveSession,
    StartSession,
    EndSession,
    PauseSession,
    ResumeSession,
    NextQuestion,
    SkipQuestion,

    SubmitAnswer {
        question_id: String,
        answer: Value,
        /// Milliseconds between `question_started` and submission,
        /// measured locally.
        response_time: u64,
    },

    KickParticipant {
        participant_id: String,
    },

    SendMessage {
        message: String,
    },

    /// Heartbeat keepalive; carries no payload and no session id.
    Ping,
}
