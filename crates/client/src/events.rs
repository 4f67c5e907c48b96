// Observable session events.
//
// The source design exposed lifecycle callbacks (onSessionUpdate,
// onParticipantJoined, ...). Here the whole surface is one
// discriminated union emitted by the event loop, so observers see
// every change in the exact order the router applied it.

use quizlink_common::types::{
    AnswerDistribution, ChatEntry, LeaderboardEntry, Participant, Question, Session,
};

/// Everything an embedding UI can observe from this subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Transport established (first connect or successful retry).
    Connected,

    /// Transport lost. `will_retry` is true when one reconnection
    /// attempt has been scheduled.
    Disconnected { reason: String, will_retry: bool },

    /// Socket-level error; connection handling follows separately.
    ConnectionError { message: String },

    /// Full session record arrived (creation or wholesale update,
    /// including pause/resume acknowledgements).
    SessionUpdated { session: Session },

    SessionStarted { question_index: u32 },

    /// Session reached its terminal state.
    SessionEnded,

    ParticipantJoined { participant: Participant },

    ParticipantLeft { participant_id: String },

    QuestionStarted {
        question: Question,
        question_index: u32,
        total_questions: u32,
        time_limit: u32,
    },

    /// Locally computed countdown changed. Derived from the absolute
    /// deadline, so ticks may skip values after a stall but never
    /// increase.
    CountdownTick { remaining_secs: u32 },

    QuestionEnded { question_id: String },

    /// The authority scored a submission. For the local participant
    /// this also confirms (or corrects) the optimistic pending answer.
    AnswerScored {
        participant_id: String,
        question_id: String,
        correct: Option<bool>,
        points: Option<i64>,
    },

    /// Standings replaced wholesale.
    LeaderboardUpdated { leaderboard: Vec<LeaderboardEntry> },

    /// Per-option answer tallies replaced wholesale.
    DistributionUpdated { distribution: AnswerDistribution },

    Chat { entry: ChatEntry },

    /// Non-fatal `error` frame from the authority.
    AuthorityError { code: Option<String>, message: String },
}
