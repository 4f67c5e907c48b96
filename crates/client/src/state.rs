// Canonical client-side session state.
//
// Status transitions are applied strictly from inbound authority
// messages — never speculatively — so the client cannot diverge from
// the authority's record. The one deliberate exception lives in
// `record_pending_answer`: a successful `submit_answer` send moves
// `AnswerState` to `Pending` before the authority's verdict arrives.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use quizlink_common::protocol::ws::{Envelope, ServerMessage};
use quizlink_common::types::{ChatEntry, Participant, Question, Session, SessionStatus};

use crate::events::SessionEvent;
use crate::leaderboard::ScoreBoard;
use crate::roster::Roster;

/// Local answer lifecycle for the active question.
///
/// `Pending` is the optimistic leg: set on send, reconciled to
/// `Confirmed` by the authority's `answer_submitted`, reset by the
/// next `question_started`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerState {
    NotAnswered,
    Pending { answer: Value, response_time_ms: u64 },
    Confirmed { correct: Option<bool>, points: Option<i64>, response_time_ms: u64 },
}

impl AnswerState {
    pub fn has_answered(&self) -> bool {
        !matches!(self, AnswerState::NotAnswered)
    }
}

/// The single in-flight question window. Superseded wholesale by the
/// next `question_started`, never merged.
#[derive(Debug, Clone)]
pub struct ActiveQuestion {
    pub question: Question,
    pub question_index: u32,
    pub total_questions: u32,
    /// Answer window in seconds.
    pub time_limit: u32,
    /// Local receipt time; response times are measured against this.
    pub started_at: Instant,
    /// The authority's broadcast timestamp, when present.
    pub started_wire: Option<DateTime<Utc>>,
}

/// Per-question sub-state travelling alongside the session status.
#[derive(Debug, Clone, Default)]
pub enum QuestionPhase {
    #[default]
    Idle,
    Active(ActiveQuestion),
    Ended {
        question_id: String,
    },
}

/// All session-scoped client state. The router is its only writer.
#[derive(Debug, Default)]
pub struct SessionState {
    session: Option<Session>,
    phase: QuestionPhase,
    answer: AnswerState,
    roster: Roster,
    board: ScoreBoard,
    chat: VecDeque<ChatEntry>,
    chat_limit: usize,
    local_participant_id: Option<String>,
    /// Display name sent with our join, used to recognize our own
    /// `participant_joined` echo.
    pending_display_name: Option<String>,
}

impl Default for AnswerState {
    fn default() -> Self {
        AnswerState::NotAnswered
    }
}

impl SessionState {
    pub fn new(chat_limit: usize) -> Self {
        Self { chat_limit, ..Default::default() }
    }

    // ── Read surface ────────────────────────────────────────────────

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> &QuestionPhase {
        &self.phase
    }

    pub fn active_question(&self) -> Option<&ActiveQuestion> {
        match &self.phase {
            QuestionPhase::Active(q) => Some(q),
            _ => None,
        }
    }

    pub fn answer(&self) -> &AnswerState {
        &self.answer
    }

    pub fn has_answered(&self) -> bool {
        self.answer.has_answered()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatEntry> {
        self.chat.iter()
    }

    pub fn local_participant_id(&self) -> Option<&str> {
        self.local_participant_id.as_deref()
    }

    // ── Local mutations (action-dispatcher side) ────────────────────

    /// Remember the display name we joined with, so the matching
    /// `participant_joined` can be recognized as ourselves.
    pub fn set_pending_identity(&mut self, display_name: &str) {
        self.pending_display_name = Some(display_name.to_owned());
    }

    /// The optimistic update: called only after a successful
    /// `submit_answer` send.
    pub fn record_pending_answer(&mut self, answer: Value, response_time_ms: u64) {
        self.answer = AnswerState::Pending { answer, response_time_ms };
    }

    /// Drop every piece of session-scoped state. The connection is
    /// not touched; it may be reused to join another session.
    pub fn reset_session_scope(&mut self) {
        self.session = None;
        self.phase = QuestionPhase::Idle;
        self.answer = AnswerState::NotAnswered;
        self.roster.clear();
        self.board.clear();
        self.chat.clear();
        self.local_participant_id = None;
        self.pending_display_name = None;
    }

    // ── Inbound dispatch ────────────────────────────────────────────

    /// Apply one authority message and report the observable changes,
    /// in application order.
    pub fn apply(&mut self, envelope: Envelope<ServerMessage>, now: Instant) -> Vec<SessionEvent> {
        let timestamp = envelope.timestamp;
        match envelope.message {
            ServerMessage::SessionCreated { session } => self.on_session_update(session),

            ServerMessage::SessionStarted { status, question_index } => {
                self.on_status_change(status, Some(question_index))
            }

            ServerMessage::SessionEnded { status: _ } => self.on_session_ended(),

            ServerMessage::ParticipantJoined { participant } => self.on_participant_joined(participant),

            ServerMessage::ParticipantLeft { participant_id } => {
                self.roster.remove(&participant_id);
                vec![SessionEvent::ParticipantLeft { participant_id }]
            }

            ServerMessage::QuestionStarted {
                question,
                question_index,
                total_questions,
                time_limit,
            } => {
                // The new window supersedes everything scoped to the
                // previous question.
                self.answer = AnswerState::NotAnswered;
                self.board.clear_distribution();
                self.phase = QuestionPhase::Active(ActiveQuestion {
                    question: question.clone(),
                    question_index,
                    total_questions,
                    time_limit,
                    started_at: now,
                    started_wire: timestamp,
                });
                if let Some(session) = &mut self.session {
                    session.current_question_index = question_index;
                }
                vec![SessionEvent::QuestionStarted {
                    question,
                    question_index,
                    total_questions,
                    time_limit,
                }]
            }

            ServerMessage::QuestionEnded { question_id, leaderboard, distribution, .. } => {
                self.phase = QuestionPhase::Ended { question_id: question_id.clone() };
                let mut events = vec![SessionEvent::QuestionEnded { question_id }];
                if let Some(entries) = leaderboard {
                    self.board.replace_snapshot(entries.clone());
                    events.push(SessionEvent::LeaderboardUpdated { leaderboard: entries });
                }
                if let Some(dist) = distribution {
                    self.board.replace_distribution(dist.clone());
                    events.push(SessionEvent::DistributionUpdated { distribution: dist });
                }
                events
            }

            ServerMessage::AnswerSubmitted {
                participant_id,
                question_id,
                correct,
                points,
                response_time,
            } => {
                if self.local_participant_id.as_deref() == Some(participant_id.as_str()) {
                    self.confirm_local_answer(correct, points, response_time);
                }
                vec![SessionEvent::AnswerScored { participant_id, question_id, correct, points }]
            }

            ServerMessage::LeaderboardUpdated { leaderboard } => {
                self.board.replace_snapshot(leaderboard.clone());
                vec![SessionEvent::LeaderboardUpdated { leaderboard }]
            }

            ServerMessage::AnswerDistribution { distribution } => {
                self.board.replace_distribution(distribution.clone());
                vec![SessionEvent::DistributionUpdated { distribution }]
            }

            ServerMessage::ChatMessage { participant_id, display_name, message, is_host } => {
                let entry = ChatEntry { participant_id, display_name, message, is_host, timestamp };
                self.chat.push_back(entry.clone());
                while self.chat.len() > self.chat_limit.max(1) {
                    self.chat.pop_front();
                }
                vec![SessionEvent::Chat { entry }]
            }

            ServerMessage::Error { code, message } => {
                warn!(?code, %message, "authority reported an error");
                vec![SessionEvent::AuthorityError { code, message }]
            }
        }
    }

    fn on_session_update(&mut self, session: Session) -> Vec<SessionEvent> {
        if let Some(current) = &self.session {
            if current.id == session.id
                && current.status != session.status
                && !current.status.can_transition_to(session.status)
            {
                warn!(
                    from = ?current.status,
                    to = ?session.status,
                    "ignoring invalid session status transition"
                );
                return Vec::new();
            }
        }
        debug!(session_id = %session.id, status = ?session.status, "session record updated");
        self.session = Some(session.clone());
        vec![SessionEvent::SessionUpdated { session }]
    }

    fn on_status_change(
        &mut self,
        status: SessionStatus,
        question_index: Option<u32>,
    ) -> Vec<SessionEvent> {
        if let Some(session) = &mut self.session {
            if session.status != status && !session.status.can_transition_to(status) {
                warn!(from = ?session.status, to = ?status, "ignoring invalid status transition");
                return Vec::new();
            }
            session.status = status;
            if let Some(idx) = question_index {
                session.current_question_index = idx;
            }
        }
        vec![SessionEvent::SessionStarted { question_index: question_index.unwrap_or(0) }]
    }

    fn on_session_ended(&mut self) -> Vec<SessionEvent> {
        if let Some(session) = &mut self.session {
            if session.status.is_terminal() {
                debug!("duplicate session_ended ignored");
                return Vec::new();
            }
            session.status = SessionStatus::Completed;
        }
        self.phase = QuestionPhase::Idle;
        vec![SessionEvent::SessionEnded]
    }

    fn on_participant_joined(&mut self, participant: Participant) -> Vec<SessionEvent> {
        if self.local_participant_id.is_none()
            && self.pending_display_name.as_deref() == Some(participant.display_name.as_str())
        {
            self.local_participant_id = Some(participant.id.clone());
            self.pending_display_name = None;
        }
        self.roster.upsert(participant.clone());
        vec![SessionEvent::ParticipantJoined { participant }]
    }

    fn confirm_local_answer(
        &mut self,
        correct: Option<bool>,
        points: Option<i64>,
        response_time: Option<u64>,
    ) {
        let response_time_ms = response_time.unwrap_or(match &self.answer {
            AnswerState::Pending { response_time_ms, .. } => *response_time_ms,
            AnswerState::Confirmed { response_time_ms, .. } => *response_time_ms,
            AnswerState::NotAnswered => 0,
        });
        self.answer = AnswerState::Confirmed { correct, points, response_time_ms };
    }
}
