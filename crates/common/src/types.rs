// Core domain types shared across all quizlink crates.
//
// Field names follow the session authority's JSON (camelCase on the
// wire). Identifiers issued by the authority are kept as opaque
// strings; the client never derives meaning from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Active,
    Paused,
    Completed,
}

impl SessionStatus {
    /// Whether the machine may move from `self` to `next`.
    ///
    /// `waiting → active ⇄ paused → completed`; `completed` is
    /// reachable from any non-terminal status and absorbs everything.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (Completed, _) => false,
            (_, Completed) => true,
            (Waiting, Active) => true,
            (Active, Paused) | (Paused, Active) => true,
            (a, b) => a == b,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

/// Host-configured session behavior. Unknown keys from the authority
/// are ignored; missing keys fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSettings {
    /// Answer window per question, in seconds.
    pub time_limit: u32,
    /// Points awarded for a correct answer before speed/streak bonuses.
    pub base_points: u32,
    pub streak_bonus: bool,
    pub show_leaderboard: bool,
    pub allow_late_join: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            time_limit: 30,
            base_points: 100,
            streak_bonus: true,
            show_leaderboard: true,
            allow_late_join: true,
        }
    }
}

/// A quiz session as described by the authority.
///
/// Mutated only by inbound updates; `participant_count` is
/// informational — the client-side roster is authoritative for who is
/// present right now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub host_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub question_ids: Vec<String>,
    pub status: SessionStatus,
    #[serde(default)]
    pub current_question_index: u32,
    #[serde(default)]
    pub settings: SessionSettings,
    #[serde(default)]
    pub participant_count: u32,
}

/// A connected participant (player or host) in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub session_id: String,
    /// Stable identity, if the participant is not anonymous.
    #[serde(default)]
    pub user_id: Option<String>,
    pub display_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub total_answers: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    /// Mean response time in milliseconds over scored answers.
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub rank: u32,
}

fn default_true() -> bool {
    true
}

/// One selectable answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub key: String,
    pub text: String,
}

/// A question as broadcast by `question_started`. Rendering is out of
/// scope here; this subsystem only carries it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// One row of an authority-ranked leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub participant_id: String,
    pub display_name: String,
    pub score: i64,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub total_answers: u32,
    #[serde(default)]
    pub streak: u32,
    pub rank: u32,
    /// Movement versus the previous snapshot (positive = climbed).
    #[serde(default)]
    pub rank_delta: i32,
}

/// Per-option tally for the current or just-ended question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub count: u32,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub is_correct: bool,
}

/// Answer-option key → tally, replaced wholesale per question.
pub type AnswerDistribution = BTreeMap<String, DistributionBucket>;

/// One chat line. Append-only; retention is capped client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub participant_id: String,
    pub display_name: String,
    pub message: String,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SessionStatus::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&SessionStatus::Completed).unwrap(), "\"completed\"");
    }

    #[test]
    fn status_transitions() {
        use SessionStatus::*;
        assert!(Waiting.can_transition_to(Active));
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Waiting.can_transition_to(Completed));
        assert!(Paused.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Waiting));
        assert!(!Waiting.can_transition_to(Paused));
        assert!(!Paused.can_transition_to(Waiting));
    }

    #[test]
    fn settings_defaults() {
        let s = SessionSettings::default();
        assert_eq!(s.time_limit, 30);
        assert_eq!(s.base_points, 100);
        assert!(s.streak_bonus);
        assert!(s.show_leaderboard);
        assert!(s.allow_late_join);
    }

    #[test]
    fn participant_fills_missing_fields() {
        let p: Participant = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "sessionId": "s1",
            "displayName": "Ada"
        }))
        .unwrap();
        assert!(p.is_active);
        assert_eq!(p.score, 0);
        assert_eq!(p.rank, 0);
        assert!(p.user_id.is_none());
    }

    #[test]
    fn session_parses_camel_case_wire_shape() {
        let s: Session = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "hostId": "h1",
            "title": "Capitals",
            "status": "waiting",
            "questionIds": ["q1", "q2"],
            "settings": { "timeLimit": 20 },
            "participantCount": 4,
            "someFutureField": true
        }))
        .unwrap();
        assert_eq!(s.question_ids.len(), 2);
        assert_eq!(s.settings.time_limit, 20);
        // Missing settings keys fall back to defaults.
        assert_eq!(s.settings.base_points, 100);
        assert_eq!(s.participant_count, 4);
    }
}
