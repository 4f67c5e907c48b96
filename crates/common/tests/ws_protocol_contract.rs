// Contract tests pinning the session wire protocol.
//
// These fixtures mirror frames the session authority actually
// broadcasts. If one of these tests breaks, the wire contract broke.

use quizlink_common::protocol::ws::{ClientCommand, Envelope, ServerMessage};
use quizlink_common::types::SessionStatus;

fn decode(raw: &str) -> Envelope<ServerMessage> {
    serde_json::from_str(raw).expect("fixture should decode")
}

#[test]
fn session_created_fixture() {
    let env = decode(
        r#"{
            "type": "session_created",
            "sessionId": "sess-42",
            "timestamp": "2026-03-01T10:00:00Z",
            "session": {
                "id": "sess-42",
                "hostId": "host-1",
                "title": "Friday trivia",
                "status": "waiting",
                "questionIds": ["q1", "q2", "q3"],
                "settings": {"timeLimit": 20, "basePoints": 100},
                "participantCount": 0
            }
        }"#,
    );
    match env.message {
        ServerMessage::SessionCreated { session } => {
            assert_eq!(session.id, "sess-42");
            assert_eq!(session.status, SessionStatus::Waiting);
            assert_eq!(session.question_ids.len(), 3);
            assert_eq!(session.settings.time_limit, 20);
        }
        other => panic!("expected session_created, got {other:?}"),
    }
}

#[test]
fn leaderboard_updated_preserves_authority_order() {
    let env = decode(
        r#"{
            "type": "leaderboard_updated",
            "sessionId": "sess-42",
            "timestamp": "2026-03-01T10:05:00Z",
            "leaderboard": [
                {"participantId": "p2", "displayName": "Bea", "score": 1000, "rank": 1, "rankDelta": 1},
                {"participantId": "p1", "displayName": "Ada", "score": 900, "rank": 2, "rankDelta": -1},
                {"participantId": "p3", "displayName": "Cid", "score": 700, "rank": 3, "rankDelta": 0}
            ]
        }"#,
    );
    match env.message {
        ServerMessage::LeaderboardUpdated { leaderboard } => {
            let scores: Vec<i64> = leaderboard.iter().map(|e| e.score).collect();
            let ranks: Vec<u32> = leaderboard.iter().map(|e| e.rank).collect();
            assert_eq!(scores, vec![1000, 900, 700]);
            assert_eq!(ranks, vec![1, 2, 3]);
            assert_eq!(leaderboard[1].rank_delta, -1);
        }
        other => panic!("expected leaderboard_updated, got {other:?}"),
    }
}

#[test]
fn answer_distribution_fixture() {
    let env = decode(
        r#"{
            "type": "answer_distribution",
            "sessionId": "sess-42",
            "timestamp": "2026-03-01T10:05:01Z",
            "distribution": {
                "a": {"count": 3, "percentage": 25.0, "isCorrect": false},
                "b": {"count": 9, "percentage": 75.0, "isCorrect": true}
            }
        }"#,
    );
    match env.message {
        ServerMessage::AnswerDistribution { distribution } => {
            assert_eq!(distribution["b"].count, 9);
            assert!(distribution["b"].is_correct);
            assert!(!distribution["a"].is_correct);
        }
        other => panic!("expected answer_distribution, got {other:?}"),
    }
}

#[test]
fn error_frame_fixture() {
    let env = decode(
        r#"{
            "type": "error",
            "sessionId": "sess-42",
            "timestamp": "2026-03-01T10:06:00Z",
            "code": "SESSION_FULL",
            "message": "session is at capacity"
        }"#,
    );
    match env.message {
        ServerMessage::Error { code, message } => {
            assert_eq!(code.as_deref(), Some("SESSION_FULL"));
            assert_eq!(message, "session is at capacity");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn join_session_command_round_trips() {
    let env = Envelope::command(
        Some("sess-42".into()),
        ClientCommand::JoinSession { display_name: "Ada".into(), user_id: None },
    );
    let raw = serde_json::to_string(&env).unwrap();
    let back: Envelope<ClientCommand> = serde_json::from_str(&raw).unwrap();
    assert_eq!(env, back);
    // `userId` must be absent when anonymous, not null.
    assert!(!raw.contains("userId"));
    assert!(!raw.contains("timestamp"));
}

#[test]
fn bare_command_types_serialize_without_payload() {
    for (cmd, expected) in [
        (ClientCommand::LeaveSession, "leave_session"),
        (ClientCommand::StartSession, "start_session"),
        (ClientCommand::EndSession, "end_session"),
        (ClientCommand::PauseSession, "pause_session"),
        (ClientCommand::ResumeSession, "resume_session"),
        (ClientCommand::NextQuestion, "next_question"),
        (ClientCommand::SkipQuestion, "skip_question"),
    ] {
        let frame =
            serde_json::to_value(Envelope::command(Some("s1".into()), cmd)).unwrap();
        assert_eq!(frame, serde_json::json!({"type": expected, "sessionId": "s1"}));
    }
}
