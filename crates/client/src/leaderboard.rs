// Leaderboard and answer-distribution aggregation.
//
// Both snapshots are pushed whole by the authority and replaced
// wholesale here. The protocol has no partial updates, and the client
// must not synthesize them: merging or re-sorting locally is how
// standings drift from the authority's record.

use quizlink_common::types::{AnswerDistribution, LeaderboardEntry};

/// Latest authority-ranked standings and per-question answer tallies.
#[derive(Debug, Default, Clone)]
pub struct ScoreBoard {
    snapshot: Option<Vec<LeaderboardEntry>>,
    distribution: Option<AnswerDistribution>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the standings. Entry order and rank fields are stored
    /// verbatim; ties were already broken by the authority.
    pub fn replace_snapshot(&mut self, entries: Vec<LeaderboardEntry>) {
        self.snapshot = Some(entries);
    }

    /// Replace the per-option tallies for the current question.
    pub fn replace_distribution(&mut self, distribution: AnswerDistribution) {
        self.distribution = Some(distribution);
    }

    /// Drop the tallies when a new question supersedes them.
    pub fn clear_distribution(&mut self) {
        self.distribution = None;
    }

    pub fn snapshot(&self) -> Option<&[LeaderboardEntry]> {
        self.snapshot.as_deref()
    }

    pub fn distribution(&self) -> Option<&AnswerDistribution> {
        self.distribution.as_ref()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.distribution = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, score: i64, rank: u32) -> LeaderboardEntry {
        serde_json::from_value(serde_json::json!({
            "participantId": id,
            "displayName": id,
            "score": score,
            "rank": rank
        }))
        .unwrap()
    }

    #[test]
    fn stores_authority_order_verbatim() {
        let mut board = ScoreBoard::new();
        // Authority sends rank order, not join order; keep it as-is.
        board.replace_snapshot(vec![entry("p2", 1000, 1), entry("p1", 900, 2), entry("p3", 700, 3)]);

        let scores: Vec<i64> = board.snapshot().unwrap().iter().map(|e| e.score).collect();
        let ranks: Vec<u32> = board.snapshot().unwrap().iter().map(|e| e.rank).collect();
        assert_eq!(scores, vec![1000, 900, 700]);
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_is_replaced_not_merged() {
        let mut board = ScoreBoard::new();
        board.replace_snapshot(vec![entry("p1", 100, 1), entry("p2", 50, 2)]);
        board.replace_snapshot(vec![entry("p2", 250, 1)]);
        assert_eq!(board.snapshot().unwrap().len(), 1);
        assert_eq!(board.snapshot().unwrap()[0].participant_id, "p2");
    }

    #[test]
    fn clear_drops_both() {
        let mut board = ScoreBoard::new();
        board.replace_snapshot(vec![entry("p1", 100, 1)]);
        board.replace_distribution(AnswerDistribution::new());
        board.clear();
        assert!(board.snapshot().is_none());
        assert!(board.distribution().is_none());
    }
}
