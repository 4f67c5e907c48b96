// Client-side participant roster.
//
// The roster is authoritative for "who is here now" on the client;
// the session record's participant count is informational only.

use quizlink_common::types::Participant;

/// Known participants in join order.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by participant id. A duplicate join for the
    /// same id updates the record in place; it never creates a second
    /// entry. Returns true when the participant was new.
    pub fn upsert(&mut self, participant: Participant) -> bool {
        match self.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => {
                *existing = participant;
                false
            }
            None => {
                self.participants.push(participant);
                true
            }
        }
    }

    /// Remove by id (leave or kick).
    pub fn remove(&mut self, participant_id: &str) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| p.id == participant_id)?;
        Some(self.participants.remove(idx))
    }

    pub fn get(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}
