#[cfg(test)]
#[path = "transcript_store_test.rs"]
mod tests;

use crate::domain::models::ChatError;
use crate::domain::models::ProfileName;
use crate::domain::models::PROFILE_KEY;
use crate::domain::models::Role;
use crate::domain::models::StorageBox;
use crate::domain::models::Turn;

/// Ordered transcript of the active profile. Turns are only ever appended,
/// and only the last turn may be patched while a model response streams in.
pub struct TranscriptStore {
    storage: StorageBox,
    turns: Vec<Turn>,
}

impl TranscriptStore {
    pub fn new(storage: StorageBox) -> TranscriptStore {
        return TranscriptStore {
            storage,
            turns: vec![],
        };
    }

    pub fn turns(&self) -> &[Turn] {
        return &self.turns;
    }

    pub fn last(&self) -> Option<&Turn> {
        return self.turns.last();
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Replaces the content of the last turn. The last turn must be a model
    /// turn.
    pub fn patch_last(&mut self, content: &str) -> Result<(), ChatError> {
        match self.turns.last_mut() {
            Some(last) if last.role == Role::Model => {
                last.content = content.to_string();
                return Ok(());
            }
            _ => return Err(ChatError::InvalidState),
        }
    }

    pub fn replace(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Reads the persisted transcript for a profile. Missing or corrupt
    /// records load as an empty transcript.
    pub fn load(&self, profile: ProfileName) -> Vec<Turn> {
        let key = profile.transcript_key();
        let payload = match self.storage.get(&key) {
            Some(payload) => payload,
            None => return vec![],
        };

        match serde_json::from_str::<Vec<Turn>>(&payload) {
            Ok(turns) => return turns,
            Err(err) => {
                tracing::warn!(error = ?err, key = key, "Discarding corrupt transcript");
                return vec![];
            }
        }
    }

    /// Persists a transcript for a profile. Empty transcripts are never
    /// written, so a transient empty state can't clobber saved history.
    pub fn save(&self, profile: ProfileName, turns: &[Turn]) {
        if turns.is_empty() {
            return;
        }

        match serde_json::to_string(turns) {
            Ok(payload) => self.storage.set(&profile.transcript_key(), &payload),
            Err(err) => {
                tracing::warn!(error = ?err, profile = %profile, "Failed to serialize transcript");
            }
        }
    }

    /// Persists the in memory transcript for a profile.
    pub fn save_current(&self, profile: ProfileName) {
        self.save(profile, &self.turns);
    }

    /// Deletes the persisted transcript for a profile.
    pub fn forget(&self, profile: ProfileName) {
        self.storage.remove(&profile.transcript_key());
    }

    /// Reads the last selected profile.
    pub fn load_profile(&self) -> Option<ProfileName> {
        let payload = self.storage.get(PROFILE_KEY)?;
        let profile = ProfileName::parse(&payload);
        if profile.is_none() {
            tracing::warn!(value = payload, "Ignoring unknown persisted profile");
        }

        return profile;
    }

    pub fn save_profile(&self, profile: ProfileName) {
        self.storage.set(PROFILE_KEY, &profile.to_string());
    }
}
