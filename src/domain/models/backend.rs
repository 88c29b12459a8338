#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use uuid::Uuid;

use super::history_for_remote;
use super::Profile;
use super::Turn;

/// Incremental text fragments for a single request. Finite, and cannot be
/// restarted once consumed.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSeed {
    pub model: String,
    pub system_instruction: String,
    pub thinking_budget: i32,
    pub history: Vec<Turn>,
}

impl SessionSeed {
    pub fn new(profile: &Profile, transcript: &[Turn]) -> SessionSeed {
        return SessionSeed {
            model: profile.model.to_string(),
            system_instruction: profile.system_instruction.to_string(),
            thinking_budget: profile.thinking_budget,
            history: history_for_remote(transcript),
        };
    }
}

/// Handle to a remote conversation. Clones share the same history, which
/// only grows once a response has streamed in completely.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    pub id: String,
    pub model: String,
    pub system_instruction: String,
    pub thinking_budget: i32,
    history: Arc<Mutex<Vec<Turn>>>,
}

impl SessionHandle {
    pub fn new(seed: SessionSeed) -> SessionHandle {
        return SessionHandle {
            id: SessionHandle::create_id(),
            model: seed.model,
            system_instruction: seed.system_instruction,
            thinking_budget: seed.thinking_budget,
            history: Arc::new(Mutex::new(seed.history)),
        };
    }

    fn create_id() -> String {
        return Uuid::new_v4()
            .to_string()
            .split('-')
            .take(2)
            .collect::<Vec<&str>>()
            .join("-");
    }

    pub fn history(&self) -> Vec<Turn> {
        let history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| return poisoned.into_inner());
        return history.clone();
    }

    /// Records a completed exchange in the remote history.
    pub fn commit(&self, user_input: &str, reply: &str) {
        let mut history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| return poisoned.into_inner());
        history.push(Turn::user(user_input));
        history.push(Turn::model(reply));
    }
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Creates a remote conversation seeded with prior history. Fails when the
    /// backend is missing credentials or configuration.
    async fn create_session(&self, seed: SessionSeed) -> Result<SessionHandle>;

    /// Sends `text` on the conversation and returns the response as a stream
    /// of fragments. Errors may be returned while opening the request, or as
    /// an item of the stream at any later point.
    ///
    /// Upon streaming the full response without error, the backend commits the
    /// exchange to the handle's history.
    async fn send_message(&self, handle: &SessionHandle, text: &str) -> Result<FragmentStream>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
