#[cfg(test)]
#[path = "streaming_reducer_test.rs"]
mod tests;

use super::TranscriptStore;
use crate::domain::models::ChatError;
use crate::domain::models::PendingFailure;
use crate::domain::models::Role;
use crate::domain::models::Turn;

/// Folds the fragments of the single outstanding request into the transcript
/// and holds the retry slot.
///
/// The store always holds the full response so far. Fragments accumulate in
/// `response`, the first one appends a model turn and every later one patches
/// that turn with the accumulated text.
#[derive(Default)]
pub struct StreamingReducer {
    busy: bool,
    pending_failure: Option<PendingFailure>,
    last_input: Option<String>,
    response: String,
    model_turn_started: bool,
}

impl StreamingReducer {
    pub fn is_busy(&self) -> bool {
        return self.busy;
    }

    pub fn pending_failure(&self) -> Option<&PendingFailure> {
        return self.pending_failure.as_ref();
    }

    pub fn last_input(&self) -> Option<&str> {
        return self.last_input.as_deref();
    }

    /// Starts a request for `input`. The user turn is appended up front so it
    /// shows regardless of how the request ends. Retries pass
    /// `append_user = false` since their user turn is already there, and
    /// overwrite the partial model turn a failed attempt left behind.
    pub fn begin(
        &mut self,
        store: &mut TranscriptStore,
        input: &str,
        append_user: bool,
    ) -> Result<(), ChatError> {
        if self.busy {
            return Err(ChatError::Busy);
        }

        if append_user {
            store.append(Turn::user(input));
        }

        self.busy = true;
        self.pending_failure = None;
        self.last_input = Some(input.to_string());
        self.response.clear();
        self.model_turn_started =
            !append_user && store.last().map(|turn| return turn.role) == Some(Role::Model);

        return Ok(());
    }

    pub fn apply_fragment(
        &mut self,
        store: &mut TranscriptStore,
        fragment: &str,
    ) -> Result<(), ChatError> {
        if !self.busy {
            return Err(ChatError::InvalidState);
        }

        self.response.push_str(fragment);

        if !self.model_turn_started {
            self.model_turn_started = true;
            store.append(Turn::model(&self.response));
            return Ok(());
        }

        return store.patch_last(&self.response);
    }

    /// The stream ended cleanly. Disarms the retry slot.
    pub fn complete(&mut self) {
        self.busy = false;
        self.last_input = None;
    }

    /// The stream failed. Any partial model turn stays until a retry replaces
    /// it, and the input stays remembered for that retry.
    pub fn fail(&mut self, failure: PendingFailure) {
        self.busy = false;
        self.pending_failure = Some(failure);
    }

    /// Records a failure that happened outside of a request, such as a
    /// session that could not be created.
    pub fn record_failure(&mut self, failure: PendingFailure) {
        self.pending_failure = Some(failure);
    }

    /// Input to resend, if a retry is currently allowed.
    pub fn retry_input(&self) -> Option<String> {
        if self.busy {
            return None;
        }

        match &self.pending_failure {
            Some(failure) if failure.retryable => return self.last_input.clone(),
            _ => return None,
        }
    }
}
