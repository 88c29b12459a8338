use super::PendingFailure;
use super::ProfileName;
use super::Turn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Error,
}

/// Read only snapshot of the chat published to the UI after every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatView {
    pub profile: ProfileName,
    pub model: String,
    pub state: SessionState,
    pub transcript: Vec<Turn>,
    pub busy: bool,
    pub pending_failure: Option<PendingFailure>,
}

impl ChatView {
    pub fn can_send(&self) -> bool {
        return self.state == SessionState::Ready && !self.busy;
    }

    pub fn can_retry(&self) -> bool {
        if self.busy {
            return false;
        }

        return self
            .pending_failure
            .as_ref()
            .map(|failure| return failure.retryable)
            .unwrap_or(false);
    }
}
