#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Error;
use futures::stream;
use tokio::sync::mpsc;

use super::SessionManager;
use super::StreamingReducer;
use super::TranscriptStore;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::ChatError;
use crate::domain::models::ChatView;
use crate::domain::models::Event;
use crate::domain::models::FailureKind;
use crate::domain::models::FragmentStream;
use crate::domain::models::PendingFailure;
use crate::domain::models::ProfileName;
use crate::domain::models::SessionHandle;
use crate::domain::models::StorageBox;

/// Session state of the running client: the active session, the reducer of
/// the outstanding request and the observer notified of every change.
///
/// Every transcript mutation is persisted before observers hear about it.
pub struct Chat {
    sessions: SessionManager,
    reducer: StreamingReducer,
    observer: Option<mpsc::UnboundedSender<Event>>,
}

impl Chat {
    pub fn new(backend: BackendBox, storage: StorageBox) -> Chat {
        return Chat {
            sessions: SessionManager::new(
                backend,
                TranscriptStore::new(storage),
                ProfileName::Fast,
            ),
            reducer: StreamingReducer::default(),
            observer: None,
        };
    }

    pub fn with_observer(mut self, tx: mpsc::UnboundedSender<Event>) -> Chat {
        self.observer = Some(tx);
        return self;
    }

    pub fn view(&self) -> ChatView {
        return ChatView {
            profile: self.sessions.profile().name,
            model: self.sessions.profile().model.to_string(),
            state: self.sessions.state(),
            transcript: self.sessions.transcript().to_vec(),
            busy: self.reducer.is_busy(),
            pending_failure: self.reducer.pending_failure().cloned(),
        };
    }

    /// Initializes the session for the startup profile. A profile given in
    /// configuration wins over the one persisted from the last run.
    pub async fn start(&mut self) {
        let configured = ProfileName::parse(&Config::get(ConfigKey::Profile));
        let profile = configured
            .or_else(|| return self.sessions.store().load_profile())
            .unwrap_or(ProfileName::Fast);

        if let Err(err) = self.select_profile(profile).await {
            tracing::warn!(error = ?err, "Failed to start chat");
        }
    }

    pub async fn select_profile(&mut self, profile: ProfileName) -> Result<(), ChatError> {
        if self.reducer.is_busy() {
            return Err(ChatError::Busy);
        }

        self.sessions.store().save_profile(profile);
        self.reducer = StreamingReducer::default();

        if let Err(err) = self.sessions.select_profile(profile).await {
            self.reducer.record_failure(PendingFailure::new(
                FailureKind::Initialization,
                &format!("{err}. Check your configuration and restart, or switch profiles to try again."),
            ));
        }

        self.notify();
        return Ok(());
    }

    pub async fn toggle_profile(&mut self) -> Result<(), ChatError> {
        let next = self.sessions.profile().name.toggle();
        return self.select_profile(next).await;
    }

    /// Deletes the persisted transcript of the active profile and starts a
    /// fresh session for it.
    pub async fn clear_transcript(&mut self) -> Result<(), ChatError> {
        if self.reducer.is_busy() {
            return Err(ChatError::Busy);
        }

        let profile = self.sessions.profile().name;
        self.sessions.store_mut().clear();
        self.sessions.store().forget(profile);

        return self.select_profile(profile).await;
    }

    /// Appends the user turn and opens the response stream. Once accepted the
    /// request always yields a stream; failing to open the request surfaces
    /// as the stream's first and only item.
    pub async fn send_message(&mut self, text: &str) -> Result<FragmentStream, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self.reducer.is_busy() {
            return Err(ChatError::Busy);
        }

        let handle = self.sessions.active_handle()?.clone();
        self.reducer.begin(self.sessions.store_mut(), text, true)?;
        self.commit();

        return Ok(self.open(&handle, text).await);
    }

    /// Resends the remembered input of the last failed request without adding
    /// another user turn. Does nothing unless a retryable failure is pending.
    pub async fn retry(&mut self) -> Option<FragmentStream> {
        let input = self.reducer.retry_input()?;
        let handle = match self.sessions.active_handle() {
            Ok(handle) => handle.clone(),
            Err(_) => return None,
        };

        if let Err(err) = self.reducer.begin(self.sessions.store_mut(), &input, false) {
            tracing::warn!(error = ?err, "Failed to retry");
            return None;
        }
        self.notify();

        return Some(self.open(&handle, &input).await);
    }

    async fn open(&self, handle: &SessionHandle, text: &str) -> FragmentStream {
        tracing::debug!(session = handle.id, "Sending message");

        match self.sessions.backend().send_message(handle, text).await {
            Ok(fragments) => return fragments,
            Err(err) => return Box::pin(stream::iter(vec![Err::<String, Error>(err)])),
        }
    }

    pub fn apply_fragment(&mut self, fragment: &str) -> Result<(), ChatError> {
        if let Err(err) = self
            .reducer
            .apply_fragment(self.sessions.store_mut(), fragment)
        {
            tracing::warn!(error = ?err, "Dropping fragment");
            return Err(err);
        }

        self.commit();
        return Ok(());
    }

    pub fn complete(&mut self) {
        self.reducer.complete();
        self.commit();
    }

    pub fn fail(&mut self, err: Error) {
        let failure = PendingFailure::from_error(&err);
        tracing::error!(error = ?err, kind = %failure.kind, "Request failed");

        self.reducer.fail(failure);
        self.commit();
    }

    fn commit(&self) {
        self.sessions
            .store()
            .save_current(self.sessions.profile().name);
        self.notify();
    }

    fn notify(&self) {
        if let Some(tx) = &self.observer {
            if tx.send(Event::ChatUpdated(self.view())).is_err() {
                tracing::debug!("Chat observer has gone away");
            }
        }
    }
}
