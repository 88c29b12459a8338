#[cfg(test)]
#[path = "session_manager_test.rs"]
mod tests;

use super::TranscriptStore;
use crate::domain::models::BackendBox;
use crate::domain::models::ChatError;
use crate::domain::models::Profile;
use crate::domain::models::ProfileName;
use crate::domain::models::SessionHandle;
use crate::domain::models::SessionSeed;
use crate::domain::models::SessionState;
use crate::domain::models::Turn;

/// Owns the remote session for the active profile along with the profile's
/// transcript. A new handle is built on every profile selection; handles are
/// never reused across profiles.
pub struct SessionManager {
    backend: BackendBox,
    store: TranscriptStore,
    profile: Profile,
    state: SessionState,
    handle: Option<SessionHandle>,
}

impl SessionManager {
    pub fn new(backend: BackendBox, store: TranscriptStore, profile: ProfileName) -> SessionManager {
        return SessionManager {
            backend,
            store,
            profile: Profile::get(profile),
            state: SessionState::Uninitialized,
            handle: None,
        };
    }

    pub fn backend(&self) -> &BackendBox {
        return &self.backend;
    }

    pub fn profile(&self) -> &Profile {
        return &self.profile;
    }

    pub fn state(&self) -> SessionState {
        return self.state;
    }

    pub fn store(&self) -> &TranscriptStore {
        return &self.store;
    }

    pub fn store_mut(&mut self) -> &mut TranscriptStore {
        return &mut self.store;
    }

    pub fn transcript(&self) -> &[Turn] {
        return self.store.turns();
    }

    pub fn active_handle(&self) -> Result<&SessionHandle, ChatError> {
        if self.state != SessionState::Ready {
            return Err(ChatError::NotInitialized);
        }

        return self.handle.as_ref().ok_or(ChatError::NotInitialized);
    }

    /// Discards the current session and transcript, then restores the
    /// transcript persisted for `name` and seeds a new remote session with it.
    /// Without a persisted transcript, the profile's greeting becomes the
    /// whole transcript.
    pub async fn select_profile(&mut self, name: ProfileName) -> Result<(), ChatError> {
        self.store.save_current(self.profile.name);
        self.handle = None;
        self.store.clear();
        self.state = SessionState::Uninitialized;
        self.profile = Profile::get(name);

        let persisted = self.store.load(name);
        let seed = SessionSeed::new(&self.profile, &persisted);

        tracing::debug!(
            profile = %name,
            model = self.profile.model,
            history = seed.history.len(),
            "Creating session"
        );

        match self.backend.create_session(seed).await {
            Ok(handle) => {
                tracing::debug!(profile = %name, session = handle.id, "Session ready");
                self.handle = Some(handle);

                if persisted.is_empty() {
                    self.store.replace(vec![Turn::model(&self.profile.greeting())]);
                } else {
                    self.store.replace(persisted);
                }

                self.state = SessionState::Ready;
                return Ok(());
            }
            Err(err) => {
                tracing::error!(error = ?err, profile = %name, "Failed to create session");
                self.state = SessionState::Error;
                self.store.clear();
                return Err(ChatError::Initialization(format!("{err:#}")));
            }
        }
    }
}
