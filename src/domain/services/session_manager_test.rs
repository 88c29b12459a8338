use anyhow::Result;
use test_utils::transcript_fixture;

use super::SessionManager;
use super::TranscriptStore;
use crate::domain::models::ChatError;
use crate::domain::models::Profile;
use crate::domain::models::ProfileName;
use crate::domain::models::SessionState;
use crate::domain::models::Storage;
use crate::domain::models::Turn;
use crate::infrastructure::backends::scripted::ScriptedBackend;
use crate::infrastructure::storage::memory::MemoryStorage;

fn manager(backend: &ScriptedBackend, storage: &MemoryStorage) -> SessionManager {
    return SessionManager::new(
        Box::new(backend.clone()),
        TranscriptStore::new(Box::new(storage.clone())),
        ProfileName::Fast,
    );
}

#[test]
fn it_starts_uninitialized() {
    let manager = manager(&ScriptedBackend::default(), &MemoryStorage::default());

    assert_eq!(manager.state(), SessionState::Uninitialized);
    assert_eq!(manager.active_handle().err(), Some(ChatError::NotInitialized));
    assert!(manager.transcript().is_empty());
}

#[tokio::test]
async fn it_greets_when_nothing_is_persisted() -> Result<()> {
    let backend = ScriptedBackend::default();
    let mut manager = manager(&backend, &MemoryStorage::default());

    manager.select_profile(ProfileName::Fast).await?;

    let greeting = Profile::get(ProfileName::Fast).greeting();
    assert_eq!(manager.state(), SessionState::Ready);
    assert_eq!(manager.transcript(), &[Turn::model(&greeting)]);
    assert!(manager.active_handle().is_ok());
    assert!(backend.seeds()[0].history.is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_restores_persisted_transcript() -> Result<()> {
    let backend = ScriptedBackend::default();
    let storage = MemoryStorage::default();
    storage.set("transcript-deep-reasoning", transcript_fixture());
    let mut manager = manager(&backend, &storage);

    manager.select_profile(ProfileName::DeepReasoning).await?;

    assert_eq!(manager.profile().name, ProfileName::DeepReasoning);
    assert_eq!(manager.transcript().len(), 3);
    assert_eq!(backend.seeds()[0].history.len(), 3);

    return Ok(());
}

#[tokio::test]
async fn it_seeds_without_trailing_user_turn() -> Result<()> {
    let backend = ScriptedBackend::default();
    let storage = MemoryStorage::default();
    storage.set(
        "transcript-fast",
        &serde_json::to_string(&vec![Turn::model("Hi"), Turn::user("unanswered")])?,
    );
    let mut manager = manager(&backend, &storage);

    manager.select_profile(ProfileName::Fast).await?;

    assert_eq!(manager.transcript().len(), 2);
    assert_eq!(manager.transcript()[1], Turn::user("unanswered"));
    assert_eq!(backend.seeds()[0].history, vec![Turn::model("Hi")]);

    return Ok(());
}

#[tokio::test]
async fn it_never_mixes_profile_transcripts() -> Result<()> {
    let backend = ScriptedBackend::default();
    let storage = MemoryStorage::default();
    storage.set("transcript-fast", transcript_fixture());
    let mut manager = manager(&backend, &storage);

    manager.select_profile(ProfileName::Fast).await?;
    manager.store_mut().append(Turn::user("and Spain?"));
    manager.store_mut().append(Turn::model("Madrid."));

    manager.select_profile(ProfileName::DeepReasoning).await?;
    let greeting = Profile::get(ProfileName::DeepReasoning).greeting();
    assert_eq!(manager.transcript(), &[Turn::model(&greeting)]);

    manager.select_profile(ProfileName::Fast).await?;
    assert_eq!(manager.transcript().len(), 5);
    assert_eq!(manager.transcript()[4], Turn::model("Madrid."));

    return Ok(());
}

#[tokio::test]
async fn it_builds_a_new_handle_on_every_selection() -> Result<()> {
    let backend = ScriptedBackend::default();
    let mut manager = manager(&backend, &MemoryStorage::default());

    manager.select_profile(ProfileName::Fast).await?;
    let first = manager.active_handle()?.id.to_string();
    manager.select_profile(ProfileName::Fast).await?;
    let second = manager.active_handle()?.id.to_string();

    assert_ne!(first, second);
    assert_eq!(backend.seeds().len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_enters_error_state_when_session_creation_fails() {
    let backend = ScriptedBackend::default().refusing_sessions("Gemini API key is not defined");
    let storage = MemoryStorage::default();
    storage.set("transcript-fast", transcript_fixture());
    let mut manager = manager(&backend, &storage);

    let res = manager.select_profile(ProfileName::Fast).await;

    assert!(matches!(res, Err(ChatError::Initialization(_))));
    assert_eq!(manager.state(), SessionState::Error);
    assert!(manager.transcript().is_empty());
    assert_eq!(manager.active_handle().err(), Some(ChatError::NotInitialized));
    assert_eq!(storage.get("transcript-fast").as_deref(), Some(transcript_fixture()));
}

#[tokio::test]
async fn it_recovers_from_error_state_on_reselection() -> Result<()> {
    let backend = ScriptedBackend::default().refusing_sessions("Gemini API key is not defined");
    let mut manager = manager(&backend, &MemoryStorage::default());

    assert!(manager.select_profile(ProfileName::Fast).await.is_err());
    backend.accepting_sessions();
    manager.select_profile(ProfileName::DeepReasoning).await?;

    assert_eq!(manager.state(), SessionState::Ready);
    assert_eq!(manager.transcript().len(), 1);

    return Ok(());
}
