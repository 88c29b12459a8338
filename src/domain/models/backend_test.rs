use super::SessionHandle;
use super::SessionSeed;
use crate::domain::models::Profile;
use crate::domain::models::ProfileName;
use crate::domain::models::Turn;

fn seed(history: Vec<Turn>) -> SessionSeed {
    return SessionSeed {
        model: "gemini-2.5-flash".to_string(),
        system_instruction: "Be brief.".to_string(),
        thinking_budget: 0,
        history,
    };
}

#[test]
fn it_seeds_from_profile_without_trailing_user_turn() {
    let profile = Profile::get(ProfileName::Fast);
    let transcript = vec![Turn::model("Hi"), Turn::user("unanswered")];

    let seed = SessionSeed::new(&profile, &transcript);

    assert_eq!(seed.history, vec![Turn::model("Hi")]);
    assert_eq!(seed.thinking_budget, profile.thinking_budget);
    assert_eq!(seed.system_instruction, profile.system_instruction);
}

#[test]
fn it_seeds_from_profile_with_history_ending_in_model() {
    let profile = Profile::get(ProfileName::DeepReasoning);
    let transcript = vec![Turn::user("hello"), Turn::model("Hi")];

    let seed = SessionSeed::new(&profile, &transcript);
    assert_eq!(seed.history, transcript);
}

#[test]
fn it_creates_short_ids() {
    let handle = SessionHandle::new(seed(vec![]));
    assert_eq!(handle.id.split('-').count(), 2);
    assert_ne!(handle.id, SessionHandle::new(seed(vec![])).id);
}

#[test]
fn it_exposes_seeded_history() {
    let handle = SessionHandle::new(seed(vec![Turn::model("Hi")]));
    assert_eq!(handle.history(), vec![Turn::model("Hi")]);
}

#[test]
fn it_commits_exchanges_to_shared_history() {
    let handle = SessionHandle::new(seed(vec![]));
    let cloned = handle.clone();

    cloned.commit("hello", "Hi there");

    assert_eq!(
        handle.history(),
        vec![Turn::user("hello"), Turn::model("Hi there")]
    );
}
