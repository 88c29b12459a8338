use super::StreamingReducer;
use super::TranscriptStore;
use crate::domain::models::ChatError;
use crate::domain::models::FailureKind;
use crate::domain::models::PendingFailure;
use crate::domain::models::Turn;
use crate::infrastructure::storage::memory::MemoryStorage;

fn store() -> TranscriptStore {
    let mut store = TranscriptStore::new(Box::<MemoryStorage>::default());
    store.append(Turn::model("Hey there!"));
    return store;
}

#[test]
fn it_appends_user_turn_and_arms_busy() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();

    reducer.begin(&mut store, "hello", true).unwrap();

    assert!(reducer.is_busy());
    assert_eq!(reducer.last_input(), Some("hello"));
    assert_eq!(store.last(), Some(&Turn::user("hello")));
}

#[test]
fn it_rejects_begin_while_busy() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "hello", true).unwrap();

    assert_eq!(reducer.begin(&mut store, "again", true), Err(ChatError::Busy));
    assert_eq!(store.turns().len(), 2);
}

#[test]
fn it_folds_fragments_into_one_model_turn() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "hello", true).unwrap();

    for fragment in ["Hi", " there", ", how", " are you?"] {
        assert_eq!(reducer.apply_fragment(&mut store, fragment), Ok(()));
    }
    reducer.complete();

    assert_eq!(store.turns().len(), 3);
    assert_eq!(store.last(), Some(&Turn::model("Hi there, how are you?")));
    assert!(!reducer.is_busy());
    assert_eq!(reducer.last_input(), None);
}

#[test]
fn it_holds_full_response_after_every_fragment() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "count", true).unwrap();

    let mut expected = String::new();
    for fragment in ["1", "2", "", "3", "\n4"] {
        expected.push_str(fragment);
        reducer.apply_fragment(&mut store, fragment).unwrap();
        assert_eq!(store.last().unwrap().content, expected);
    }
}

#[test]
fn it_rejects_fragments_without_a_request() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();

    assert_eq!(
        reducer.apply_fragment(&mut store, "stray"),
        Err(ChatError::InvalidState)
    );
    assert_eq!(store.turns().len(), 1);
}

#[test]
fn it_keeps_partial_turn_and_input_on_failure() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "y", true).unwrap();
    reducer.apply_fragment(&mut store, "partial").unwrap();

    reducer.fail(PendingFailure::classify("status 503 (UNAVAILABLE)"));

    assert!(!reducer.is_busy());
    assert_eq!(store.last(), Some(&Turn::model("partial")));
    assert_eq!(reducer.last_input(), Some("y"));
    assert_eq!(reducer.retry_input(), Some("y".to_string()));
}

#[test]
fn it_clears_failure_on_next_begin() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "x", true).unwrap();
    reducer.fail(PendingFailure::classify("status 503"));

    reducer.begin(&mut store, "z", true).unwrap();

    assert_eq!(reducer.pending_failure(), None);
    assert_eq!(reducer.last_input(), Some("z"));
}

#[test]
fn it_retries_without_appending_user_turn() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "y", true).unwrap();
    reducer.fail(PendingFailure::classify("status 503"));

    let input = reducer.retry_input().unwrap();
    reducer.begin(&mut store, &input, false).unwrap();
    reducer.apply_fragment(&mut store, "done").unwrap();
    reducer.complete();

    assert_eq!(
        store.turns(),
        &[
            Turn::model("Hey there!"),
            Turn::user("y"),
            Turn::model("done")
        ]
    );
    assert_eq!(reducer.retry_input(), None);
}

#[test]
fn it_does_not_retry_terminal_failures() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "x", true).unwrap();
    reducer.fail(PendingFailure::classify("API key not valid"));

    assert_eq!(
        reducer.pending_failure().map(|e| return e.kind),
        Some(FailureKind::Credential)
    );
    assert_eq!(reducer.retry_input(), None);
}

#[test]
fn it_does_not_retry_without_failure() {
    let reducer = StreamingReducer::default();
    assert_eq!(reducer.retry_input(), None);
}

#[test]
fn it_replaces_partial_turn_on_retry() {
    let mut store = store();
    let mut reducer = StreamingReducer::default();
    reducer.begin(&mut store, "y", true).unwrap();
    reducer.apply_fragment(&mut store, "partial").unwrap();
    reducer.fail(PendingFailure::classify("status 503 (UNAVAILABLE)"));

    let input = reducer.retry_input().unwrap();
    reducer.begin(&mut store, &input, false).unwrap();
    assert_eq!(store.last(), Some(&Turn::model("partial")));

    reducer.apply_fragment(&mut store, "full").unwrap();
    assert_eq!(store.last(), Some(&Turn::model("full")));
    reducer.apply_fragment(&mut store, " answer").unwrap();
    reducer.complete();

    assert_eq!(
        store.turns(),
        &[
            Turn::model("Hey there!"),
            Turn::user("y"),
            Turn::model("full answer")
        ]
    );
}
