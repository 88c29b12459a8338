use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("a response is still streaming in")]
    Busy,
    #[error("there is no active session to send to")]
    NotInitialized,
    #[error("the last turn is not a model turn")]
    InvalidState,
    #[error("cannot send an empty message")]
    EmptyInput,
    #[error("failed to start a session: {0}")]
    Initialization(String),
}
