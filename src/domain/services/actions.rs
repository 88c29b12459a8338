#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use futures::future;
use futures::StreamExt;
use tokio::sync::mpsc;

use super::Chat;
use crate::domain::models::Action;
use crate::domain::models::ChatError;
use crate::domain::models::FragmentStream;

/// Next item of the active response stream. Never resolves while no request
/// is outstanding.
async fn next_fragment(fragments: &mut Option<FragmentStream>) -> Option<Result<String>> {
    match fragments {
        Some(stream) => return stream.next().await,
        None => return future::pending().await,
    }
}

fn rejected(action: &str, err: ChatError) {
    tracing::warn!(action, error = %err, "Action rejected");
}

async fn handle_action(chat: &mut Chat, action: Action) -> Option<FragmentStream> {
    match action {
        Action::SendMessage(text) => match chat.send_message(&text).await {
            Ok(fragments) => return Some(fragments),
            Err(err) => rejected("send-message", err),
        },
        Action::Retry() => {
            return chat.retry().await;
        }
        Action::ToggleProfile() => {
            if let Err(err) = chat.toggle_profile().await {
                rejected("toggle-profile", err);
            }
        }
        Action::SelectProfile(profile) => {
            if let Err(err) = chat.select_profile(profile).await {
                rejected("select-profile", err);
            }
        }
        Action::ClearTranscript() => {
            if let Err(err) = chat.clear_transcript().await {
                rejected("clear-transcript", err);
            }
        }
    }

    return None;
}

pub struct ActionsService {}

impl ActionsService {
    /// Owns the chat for the lifetime of the client. Actions and fragments of
    /// the single outstanding request are handled one at a time, fragments
    /// first. Returns once the action channel is closed and no request is
    /// left in flight.
    pub async fn start(mut chat: Chat, rx: &mut mpsc::UnboundedReceiver<Action>) -> Result<()> {
        chat.start().await;

        let mut fragments: Option<FragmentStream> = None;
        let mut closed = false;

        loop {
            if closed && fragments.is_none() {
                return Ok(());
            }

            tokio::select! {
                biased;

                fragment = next_fragment(&mut fragments) => match fragment {
                    Some(Ok(text)) => {
                        // Rejections are logged by the chat.
                        let _ = chat.apply_fragment(&text);
                    }
                    Some(Err(err)) => {
                        chat.fail(err);
                        fragments = None;
                    }
                    None => {
                        chat.complete();
                        fragments = None;
                    }
                },
                action = rx.recv(), if !closed => match action {
                    Some(action) => {
                        if let Some(stream) = handle_action(&mut chat, action).await {
                            fragments = Some(stream);
                        }
                    }
                    None => {
                        closed = true;
                    }
                },
            }
        }
    }
}
