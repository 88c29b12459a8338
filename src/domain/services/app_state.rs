#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::Scroll;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::Action;
use crate::domain::models::ChatView;
use crate::domain::models::Loading;
use crate::domain::models::Role;
use crate::domain::models::SessionState;
use crate::domain::models::SlashCommand;
use crate::domain::models::Turn;

/// UI side state. Mirrors the latest chat view published by the actions
/// service and keeps the wrapped transcript lines in sync with the viewport.
pub struct AppState {
    pub chat: Option<ChatView>,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub lines: Vec<String>,
    pub loading: Loading,
    pub notice: Option<String>,
    pub scroll: Scroll,
    pub username: String,
}

impl AppState {
    pub fn new() -> AppState {
        return AppState {
            chat: None,
            last_known_height: 0,
            last_known_width: 0,
            lines: vec![],
            loading: Loading::default(),
            notice: None,
            scroll: Scroll::default(),
            username: Config::get(ConfigKey::Username),
        };
    }

    pub fn is_busy(&self) -> bool {
        return self.chat.as_ref().map(|e| return e.busy).unwrap_or(false);
    }

    pub fn model(&self) -> String {
        return self
            .chat
            .as_ref()
            .map(|e| return e.model.to_string())
            .unwrap_or_default();
    }

    pub fn handle_chat_updated(&mut self, view: ChatView) {
        self.chat = Some(view);
        self.sync_dependants();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    /// Handles chat commands typed into the prompt. Returns whether the UI
    /// should exit, and whether the input was consumed as a command.
    pub fn handle_slash_commands(
        &mut self,
        input_str: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        let command = match SlashCommand::parse(input_str) {
            Some(command) => command,
            None => return Ok((false, false)),
        };
        self.set_notice(None);

        if command.is_quit() {
            return Ok((true, false));
        }

        if command.is_help() {
            self.set_notice(Some(help_text()));
            return Ok((false, true));
        }

        if command.is_retry() {
            self.handle_retry(tx)?;
            return Ok((false, true));
        }

        if self.is_busy() {
            self.set_notice(Some(
                "Wait for the current response to finish first.".to_string(),
            ));
            return Ok((false, true));
        }

        if command.is_profile() {
            match command.profile_arg() {
                Some(profile) => tx.send(Action::SelectProfile(profile))?,
                None if command.args.is_empty() => tx.send(Action::ToggleProfile())?,
                None => {
                    self.set_notice(Some(format!(
                        "Unknown profile {}. Use fast or deep-reasoning.",
                        command.args.join(" ")
                    )));
                }
            }
            return Ok((false, true));
        }

        if command.is_clear() {
            tx.send(Action::ClearTranscript())?;
        }

        return Ok((false, true));
    }

    /// Sends a chat message. Returns false when the chat can't take a message
    /// right now, in which case the prompt should keep its text.
    pub fn handle_message(
        &mut self,
        input_str: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        if input_str.trim().is_empty() {
            return Ok(false);
        }

        self.set_notice(None);
        let (can_send, state) = match &self.chat {
            Some(view) => (view.can_send(), view.state),
            None => (false, SessionState::Uninitialized),
        };

        if can_send {
            tx.send(Action::SendMessage(input_str.to_string()))?;
            self.scroll.last();
            return Ok(true);
        }

        let notice = match state {
            SessionState::Error => "Kettle isn't connected to Gemini. Fix the error above, or switch profiles with CTRL+T to try again.",
            SessionState::Uninitialized => "Kettle is still connecting to Gemini.",
            SessionState::Ready => "Wait for the current response to finish first.",
        };
        self.set_notice(Some(notice.to_string()));

        return Ok(false);
    }

    pub fn handle_retry(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        let can_retry = self
            .chat
            .as_ref()
            .map(|e| return e.can_retry())
            .unwrap_or(false);

        if can_retry {
            self.set_notice(None);
            tx.send(Action::Retry())?;
        } else {
            self.set_notice(Some("There is nothing to retry.".to_string()));
        }

        return Ok(());
    }

    pub fn handle_toggle_profile(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.is_busy() {
            self.set_notice(Some(
                "Wait for the current response to finish before switching profiles.".to_string(),
            ));
            return Ok(());
        }

        self.set_notice(None);
        tx.send(Action::ToggleProfile())?;
        return Ok(());
    }

    pub fn status_line(&self) -> String {
        match &self.chat {
            Some(view) => {
                return format!(
                    "Profile: {} | Model: {} | Session: {}",
                    view.profile, view.model, view.state
                );
            }
            None => return "Starting...".to_string(),
        }
    }

    pub fn failure_banner(&self) -> Option<String> {
        let view = self.chat.as_ref()?;
        let failure = view.pending_failure.as_ref()?;

        if view.can_retry() {
            return Some(format!(
                "{} Press CTRL+R or type /retry to try again.",
                failure.message
            ));
        }

        return Some(failure.message.to_string());
    }

    fn set_notice(&mut self, notice: Option<String>) {
        if self.notice == notice {
            return;
        }

        self.notice = notice;
        self.sync_dependants();
        if self.notice.is_some() {
            self.scroll.last();
        }
    }

    fn sync_dependants(&mut self) {
        let width = usize::from(self.last_known_width.saturating_sub(4)).max(10);
        let mut lines: Vec<String> = vec![];

        if let Some(view) = &self.chat {
            for turn in &view.transcript {
                let author = match turn.role {
                    Role::User => &self.username,
                    Role::Model => &view.model,
                };
                lines.push(format!("{author}:"));
                lines.extend(turn.as_string_lines(width));
                lines.push("".to_string());
            }
        }

        if let Some(notice) = &self.notice {
            lines.extend(Turn::model(notice).as_string_lines(width));
        }

        self.lines = lines;
        self.scroll.set_state(
            u16::try_from(self.lines.len()).unwrap_or(u16::MAX),
            self.last_known_height,
        );
    }
}
