#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

use super::ProfileName;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit() || cmd.is_retry() || cmd.is_profile() || cmd.is_clear() || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_retry(&self) -> bool {
        return ["/r", "/retry"].contains(&self.command.as_str());
    }

    pub fn is_profile(&self) -> bool {
        return ["/p", "/profile"].contains(&self.command.as_str());
    }

    pub fn is_clear(&self) -> bool {
        return ["/clear"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    /// Profile named in `/profile NAME`. `None` when no argument was given, in
    /// which case the active profile is toggled.
    pub fn profile_arg(&self) -> Option<ProfileName> {
        return self
            .args
            .first()
            .and_then(|arg| return ProfileName::parse(arg));
    }
}

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /retry (/r) - Resends your last message after a failed response.
- /profile (/p) [PROFILE?] - Switches to the given profile (fast, deep-reasoning), or toggles between them.
- /clear - Deletes the saved transcript for the active profile and starts over.
- /quit /exit (/q) - Exit Kettle.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+R - Retry your last message after a failed response.
- CTRL+T - Toggle between the fast and deep-reasoning profiles.
- CTRL+C - Exit.

PROFILES:
Each profile pairs a Gemini model with a thinking budget and a system instruction, and keeps its own transcript. Switching profiles saves the current transcript and restores the other profile's one.
        "#;

    return text.trim().to_string();
}
