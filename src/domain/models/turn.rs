#[cfg(test)]
#[path = "turn_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: &str) -> Turn {
        return Turn {
            role,
            content: content.to_string(),
        };
    }

    pub fn user(content: &str) -> Turn {
        return Turn::new(Role::User, content);
    }

    pub fn model(content: &str) -> Turn {
        return Turn::new(Role::Model, content);
    }

    /// Word wraps the content to fit within `line_max_width` columns. Tabs are
    /// expanded to two spaces so wrapped widths stay predictable.
    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let content = self.content.replace('\t', "  ");

        for full_line in content.split('\n') {
            if full_line.trim().is_empty() {
                lines.push(" ".to_string());
                continue;
            }

            let mut char_count = 0;
            let mut current_lines: Vec<&str> = vec![];

            for word in full_line.split(' ') {
                let word_len = word.chars().count();
                if !current_lines.is_empty() && word_len + char_count + 1 > line_max_width {
                    lines.push(current_lines.join(" ").trim_end().to_string());
                    current_lines = vec![word];
                    char_count = word_len + 1;
                } else {
                    current_lines.push(word);
                    char_count += word_len + 1;
                }
            }
            if !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
            }
        }

        return lines;
    }
}

/// Returns the history a new remote session may be seeded with. Remote
/// sessions must be seeded with a history ending on a model turn, so a
/// trailing unanswered user turn is dropped.
pub fn history_for_remote(transcript: &[Turn]) -> Vec<Turn> {
    if let Some(last) = transcript.last() {
        if last.role == Role::User {
            return transcript[..transcript.len() - 1].to_vec();
        }
    }

    return transcript.to_vec();
}
