#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ProfileName {
    Fast,
    DeepReasoning,
}

impl ProfileName {
    pub fn parse(text: &str) -> Option<ProfileName> {
        return ProfileName::iter().find(|e| return e.to_string() == text.trim());
    }

    pub fn toggle(&self) -> ProfileName {
        match self {
            ProfileName::Fast => return ProfileName::DeepReasoning,
            ProfileName::DeepReasoning => return ProfileName::Fast,
        }
    }

    /// Storage key holding the persisted transcript for the profile.
    pub fn transcript_key(&self) -> String {
        return format!("transcript-{self}");
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: ProfileName,
    pub model: String,
    /// Token budget the model may spend thinking before it answers.
    pub thinking_budget: i32,
    pub system_instruction: String,
}

impl Profile {
    pub fn get(name: ProfileName) -> Profile {
        match name {
            ProfileName::Fast => {
                return Profile {
                    name,
                    model: Config::get(ConfigKey::FastModel),
                    thinking_budget: 0,
                    system_instruction: "You are a helpful assistant chatting in a terminal. Keep answers short and to the point, and add the language to any code blocks.".to_string(),
                };
            }
            ProfileName::DeepReasoning => {
                return Profile {
                    name,
                    model: Config::get(ConfigKey::DeepModel),
                    thinking_budget: 32768,
                    system_instruction: "You are a careful assistant chatting in a terminal. Work through problems step by step before answering, state your assumptions, and add the language to any code blocks.".to_string(),
                };
            }
        }
    }

    pub fn greeting(&self) -> String {
        match self.name {
            ProfileName::Fast => return "Hey there! What can I do for you?".to_string(),
            ProfileName::DeepReasoning => {
                return "Hey there! I'll take my time and think things through. What should we dig into?".to_string();
            }
        }
    }
}
