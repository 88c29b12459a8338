#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::Lines;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::FragmentStream;
use crate::domain::models::Role;
use crate::domain::models::SessionHandle;
use crate::domain::models::SessionSeed;

/// Finish reasons that mean the response was cut off by a content filter.
const BLOCKED_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

// The request URL carries the API key, so it is dropped from every error.
fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.without_url().to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct Part {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompletionResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct ApiError {
    code: u16,
    message: String,
    status: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

impl Content {
    fn new(role: Role, text: &str) -> Content {
        return Content {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        };
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(res) => {
            return anyhow!(
                "Gemini request failed with status {} ({}): {}",
                status.as_u16(),
                res.error.status,
                res.error.message
            );
        }
        Err(_) => {
            return anyhow!("Gemini request failed with status {}", status.as_u16());
        }
    }
}

/// Parses one line of the server sent event stream. Returns the text of the
/// event, or `None` for lines and events carrying no text.
fn parse_event(line: &str) -> Result<Option<String>> {
    let data = match line.trim().strip_prefix("data:") {
        Some(data) => data.trim(),
        None => return Ok(None),
    };
    if data.is_empty() {
        return Ok(None);
    }

    let res: CompletionResponse =
        serde_json::from_str(data).context("Failed to parse Gemini response")?;

    if let Some(reason) = res.prompt_feedback.and_then(|e| return e.block_reason) {
        bail!("Gemini blocked the prompt: {reason}");
    }

    let mut text = String::new();
    for candidate in res.candidates {
        if let Some(reason) = candidate.finish_reason {
            if BLOCKED_FINISH_REASONS.contains(&reason.as_str()) {
                bail!("Gemini blocked the response: {reason}");
            }
        }

        for part in candidate.content.parts {
            text.push_str(&part.text);
        }
    }

    if text.is_empty() {
        return Ok(None);
    }

    return Ok(Some(text));
}

struct ResponseProgress<R> {
    lines: Lines<R>,
    handle: SessionHandle,
    input: String,
    reply: String,
}

async fn next_fragment<R: AsyncBufRead + Unpin>(
    mut progress: ResponseProgress<R>,
) -> Result<Option<(String, ResponseProgress<R>)>> {
    while let Some(line) = progress.lines.next_line().await? {
        if let Some(fragment) = parse_event(&line)? {
            progress.reply.push_str(&fragment);
            return Ok(Some((fragment, progress)));
        }
    }

    progress.handle.commit(&progress.input, &progress.reply);
    return Ok(None);
}

pub struct Gemini {
    url: String,
    token: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            url: Config::get(ConfigKey::GeminiURL),
            token: Config::get(ConfigKey::GeminiToken),
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini API key is not defined");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn create_session(&self, seed: SessionSeed) -> Result<SessionHandle> {
        if self.token.is_empty() {
            bail!("Gemini API key is not defined. Set gemini-token in your config file, or the KETTLE_GEMINI_TOKEN environment variable");
        }

        let handle = SessionHandle::new(seed);
        tracing::debug!(
            session = handle.id,
            model = handle.model,
            history = handle.history().len(),
            "Created Gemini session"
        );

        return Ok(handle);
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, handle: &SessionHandle, text: &str) -> Result<FragmentStream> {
        let mut contents = handle
            .history()
            .iter()
            .map(|turn| return Content::new(turn.role, &turn.content))
            .collect::<Vec<Content>>();
        contents.push(Content::new(Role::User, text));

        let req = CompletionRequest {
            contents,
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: handle.system_instruction.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig {
                    thinking_budget: handle.thinking_budget,
                },
            },
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/models/{model}:streamGenerateContent?alt=sse&key={key}",
                url = self.url,
                model = handle.model,
                key = self.token,
            ))
            .json(&req)
            .send()
            .await
            .map_err(|err| return anyhow::Error::new(err.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                session = handle.id,
                "Failed to make completion request to Gemini"
            );
            return Err(status_error(status, &body));
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let progress = ResponseProgress {
            lines: StreamReader::new(stream).lines(),
            handle: handle.clone(),
            input: text.to_string(),
            reply: String::new(),
        };

        return Ok(Box::pin(stream::try_unfold(progress, next_fragment)));
    }
}
