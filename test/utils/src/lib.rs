/// Builds a `streamGenerateContent?alt=sse` response body yielding one event per fragment.
pub fn gemini_sse_fixture(fragments: &[&str]) -> String {
    return fragments
        .iter()
        .map(|fragment| {
            let event = serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": fragment }],
                    },
                }],
            });
            return format!("data: {event}\r\n\r\n");
        })
        .collect::<Vec<String>>()
        .join("");
}

pub fn transcript_fixture() -> &'static str {
    return r#"
[
  { "role": "model", "content": "Hey there! What can I do for you?" },
  { "role": "user", "content": "What is the capital of France?" },
  { "role": "model", "content": "The capital of France is Paris." }
]
"#
    .trim();
}
