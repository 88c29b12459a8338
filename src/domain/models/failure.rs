#[cfg(test)]
#[path = "failure_test.rs"]
mod tests;

use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// The session could not be created. Sending stays disabled until fixed.
    Initialization,
    /// A request was refused for its credentials. The session stays usable.
    Credential,
    /// Malformed or policy blocked input. The user should edit their message.
    RequestRejected,
    /// Remote overload or outage.
    TransientService,
    Unclassified,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingFailure {
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
}

const CREDENTIAL_PATTERNS: [&str; 8] = [
    "api key",
    "api_key",
    "unauthenticated",
    "unauthorized",
    "permission",
    "credential",
    "status 401",
    "status 403",
];

const REJECTED_PATTERNS: [&str; 7] = [
    "status 400",
    "invalid argument",
    "invalid_argument",
    "safety",
    "blocked",
    "policy",
    "prohibited",
];

// Status codes only count in the `status NNN` form of request errors, so
// offsets inside parser errors never match.
const TRANSIENT_PATTERNS: [&str; 11] = [
    "status 500",
    "status 502",
    "status 503",
    "status 504",
    "status 429",
    "internal",
    "unavailable",
    "overloaded",
    "resource_exhausted",
    "deadline",
    "timed out",
];

impl PendingFailure {
    pub fn new(kind: FailureKind, message: &str) -> PendingFailure {
        let retryable = matches!(
            kind,
            FailureKind::TransientService | FailureKind::Unclassified
        );

        return PendingFailure {
            kind,
            message: message.to_string(),
            retryable,
        };
    }

    /// Maps a raw failure description onto the failure taxonomy. Patterns are
    /// matched case insensitively, credentials first, then rejected requests,
    /// then transient service errors.
    pub fn classify(description: &str) -> PendingFailure {
        let lowered = description.to_lowercase();
        let matches_any = |patterns: &[&str]| {
            return patterns.iter().any(|pattern| return lowered.contains(pattern));
        };

        if matches_any(&CREDENTIAL_PATTERNS) {
            return PendingFailure::new(
                FailureKind::Credential,
                "Gemini rejected the API key. Check that your gemini-token is set and valid, then restart.",
            );
        }

        if matches_any(&REJECTED_PATTERNS) {
            return PendingFailure::new(
                FailureKind::RequestRejected,
                "Gemini rejected this request. Try rephrasing your message.",
            );
        }

        if matches_any(&TRANSIENT_PATTERNS) {
            return PendingFailure::new(
                FailureKind::TransientService,
                "Gemini is temporarily unavailable or overloaded. Try again in a moment.",
            );
        }

        return PendingFailure::new(
            FailureKind::Unclassified,
            "Something went wrong while talking to Gemini. Try again.",
        );
    }

    pub fn from_error(err: &anyhow::Error) -> PendingFailure {
        return PendingFailure::classify(&format!("{err:#}"));
    }
}
