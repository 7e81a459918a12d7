use thiserror::Error;

/// Transport, configuration and encoding failures. These never cross the
/// service boundary; callers of the thought service only see [`ThoughtError`].
#[derive(Debug, Error)]
pub enum MindTraceError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Expected a row in the response but none was returned")]
    EmptyResponse,
}

impl MindTraceError {
    /// Builds an `Api` error from a non-success response body, preferring the
    /// `message` field PostgREST puts in its JSON error objects.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_json_message(body).unwrap_or_else(|| truncate(body, 200));
        Self::Api { status, message }
    }
}

pub type Result<T> = std::result::Result<T, MindTraceError>;

/// Fixed, user-facing failures of thought operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThoughtError {
    #[error("Failed to load thoughts.")]
    LoadFailed,
    #[error("Failed to add thought.")]
    AddFailed,
    #[error("Failed to update thought.")]
    UpdateFailed,
    #[error("Failed to delete thought.")]
    DeleteFailed,
    #[error("Failed to toggle thought visibility.")]
    ToggleHiddenFailed,
    #[error("Thought {0} not found.")]
    NotFound(String),
    #[error("Thought content cannot be empty.")]
    EmptyContent,
    #[error("Another operation on thought {0} is still in progress.")]
    Busy(String),
}

pub type ThoughtResult<T> = std::result::Result<T, ThoughtError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Failed to load profile.")]
    LoadFailed,
    #[error("Failed to update profile.")]
    UpdateFailed,
}

pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

fn extract_json_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
