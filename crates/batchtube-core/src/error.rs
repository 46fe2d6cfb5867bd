//! Error types for Batchtube core operations.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length of a backend message shown to the user.
pub const MAX_MESSAGE_LEN: usize = 200;

/// Message used when the backend gives no usable detail.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Errors that can occur in Batchtube core operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The submitted playlist URL is empty or not an http(s) URL.
    #[error("{0}")]
    InvalidUrl(String),

    /// Playlist extraction failed.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// A single item failed to download.
    #[error("Download of {video_id} failed: {message}")]
    Download {
        /// Item that failed.
        video_id: String,
        /// Reason reported by the backend.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("Request failed ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail from the error payload.
        message: String,
    },

    /// Network or subscription level failure.
    #[error("Connection error: {0}")]
    Transport(String),

    /// A response or event did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// URL building failed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Build an [`Error::Api`] from a status code and a raw error body.
    ///
    /// The body is expected to carry a `detail` or `message` field; when it
    /// does not, a generic message naming the status is used instead.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(ApiErrorBody::into_message)
            .map_or_else(
                || format!("Request failed with status {status}"),
                |msg| clean_message(&msg),
            );
        Self::Api { status, message }
    }

    /// Text suitable for showing next to an input field or on a card.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl(msg) => msg.clone(),
            Self::Extraction(msg) | Self::Transport(msg) => clean_message(msg),
            Self::Download { message, .. } | Self::Api { message, .. } => clean_message(message),
            other => clean_message(&other.to_string()),
        }
    }
}

/// Error payload returned by the backend.
#[derive(Debug, Default, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            // Validation errors arrive as a list of objects with a `msg` field.
            Some(serde_json::Value::Array(entries)) => entries
                .iter()
                .find_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        };
        detail
            .or(self.message)
            .filter(|msg| !msg.trim().is_empty())
    }
}

/// Shorten a backend message for display.
///
/// Keeps only what follows the last `ERROR:` marker and caps the length.
pub fn clean_message(raw: &str) -> String {
    let tail = raw
        .rsplit_once("ERROR:")
        .map_or(raw, |(_, tail)| tail)
        .trim();
    if tail.is_empty() {
        return GENERIC_FAILURE.to_string();
    }
    tail.chars().take(MAX_MESSAGE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Download {
            video_id: "abc".to_string(),
            message: "blocked".to_string(),
        };
        assert_eq!(err.to_string(), "Download of abc failed: blocked");
    }

    #[test]
    fn test_from_response_uses_detail() {
        let err = Error::from_response(400, r#"{"detail":"URL is required"}"#);
        assert_eq!(
            err,
            Error::Api {
                status: 400,
                message: "URL is required".to_string()
            }
        );
    }

    #[test]
    fn test_from_response_uses_message_field() {
        let err = Error::from_response(500, r#"{"message":"boom"}"#);
        assert_eq!(err.user_message(), "boom");
    }

    #[test]
    fn test_from_response_validation_list() {
        let body = r#"{"detail":[{"loc":["body","url"],"msg":"field required"}]}"#;
        assert_eq!(Error::from_response(422, body).user_message(), "field required");
    }

    #[test]
    fn test_from_response_falls_back_to_generic() {
        let err = Error::from_response(502, "<html>Bad gateway</html>");
        assert_eq!(err.user_message(), "Request failed with status 502");

        let err = Error::from_response(500, r#"{"detail":""}"#);
        assert_eq!(err.user_message(), "Request failed with status 500");
    }

    #[test]
    fn test_clean_message_strips_tool_prefix() {
        let raw = "DownloadError: ERROR: [youtube] xyz: Video unavailable";
        assert_eq!(clean_message(raw), "[youtube] xyz: Video unavailable");
    }

    #[test]
    fn test_clean_message_truncates() {
        let raw = "x".repeat(500);
        assert_eq!(clean_message(&raw).chars().count(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_clean_message_empty() {
        assert_eq!(clean_message("   "), GENERIC_FAILURE);
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_err = url::Url::parse("not a url").err();
        assert!(parse_err.is_some());
        if let Some(e) = parse_err {
            let err: Error = e.into();
            assert!(matches!(err, Error::Url(_)));
        }
    }
}
