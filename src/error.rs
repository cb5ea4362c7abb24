use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by forum operations.
///
/// A page that parses to zero entities is not an error and never shows up here.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { status: StatusCode, url: String },
    #[error("response from {url} is not valid GBK text")]
    Decode { url: String },
    #[error("{0}")]
    Auth(String),
    #[error("submission rejected with status {status}")]
    Rejected { status: StatusCode },
    #[error("no form hash found on {url}")]
    MissingFormHash { url: String },
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("subject cannot be empty")]
    EmptySubject,
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ForumError {
    /// Whether calling the same operation again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Decode { .. }
        )
    }

    /// Short text suitable for a dismissible alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Status { .. } => {
                "Network error. Please try again.".to_string()
            }
            Self::Decode { .. } => "The forum sent a page that could not be read.".to_string(),
            Self::Auth(message) => message.clone(),
            Self::Rejected { .. } | Self::MissingFormHash { .. } => {
                "The forum did not accept the post. Please try again.".to_string()
            }
            Self::EmptyMessage => "Message cannot be empty.".to_string(),
            Self::EmptySubject => "Subject cannot be empty.".to_string(),
            Self::Url(_) | Self::Config(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ForumError::Decode {
            url: "x".to_string()
        }
        .is_retryable());
        assert!(ForumError::Status {
            status: StatusCode::BAD_GATEWAY,
            url: "x".to_string()
        }
        .is_retryable());
        assert!(!ForumError::Auth("nope".to_string()).is_retryable());
        assert!(!ForumError::EmptyMessage.is_retryable());
    }

    #[test]
    fn test_auth_user_message_passes_through() {
        let err = ForumError::Auth("Login failed. Please check your credentials.".to_string());
        assert_eq!(
            err.user_message(),
            "Login failed. Please check your credentials."
        );
    }
}
