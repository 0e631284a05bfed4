//! Error types for the phonebook client

use thiserror::Error;

/// Result type alias for API calls
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of a call to the contacts API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, timeout, or an unreadable response
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Server responded {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        /// `message` from the server's error body, if any
        message: Option<String>,
    },
}

impl ClientError {
    /// The message the server attached to its error response
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, .. } => message.as_deref(),
            ClientError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// A form entry rejected before any request is made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a name")]
    MissingName,

    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,

    #[error("Please enter a valid birth date (YYYY-MM-DD)")]
    InvalidBirthDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let err = ClientError::Server {
            status: 500,
            message: Some("Validation failed: name is required".to_string()),
        };
        assert_eq!(err.server_message(), Some("Validation failed: name is required"));
        assert_eq!(
            err.to_string(),
            "Server responded 500: Validation failed: name is required"
        );

        let err = ClientError::Transport("connection refused".to_string());
        assert_eq!(err.server_message(), None);
    }
}
