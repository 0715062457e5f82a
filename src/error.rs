// src/error.rs

use std::fmt;

/// Global client error enum.
/// Centralizes the failure taxonomy shared by the API client, the local
/// store and the state containers.
#[derive(Debug)]
pub enum ClientError {
    // Transport-level failure: DNS, connect, timeout, broken body.
    Network(String),

    // The server answered with a non-success status.
    Remote { status: u16, message: String },

    // Local persistent store failure (I/O or serialization).
    Storage(String),

    // An operation that needs a logged-in learner was called without one.
    NotAuthenticated,
}

impl ClientError {
    /// Message suitable for surfacing to a caller (e.g. a failed survey
    /// submission). Never empty.
    pub fn message(&self) -> String {
        match self {
            ClientError::Network(msg) => format!("network error: {}", msg),
            ClientError::Remote { message, .. } => message.clone(),
            ClientError::Storage(msg) => format!("storage error: {}", msg),
            ClientError::NotAuthenticated => "not authenticated".to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "network error: {}", msg),
            ClientError::Remote { status, message } => {
                write!(f, "remote error ({}): {}", status, message)
            }
            ClientError::Storage(msg) => write!(f, "storage error: {}", msg),
            ClientError::NotAuthenticated => write!(f, "not authenticated"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Converts `reqwest::Error` into `ClientError::Network`.
/// Allows using `?` operator on HTTP calls.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
