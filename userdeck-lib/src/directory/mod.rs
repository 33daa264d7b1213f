//! Access to the remote user directory.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    identity::UserId,
    profile::{UpdatePayload, UserRecord},
};

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpUserDirectory;

/// The remote service holding the authoritative profile record.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `GET /users/{id}`
    async fn fetch(&self, id: &UserId) -> Result<UserRecord, DirectoryError>;

    /// `PUT /users/{id}`, replacing the whole record
    async fn replace(&self, id: &UserId, payload: &UpdatePayload) -> Result<(), DirectoryError>;

    /// `DELETE /users/{id}`
    async fn remove(&self, id: &UserId) -> Result<(), DirectoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Transport(String),
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// The `message` field of the server's error body, if it sent one
        message: Option<String>,
    },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl DirectoryError {
    /// Text to show the user: the server's own message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            DirectoryError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}
