//! Cloud client error types

use thiserror::Error;

/// Errors reported by a [`ResourceClient`](crate::ResourceClient)
#[derive(Error, Debug)]
pub enum CloudError {
    /// Network or authentication failure before a usable response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Structured error reported by the remote service
    #[error("Service error (HTTP {status}): {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The certificate is already associated with the target service
    #[error("Already associated: {0}")]
    AlreadyAssociated(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    pub fn is_already_associated(&self) -> bool {
        matches!(self, Self::AlreadyAssociated(_))
    }

    /// HTTP status carried by the error, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
