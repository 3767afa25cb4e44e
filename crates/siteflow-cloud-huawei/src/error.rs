//! Huawei Cloud client error types

use siteflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuaweiError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error answered by an OBS / CDN / SCM endpoint
    #[error("API error (HTTP {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Certificate already pushed: {0}")]
    AlreadyPushed(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<HuaweiError> for CloudError {
    fn from(err: HuaweiError) -> Self {
        match err {
            HuaweiError::Http(e) if e.is_timeout() => CloudError::Timeout(e.to_string()),
            HuaweiError::Http(e) => CloudError::Transport(e.to_string()),
            HuaweiError::Api {
                status,
                code,
                message,
            } => CloudError::Service {
                status,
                code,
                message,
            },
            HuaweiError::NotFound(resource) => CloudError::NotFound(resource),
            HuaweiError::AlreadyExists(resource) => CloudError::AlreadyExists(resource),
            HuaweiError::AlreadyPushed(certificate) => CloudError::AlreadyAssociated(certificate),
            HuaweiError::UnexpectedResponse(msg) | HuaweiError::Xml(msg) => {
                CloudError::MalformedResponse(msg)
            }
            HuaweiError::JsonError(e) => CloudError::MalformedResponse(e.to_string()),
            HuaweiError::InvalidConfig(msg) | HuaweiError::Signing(msg) => {
                CloudError::InvalidRequest(msg)
            }
            HuaweiError::IoError(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, HuaweiError>;
