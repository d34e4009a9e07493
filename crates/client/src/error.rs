//! Transport-level errors.
//!
//! Network failures and backend rejections (including backend validation,
//! e.g. an unknown item) both end up here; callers treat them alike.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status for backend rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(status, _) => Some(*status),
            _ => None,
        }
    }
}
