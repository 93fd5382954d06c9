//! Shared error types for the Macau weather workspace.
//!
//! Feed-specific failures live in `macau-feeds`; this module holds the
//! network and configuration errors that more than one crate needs.

use thiserror::Error;

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// The configuration error somewhere in an `anyhow` chain, if any
    pub fn find_in(err: &anyhow::Error) -> Option<&ConfigError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ConfigError>())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "設定無效，請檢查設定檔。",
            ConfigError::ParseError(_) => "設定檔格式錯誤，請檢查設定檔。",
        }
    }
}

/// Extension trait for classifying reqwest errors.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_body() || self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = NetworkError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Server error: 502 - bad gateway");
        assert_eq!(NetworkError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_config_error_messages_are_non_empty() {
        let errors = [
            ConfigError::Invalid("feeds.timeout_secs".into()),
            ConfigError::ParseError("line 3".into()),
        ];
        for err in &errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
