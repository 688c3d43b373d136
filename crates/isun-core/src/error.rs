//! Centralized error types for the iSun weather poller.
//!
//! This module provides the typed error taxonomy shared by every crate:
//! - `ConfigError` for missing or malformed settings
//! - `AuthError` for credential rejection during explicit authentication
//! - `RemoteCallError` for every other failure talking to the weather service
//!
//! Each type carries a `user_message()` suitable for the console.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found. Check the --config path.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Authentication errors raised by the explicit authorize call.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Authorization succeeded but returned an empty token")]
    EmptyToken,

    #[error("Authorization request failed: {0}")]
    Transport(String),

    #[error("Invalid authorization response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::Rejected { status, .. } if *status == 401 || *status == 403 => {
                "Invalid credentials. Check the weather API user and password."
            }
            AuthError::Rejected { .. } => "Sign-in to the weather service failed.",
            AuthError::EmptyToken | AuthError::InvalidResponse(_) => {
                "The weather service returned an unexpected sign-in response."
            }
            AuthError::Transport(_) => "Unable to reach the weather service to sign in.",
        }
    }
}

/// Failures of authenticated calls against the weather service.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// The service rejected the bearer token even after re-authentication.
    #[error("Unauthorized call to {endpoint}")]
    Unauthorized { endpoint: String },

    #[error("Server error on {endpoint}: {status} - {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteCallError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RemoteCallError::Unauthorized { .. } => {
                "The weather service keeps rejecting our session. Check your credentials."
            }
            RemoteCallError::Status { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            RemoteCallError::Status { .. } => "The weather request failed.",
            RemoteCallError::Transport(_) => {
                "Unable to connect. Check your internet connection."
            }
            RemoteCallError::Timeout => "The weather request timed out.",
            RemoteCallError::InvalidResponse(_) => {
                "Received an unexpected response from the weather service."
            }
        }
    }

    /// Status code reported by the service, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteCallError::Unauthorized { .. } => Some(401),
            RemoteCallError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_remote_call_error(self) -> RemoteCallError;
    fn into_auth_error(self) -> AuthError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_remote_call_error(self) -> RemoteCallError {
        if self.is_timeout() {
            RemoteCallError::Timeout
        } else if self.is_decode() {
            RemoteCallError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            RemoteCallError::Status {
                endpoint: self
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_default(),
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            RemoteCallError::Transport(self.to_string())
        }
    }

    fn into_auth_error(self) -> AuthError {
        if self.is_decode() {
            AuthError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            AuthError::Rejected {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            AuthError::Transport(self.to_string())
        }
    }
}
