//! Weather-specific error type.

use isun_core::{AuthError, ConfigError, RemoteCallError};
use thiserror::Error;

/// Everything the session client and the city resolver can fail with.
///
/// Errors are propagated as-is; nothing here retries.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Remote call error: {0}")]
    Remote(#[from] RemoteCallError),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Auth(e) => e.user_message(),
            Self::Remote(e) => e.user_message(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
