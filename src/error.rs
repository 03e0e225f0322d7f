use std::fmt;

use crate::api::ApiError;
use crate::views::ViewError;

#[derive(Debug)]
pub enum ConsoleError {
    InvalidConfig,
    ConfigError(String),
    IoError(std::io::Error),
    SerdeError(String),
    Api(ApiError),
    View(ViewError),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::InvalidConfig => write!(f, "Invalid configuration"),
            ConsoleError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ConsoleError::IoError(err) => write!(f, "IO error: {}", err),
            ConsoleError::SerdeError(err) => write!(f, "Configuration parse error: {}", err),
            ConsoleError::Api(err) => write!(f, "API error: {}", err),
            ConsoleError::View(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::IoError(err) => Some(err),
            ConsoleError::Api(err) => Some(err),
            ConsoleError::View(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::IoError(err)
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        ConsoleError::SerdeError(err.to_string())
    }
}

impl From<toml::ser::Error> for ConsoleError {
    fn from(err: toml::ser::Error) -> Self {
        ConsoleError::SerdeError(err.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::SerdeError(err.to_string())
    }
}

impl From<ApiError> for ConsoleError {
    fn from(err: ApiError) -> Self {
        ConsoleError::Api(err)
    }
}

impl From<ViewError> for ConsoleError {
    fn from(err: ViewError) -> Self {
        ConsoleError::View(err)
    }
}
