//! Error types for the dispatcher and configuration.

use std::fmt;

/// Failure to build or send a request.
#[derive(Debug)]
pub enum DispatchError {
    InvalidUrl(url::ParseError),
    Transport(String),
    Config(ConfigError),
}

impl From<url::ParseError> for DispatchError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e)
    }
}

impl From<ConfigError> for DispatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(e) => write!(f, "invalid url: {}", e),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Config(e) => write!(f, "config error: {}", e),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Failure to read a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    InvalidUrl(url::ParseError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl From<url::ParseError> for ConfigError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Toml(e) => write!(f, "TOML error: {}", e),
            Self::InvalidUrl(e) => write!(f, "invalid page_url: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
