//! Error type for the CLI application.

use std::fmt;

use rivertable_engine::errors::GameError;

use crate::config::ConfigError;

/// Everything a command can fail with. Each variant maps to exit code 2.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (stdin reads, stdout writes, log export)
    Io(std::io::Error),

    /// Invalid command-line arguments
    InvalidInput(String),

    /// Configuration could not be loaded or failed validation
    Config(ConfigError),

    /// The round engine refused an operation
    Engine(GameError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Engine(e) => write!(f, "Engine error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_message() {
        let err = CliError::from(GameError::HandInProgress);
        assert_eq!(err.to_string(), "Engine error: a hand is already in progress");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_errors_are_prefixed() {
        let err = CliError::from(ConfigError::Invalid("bad seed".into()));
        assert_eq!(err.to_string(), "Configuration error: bad seed");
    }
}
