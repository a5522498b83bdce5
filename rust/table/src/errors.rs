//! Error types for the table service and their machine-readable form.

use std::fmt;

use rivertable_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("the table service has stopped")]
    ServiceStopped,
    #[error("failed to write round log: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether an error is the caller's fault or the service's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Client,
    Server,
}

impl TableError {
    /// Stable code for callers that match on errors.
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Game(err) => match err {
                GameError::InsufficientBlind { .. } => "insufficient_blind",
                GameError::DeckExhausted => "deck_exhausted",
                GameError::PlayerNotFound(_) => "player_not_found",
                GameError::InvalidAmount { .. } => "invalid_amount",
                GameError::RoundResolved => "round_resolved",
                GameError::HandInProgress => "hand_in_progress",
                GameError::NotPlayersTurn { .. } => "not_players_turn",
                GameError::PlayerAlreadyFolded(_) => "player_already_folded",
                GameError::NotEnoughPlayers(_) => "not_enough_players",
                GameError::TooManyPlayers { .. } => "too_many_players",
                GameError::DuplicatePlayer(_) => "duplicate_player",
                GameError::InvalidBlinds { .. } => "invalid_blinds",
                GameError::HoleCardsFull(_) => "hole_cards_full",
                GameError::ActionCancelled { .. } => "action_cancelled",
            },
            TableError::Settings(_) => "invalid_settings",
            TableError::ServiceStopped => "service_stopped",
            TableError::Io(_) => "log_write_failed",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TableError::Game(GameError::DeckExhausted)
            | TableError::Game(GameError::HoleCardsFull(_))
            | TableError::ServiceStopped
            | TableError::Io(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }

    /// Logs at a level matching the severity.
    pub(crate) fn log(&self, operation: &'static str) {
        match self.severity() {
            ErrorSeverity::Client => {
                tracing::debug!(operation, code = self.code(), error = %self, "command rejected")
            }
            ErrorSeverity::Server => {
                tracing::error!(operation, code = self.code(), error = %self, "command failed")
            }
        }
    }
}

/// Serializable error body handed to callers outside the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "player_not_found")
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}
