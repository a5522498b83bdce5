use thiserror::Error;

use crate::logger::Street;

/// Errors surfaced by the round engine and its control surface.
///
/// Rule violations made by the acting player are not `GameError`s: the betting loop
/// reports them as [`ActionError`] and asks the same player again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("{player} cannot post the {blind} of {amount} with a balance of {balance}")]
    InsufficientBlind {
        player: String,
        blind: &'static str,
        amount: u32,
        balance: u32,
    },
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("player not found: {0}")]
    PlayerNotFound(String),
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: u32, reason: String },
    #[error("round already resolved")]
    RoundResolved,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotPlayersTurn { expected: String, actual: String },
    #[error("{0} has already folded")]
    PlayerAlreadyFolded(String),
    #[error("at least two players are required, got {0}")]
    NotEnoughPlayers(usize),
    #[error("at most {max} players can be seated, got {count}")]
    TooManyPlayers { count: usize, max: usize },
    #[error("duplicate player name: {0}")]
    DuplicatePlayer(String),
    #[error("invalid blinds: small {small}, big {big}")]
    InvalidBlinds { small: u32, big: u32 },
    #[error("{0} already holds two hole cards")]
    HoleCardsFull(String),
    #[error("action source cancelled during {street:?}: {reason}")]
    ActionCancelled { street: Street, reason: String },
}

/// A rule violation by the acting player. Recoverable: the player is prompted again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("cannot check while owing {owed}")]
    CannotCheck { owed: u32 },
    #[error("needs {needed} chips but only has {balance}")]
    InsufficientChips { needed: u32, balance: u32 },
    #[error("raise amount must be greater than zero")]
    ZeroRaise,
    #[error("unrecognised action: {0:?}")]
    Unrecognised(String),
}
