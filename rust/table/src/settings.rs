use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use rivertable_ai::AI_KINDS;
use rivertable_engine::round::{RoundConfig, DEFAULT_MAX_INVALID_ACTIONS};
use rivertable_engine::state::MAX_PLAYERS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the table service needs to seat players and drive hands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableSettings {
    /// Seat order; the first hand's small blind sits in seat 0
    pub players: Vec<String>,
    pub starting_balance: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub seed: Option<u64>,
    /// Period of the background driver that starts the next hand; 0 disables it
    pub round_interval_ms: u64,
    /// How long a human seat may take before it is folded
    pub turn_timeout_ms: u64,
    pub max_invalid_actions: Option<u32>,
    pub equity_iterations: u32,
    /// Player name to policy name (`baseline`, `passive`, `random`)
    pub bots: BTreeMap<String, String>,
    /// Where the round log is written on shutdown; nothing is written when unset
    pub log_dir: Option<PathBuf>,
    pub save_jsonl: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        let players: Vec<String> = ["Alice", "Bob", "Charlie", "Diana"]
            .into_iter()
            .map(String::from)
            .collect();
        let bots = players[1..]
            .iter()
            .map(|name| (name.clone(), "baseline".to_string()))
            .collect();
        Self {
            players,
            starting_balance: 1000,
            small_blind: 10,
            big_blind: 20,
            seed: None,
            round_interval_ms: 5_000,
            turn_timeout_ms: 30_000,
            max_invalid_actions: Some(DEFAULT_MAX_INVALID_ACTIONS),
            equity_iterations: 2_000,
            bots,
            log_dir: None,
            save_jsonl: false,
        }
    }
}

impl TableSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.players.len() < 2 || self.players.len() > MAX_PLAYERS {
            return Err(SettingsError::InvalidValue(format!(
                "players must seat between 2 and {}, got {}",
                MAX_PLAYERS,
                self.players.len()
            )));
        }
        if self.players.iter().any(|p| p.trim().is_empty()) {
            return Err(SettingsError::InvalidValue(
                "player names cannot be empty".to_string(),
            ));
        }
        if self.small_blind == 0 || self.small_blind > self.big_blind {
            return Err(SettingsError::InvalidValue(format!(
                "blinds must satisfy 0 < small <= big, got {}/{}",
                self.small_blind, self.big_blind
            )));
        }
        if self.starting_balance < self.big_blind {
            return Err(SettingsError::InvalidValue(
                "starting_balance must cover the big blind".to_string(),
            ));
        }
        if self.turn_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "turn_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.equity_iterations == 0 {
            return Err(SettingsError::InvalidValue(
                "equity_iterations must be greater than 0".to_string(),
            ));
        }
        for (player, kind) in &self.bots {
            if !self.players.contains(player) {
                return Err(SettingsError::InvalidValue(format!(
                    "bot seat {} is not a player",
                    player
                )));
            }
            if !AI_KINDS.contains(&kind.as_str()) {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown bot policy {} for {}",
                    kind, player
                )));
            }
        }
        Ok(())
    }

    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            seed: self.seed,
            max_invalid_actions: self.max_invalid_actions,
        }
    }

    pub fn round_interval(&self) -> Option<Duration> {
        (self.round_interval_ms > 0).then(|| Duration::from_millis(self.round_interval_ms))
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)
            .map_err(|e| SettingsError::InvalidValue(format!("malformed settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
