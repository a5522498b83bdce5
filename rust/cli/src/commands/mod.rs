//! Command handlers for the `rivertable` CLI.
//!
//! Each handler takes its output streams as `&mut dyn Write` and returns `Result<(), CliError>`;
//! [`crate::run`] turns the result into an exit code.

mod cfg;
mod play;
mod sim;

pub use cfg::handle_cfg_command;
pub use play::handle_play_command;
pub use sim::handle_sim_command;

use rivertable_ai::{BotSeats, create_ai_seeded};
use rivertable_engine::equity::MonteCarloEquity;
use rivertable_engine::round::{Round, RoundConfig};

use crate::config::Config;
use crate::error::CliError;

/// Seats the configured players. Shuffles and equity sampling both derive from `seed`.
pub(crate) fn build_round(config: &Config, seed: u64) -> Result<Round, CliError> {
    let round_config = RoundConfig {
        seed: Some(seed),
        ..config.round_config()
    };
    let round = Round::with_players(
        config.players.iter().cloned(),
        config.starting_balance,
        round_config,
    )?
    .with_equity(MonteCarloEquity::new(config.equity_iterations).with_seed(seed));
    Ok(round)
}

/// One `config.ai` policy per seat except `human`.
pub(crate) fn seat_bots(
    config: &Config,
    seed: u64,
    human: Option<&str>,
) -> Result<BotSeats, CliError> {
    let mut bots = BotSeats::new();
    for (i, name) in config.players.iter().enumerate() {
        if Some(name.as_str()) == human {
            continue;
        }
        let policy = create_ai_seeded(&config.ai, seed.wrapping_add(i as u64))
            .ok_or_else(|| CliError::InvalidInput(format!("unknown ai {:?}", config.ai)))?;
        bots.seat(name.clone(), policy);
    }
    Ok(bots)
}
