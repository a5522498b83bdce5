//! `cfg`: prints the resolved configuration with the source of every value.
//!
//! ```json
//! {
//!   "small_blind": { "value": 10, "source": "default" },
//!   "seed": { "value": 42, "source": "env" },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(e));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "players": { "value": config.players, "source": sources.players },
        "starting_balance": {
            "value": config.starting_balance,
            "source": sources.starting_balance,
        },
        "small_blind": { "value": config.small_blind, "source": sources.small_blind },
        "big_blind": { "value": config.big_blind, "source": sources.big_blind },
        "seed": { "value": config.seed, "source": sources.seed },
        "ai": { "value": config.ai, "source": sources.ai },
        "equity_iterations": {
            "value": config.equity_iterations,
            "source": sources.equity_iterations,
        },
        "log_dir": { "value": config.log_dir, "source": sources.log_dir },
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
