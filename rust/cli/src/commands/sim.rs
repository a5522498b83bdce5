//! Simulation command: every seat is played by the configured AI.
//!
//! Prints a JSON report at the end. `--output` additionally records one hand summary per line
//! (JSONL) and `--save-log` exports the street log like `play` does.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rivertable_engine::errors::GameError;
use rivertable_engine::events::{RoundEvent, RoundObserver};
use rivertable_engine::logger::save_log;

use super::{build_round, seat_bots};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::format_summary;
use crate::ui;

/// Counts what happened across the simulated hands.
#[derive(Debug, Default)]
struct Tally {
    showdowns: u32,
    uncontested: u32,
    forced_folds: u32,
    undistributed: u32,
}

impl RoundObserver for Tally {
    fn on_event(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::PotAwarded {
                uncontested,
                undistributed,
                ..
            } => {
                if *uncontested {
                    self.uncontested += 1;
                } else {
                    self.showdowns += 1;
                }
                self.undistributed += undistributed;
            }
            RoundEvent::ForcedFold { .. } => self.forced_folds += 1,
            _ => {}
        }
    }
}

pub fn handle_sim_command(
    config: &Config,
    hands: u32,
    output: Option<&Path>,
    save_street_log: bool,
    verbose: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if hands == 0 {
        ui::write_error(err, "hands must be >= 1")?;
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut round = build_round(config, seed)?;
    let mut bots = seat_bots(config, seed, None)?;
    let mut tally = Tally::default();
    let mut writer = match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Some(BufWriter::new(File::create(path)?))
        }
        None => None,
    };

    let mut played = 0u32;
    let mut stopped = None;
    for _ in 0..hands {
        match round.play_round(&mut bots, &mut tally) {
            Ok(summary) => {
                played += 1;
                if verbose {
                    writeln!(out, "{}", format_summary(&summary))?;
                }
                if let Some(w) = writer.as_mut() {
                    let line = serde_json::to_string(&summary).map_err(std::io::Error::other)?;
                    writeln!(w, "{}", line)?;
                }
            }
            Err(e @ GameError::InsufficientBlind { .. }) => {
                ui::display_warning(err, &format!("stopping early: {}", e))?;
                stopped = Some(e.to_string());
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if let Some(mut w) = writer {
        w.flush()?;
    }
    tracing::info!(played, seed, undistributed = tally.undistributed, "simulation finished");

    let balances: serde_json::Map<String, serde_json::Value> = round
        .state()
        .players()
        .iter()
        .map(|p| (p.name().to_string(), p.balance().into()))
        .collect();
    let report = serde_json::json!({
        "hands": played,
        "seed": seed,
        "ai": config.ai,
        "showdowns": tally.showdowns,
        "uncontested": tally.uncontested,
        "forced_folds": tally.forced_folds,
        "undistributed": tally.undistributed,
        "stopped": stopped,
        "balances": balances,
    });
    let json_str = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;

    if save_street_log && !round.log().is_empty() {
        let path = save_log(round.log(), Path::new(&config.log_dir), false)?;
        writeln!(err, "Log saved to {}", path.display())?;
    }
    Ok(())
}
