//! # Play Command
//!
//! One terminal player against AI seats. The terminal answers for its own seat; every other
//! seat is played by the configured policy. Typing `q` (or closing stdin) abandons the hand in
//! progress with every bet returned, and the street log is saved on the way out.

use std::io::{BufRead, Write};
use std::path::Path;

use rivertable_engine::errors::GameError;
use rivertable_engine::logger::save_log;
use rivertable_engine::round::Round;

use super::{build_round, seat_bots};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{describe_event, format_request};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{ParseResult, parse_player_action};

/// Play up to `hands` hands as `human` (the first configured player by default).
pub fn handle_play_command(
    config: &Config,
    hands: u32,
    human: Option<&str>,
    save_jsonl: bool,
    stdin: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if hands == 0 {
        ui::write_error(err, "hands must be >= 1")?;
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }
    let human = match human.or(config.players.first().map(String::as_str)) {
        Some(name) if config.players.iter().any(|p| p == name) => name.to_string(),
        other => {
            let msg = format!(
                "{:?} is not seated (players: {})",
                other.unwrap_or_default(),
                config.players.join(", ")
            );
            ui::write_error(err, &msg)?;
            return Err(CliError::InvalidInput(msg));
        }
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    writeln!(
        out,
        "play: {} vs {} ({}) hands={} seed={}",
        human,
        config.players.len().saturating_sub(1),
        config.ai,
        hands,
        seed
    )?;
    writeln!(out, "Blinds: SB={} BB={}", config.small_blind, config.big_blind)?;

    let mut round = build_round(config, seed)?;
    let mut bots = seat_bots(config, seed, Some(&human))?;

    let mut played = 0u32;
    let mut quit_requested = false;

    for _ in 0..hands {
        if let Err(e) = round.start_hand() {
            match e {
                GameError::InsufficientBlind { .. } => {
                    writeln!(out, "Table closed: {}", e)?;
                    break;
                }
                other => return Err(other.into()),
            }
        }
        print_events(&mut round, &human, out)?;

        while let Some(request) = round.current_request() {
            let step = if let Some(action) = bots.decide(&request) {
                round.act_seat(request.seat, action)
            } else {
                writeln!(out, "{}", format_request(&request))?;
                write!(out, "{}> ", request.player)?;
                out.flush()?;
                let Some(line) = read_stdin_line(stdin) else {
                    quit_requested = true;
                    break;
                };
                match parse_player_action(&line) {
                    ParseResult::Action(action) => round.act_seat(request.seat, action),
                    ParseResult::Quit => {
                        quit_requested = true;
                        break;
                    }
                    ParseResult::Invalid(hint) => {
                        ui::write_error(err, &hint)?;
                        round.reject_input(request.seat, &line)
                    }
                }
            };
            print_events(&mut round, &human, out)?;
            step?;
        }

        if quit_requested {
            if round.is_hand_in_progress() {
                round.reset();
                print_events(&mut round, &human, out)?;
                writeln!(out, "Hand abandoned, bets returned.")?;
            }
            break;
        }
        played += 1;
        writeln!(out, "Balances: {}", balances(&round))?;
    }

    tracing::debug!(played, quit_requested, "play session finished");
    writeln!(out, "Hands played: {}", played)?;
    if !round.log().is_empty() {
        let path = save_log(round.log(), Path::new(&config.log_dir), save_jsonl)?;
        writeln!(out, "Log saved to {}", path.display())?;
    }
    Ok(())
}

fn print_events(round: &mut Round, human: &str, out: &mut dyn Write) -> std::io::Result<()> {
    for event in round.drain_events() {
        if let Some(line) = describe_event(&event, Some(human)) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn balances(round: &Round) -> String {
    round
        .state()
        .players()
        .iter()
        .map(|p| format!("{} {}", p.name(), p.balance()))
        .collect::<Vec<_>>()
        .join(", ")
}
