//! # rivertable CLI
//!
//! Terminal front end for the rivertable round engine.
//!
//! ## Subcommands
//!
//! - `play`: play hands at the terminal against AI seats; the street log is saved on exit
//! - `sim`: let AI policies play each other and report the outcome
//! - `cfg`: show the resolved configuration and where every value came from
//!
//! Configuration is resolved from built-in defaults, then the TOML file named by
//! `RIVERTABLE_CONFIG`, then `RIVERTABLE_*` environment variables, then command-line flags.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["rivertable", "sim", "--hands", "10", "--seed", "7"];
//! let code = rivertable_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod ui;
pub mod validation;

use commands::{handle_cfg_command, handle_play_command, handle_sim_command};
use config::{Config, ValueSource};
pub use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "rivertable", version, about = "Texas Hold'em at the terminal")]
pub struct RivertableCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Flags shared by the commands that seat a table.
#[derive(Debug, Clone, clap::Args)]
pub struct TableArgs {
    /// RNG seed for shuffles and AI decisions
    #[arg(long)]
    pub seed: Option<u64>,
    /// AI policy for the computer seats
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(rivertable_ai::AI_KINDS))]
    pub ai: Option<String>,
    /// Comma-separated seat names in seating order
    #[arg(long, value_delimiter = ',')]
    pub players: Option<Vec<String>>,
    #[arg(long)]
    pub small_blind: Option<u32>,
    #[arg(long)]
    pub big_blind: Option<u32>,
    #[arg(long)]
    pub starting_balance: Option<u32>,
    /// Directory for exported street logs
    #[arg(long)]
    pub log_dir: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play hands at the terminal against AI seats
    Play {
        #[arg(long, default_value_t = 1)]
        hands: u32,
        /// Seat controlled from the terminal (defaults to the first player)
        #[arg(long)]
        name: Option<String>,
        /// Also write the street log as JSON lines
        #[arg(long)]
        jsonl: bool,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Let AI seats play each other
    Sim {
        #[arg(long)]
        hands: u32,
        /// Write one hand summary per line to this file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Export the street log to the log directory
        #[arg(long)]
        save_log: bool,
        /// Print a line per hand
        #[arg(long)]
        verbose: bool,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Show the resolved configuration
    Cfg,
}

const COMMANDS: &[&str] = &["play", "sim", "cfg"];

/// Installs a stderr `tracing` subscriber honouring `RUST_LOG` (warnings only by default).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // a second call in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs the CLI reading player input from the process stdin.
///
/// Returns the exit code: [`exit_code::SUCCESS`] or [`exit_code::ERROR`].
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    run_with_input(args, &mut input, out, err)
}

/// Same as [`run`] with an explicit input stream for the `play` prompt.
pub fn run_with_input<I, S>(
    args: I,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match RivertableCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play {
            hands,
            name,
            jsonl,
            table,
        } => resolve_config(&table).and_then(|config| {
            handle_play_command(&config, hands, name.as_deref(), jsonl, input, out, err)
        }),
        Commands::Sim {
            hands,
            output,
            save_log,
            verbose,
            table,
        } => resolve_config(&table).and_then(|config| {
            handle_sim_command(
                &config,
                hands,
                output.as_deref(),
                save_log,
                verbose,
                out,
                err,
            )
        }),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let _ = writeln!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

fn report_usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // help and version go to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }
    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Usage: rivertable <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: rivertable --help");
    exit_code::ERROR
}

/// Layers command-line flags over the file and environment configuration.
fn resolve_config(args: &TableArgs) -> Result<Config, CliError> {
    let mut resolved = config::load_with_sources()?;
    let cfg = &mut resolved.config;
    let sources = &mut resolved.sources;

    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
        sources.seed = ValueSource::Cli;
    }
    if let Some(ai) = &args.ai {
        cfg.ai = ai.clone();
        sources.ai = ValueSource::Cli;
    }
    if let Some(players) = &args.players {
        cfg.players = players.iter().map(|p| p.trim().to_string()).collect();
        sources.players = ValueSource::Cli;
    }
    if let Some(v) = args.small_blind {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Cli;
    }
    if let Some(v) = args.big_blind {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Cli;
    }
    if let Some(v) = args.starting_balance {
        cfg.starting_balance = v;
        sources.starting_balance = ValueSource::Cli;
    }
    if let Some(dir) = &args.log_dir {
        cfg.log_dir = dir.clone();
        sources.log_dir = ValueSource::Cli;
    }
    config::validate(cfg)?;
    tracing::debug!(config = ?cfg, "configuration resolved");
    Ok(resolved.config)
}
