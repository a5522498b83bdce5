use serde::{Deserialize, Serialize};
use std::fs;

use rivertable_ai::AI_KINDS;
use rivertable_engine::round::RoundConfig;
use rivertable_engine::state::MAX_PLAYERS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub players: Vec<String>,
    pub starting_balance: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub seed: Option<u64>,
    /// Policy used for every seat the terminal does not control
    pub ai: String,
    pub equity_iterations: u32,
    pub log_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub players: ValueSource,
    pub starting_balance: ValueSource,
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub seed: ValueSource,
    pub ai: ValueSource,
    pub equity_iterations: ValueSource,
    pub log_dir: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            players: ValueSource::Default,
            starting_balance: ValueSource::Default,
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            seed: ValueSource::Default,
            ai: ValueSource::Default,
            equity_iterations: ValueSource::Default,
            log_dir: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: ["Alice", "Bob", "Charlie", "Diana"]
                .into_iter()
                .map(String::from)
                .collect(),
            starting_balance: 1000,
            small_blind: 10,
            big_blind: 20,
            seed: None,
            ai: "baseline".into(),
            equity_iterations: 1000,
            log_dir: "logs".into(),
        }
    }
}

impl Config {
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            seed: self.seed,
            ..RoundConfig::new(self.small_blind, self.big_blind)
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Resolves defaults, then `RIVERTABLE_CONFIG` (TOML), then `RIVERTABLE_*` variables.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("RIVERTABLE_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.players {
            cfg.players = v;
            sources.players = ValueSource::File;
        }
        if let Some(v) = f.starting_balance {
            cfg.starting_balance = v;
            sources.starting_balance = ValueSource::File;
        }
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.ai {
            cfg.ai = v;
            sources.ai = ValueSource::File;
        }
        if let Some(v) = f.equity_iterations {
            cfg.equity_iterations = v;
            sources.equity_iterations = ValueSource::File;
        }
        if let Some(v) = f.log_dir {
            cfg.log_dir = v;
            sources.log_dir = ValueSource::File;
        }
    }

    if let Some(seed) = env_value("RIVERTABLE_SEED") {
        cfg.seed = Some(parse_number(&seed, "seed")?);
        sources.seed = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_SMALL_BLIND") {
        cfg.small_blind = parse_number(&v, "small blind")?;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_BIG_BLIND") {
        cfg.big_blind = parse_number(&v, "big blind")?;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_STARTING_BALANCE") {
        cfg.starting_balance = parse_number(&v, "starting balance")?;
        sources.starting_balance = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_PLAYERS") {
        cfg.players = v.split(',').map(|name| name.trim().to_string()).collect();
        sources.players = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_AI") {
        cfg.ai = v;
        sources.ai = ValueSource::Env;
    }
    if let Some(v) = env_value("RIVERTABLE_EQUITY_ITERATIONS") {
        cfg.equity_iterations = parse_number(&v, "equity iterations")?;
        sources.equity_iterations = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    players: Option<Vec<String>>,
    #[serde(default)]
    starting_balance: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    ai: Option<String>,
    #[serde(default)]
    equity_iterations: Option<u32>,
    #[serde(default)]
    log_dir: Option<String>,
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {:?}", what, raw)))
}

/// Checks a resolved configuration, including values overridden on the command line.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::Invalid(format!("Invalid configuration: {}", msg)));

    if cfg.players.len() < 2 || cfg.players.len() > MAX_PLAYERS {
        return invalid(format!(
            "between 2 and {} players are required, got {}",
            MAX_PLAYERS,
            cfg.players.len()
        ));
    }
    if cfg.players.iter().any(|name| name.trim().is_empty()) {
        return invalid("player names must not be empty".into());
    }
    if cfg.small_blind == 0 || cfg.small_blind > cfg.big_blind {
        return invalid(format!(
            "blinds must satisfy 0 < small <= big, got {}/{}",
            cfg.small_blind, cfg.big_blind
        ));
    }
    if cfg.starting_balance < cfg.big_blind {
        return invalid("starting_balance must cover the big blind".into());
    }
    if cfg.equity_iterations == 0 {
        return invalid("equity_iterations must be >0".into());
    }
    if !AI_KINDS.contains(&cfg.ai.as_str()) {
        return invalid(format!(
            "unknown ai {:?} (expected one of {})",
            cfg.ai,
            AI_KINDS.join(", ")
        ));
    }
    Ok(())
}
