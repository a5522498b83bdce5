#![allow(dead_code)]

pub const CONFIG_VARS: &[&str] = &[
    "RIVERTABLE_CONFIG",
    "RIVERTABLE_SEED",
    "RIVERTABLE_SMALL_BLIND",
    "RIVERTABLE_BIG_BLIND",
    "RIVERTABLE_STARTING_BALANCE",
    "RIVERTABLE_PLAYERS",
    "RIVERTABLE_AI",
    "RIVERTABLE_EQUITY_ITERATIONS",
];

pub fn clear_config_env() {
    for var in CONFIG_VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

pub struct CliOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_cli(args: &[&str], input: &str) -> CliOutput {
    let mut argv = vec!["rivertable"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = rivertable_cli::run_with_input(argv, &mut input.as_bytes(), &mut out, &mut err);
    CliOutput {
        code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}
