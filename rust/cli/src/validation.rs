//! Parsing of terminal input into player actions.

use rivertable_engine::player::PlayerAction;

/// Outcome of parsing one line typed at the action prompt.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    /// Valid player action parsed from input
    Action(PlayerAction),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with a hint for the user
    Invalid(String),
}

/// Parse user input into a [`PlayerAction`] or the quit command.
///
/// Accepts (case-insensitive) `fold`/`f`, `check`/`k`, `call`/`c`, `raise <n>`/`r <n>`
/// and `q`/`quit`.
///
/// ```rust
/// # use rivertable_cli::validation::{parse_player_action, ParseResult};
/// use rivertable_engine::player::PlayerAction;
///
/// assert_eq!(parse_player_action("fold"), ParseResult::Action(PlayerAction::Fold));
/// assert_eq!(parse_player_action("r 40"), ParseResult::Action(PlayerAction::Raise(40)));
/// assert_eq!(parse_player_action("q"), ParseResult::Quit);
///
/// match parse_player_action("shove") {
///     ParseResult::Invalid(msg) => assert!(msg.contains("Unrecognized")),
///     _ => panic!("Expected Invalid"),
/// }
/// ```
pub fn parse_player_action(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some(&first) = parts.first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };
    if first == "q" || first == "quit" {
        return ParseResult::Quit;
    }

    match (first, parts.get(1)) {
        ("f", None) => ParseResult::Action(PlayerAction::Fold),
        ("k", None) => ParseResult::Action(PlayerAction::Check),
        ("c", None) => ParseResult::Action(PlayerAction::Call),
        ("raise" | "r", None) => {
            ParseResult::Invalid("Raise requires an amount (e.g., 'raise 40')".to_string())
        }
        ("raise" | "r", Some(amount)) => match amount.parse::<u32>() {
            Ok(0) => ParseResult::Invalid("Raise amount must be positive".to_string()),
            Ok(amount) if parts.len() == 2 => ParseResult::Action(PlayerAction::Raise(amount)),
            _ => ParseResult::Invalid("Invalid raise amount".to_string()),
        },
        _ => match input.parse::<PlayerAction>() {
            Ok(action) => ParseResult::Action(action),
            Err(_) => ParseResult::Invalid(format!(
                "Unrecognized action '{}'. Valid actions: fold, check, call, raise <amount>, q",
                first
            )),
        },
    }
}
