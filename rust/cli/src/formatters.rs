//! Card, action and event formatters for terminal display.
//!
//! Suits render as Unicode symbols (♥ ♦ ♣ ♠) where the terminal supports them and as
//! letters (h d c s) otherwise.
//!
//! ```rust
//! use rivertable_engine::cards::{Card, Rank, Suit};
//! use rivertable_cli::formatters::{format_board, format_card};
//!
//! let ace_spades = Card::new(Rank::Ace, Suit::Spades);
//! assert!(format_card(&ace_spades) == "A♠" || format_card(&ace_spades) == "As");
//! assert!(format_board(&[ace_spades]).starts_with("[A"));
//! ```

use rivertable_engine::betting::ActionRequest;
use rivertable_engine::cards::Card;
use rivertable_engine::events::{ForcedFoldReason, RoundEvent};
use rivertable_engine::round::HandSummary;
use rivertable_engine::rules::ValidatedAction;

/// Windows consoles only render suit symbols in modern terminals.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

pub fn format_card(card: &Card) -> String {
    if supports_unicode() {
        card.to_string()
    } else {
        card.abbreviation()
    }
}

/// Cards in brackets, e.g. `[A♠ 7♦ 2♣]`.
pub fn format_board(cards: &[Card]) -> String {
    let cards: Vec<String> = cards.iter().map(format_card).collect();
    format!("[{}]", cards.join(" "))
}

pub fn format_action(action: &ValidatedAction) -> String {
    match action {
        ValidatedAction::Fold => "folds".to_string(),
        ValidatedAction::Check => "checks".to_string(),
        ValidatedAction::Call { amount } => format!("calls {}", amount),
        ValidatedAction::Raise { by, total } => format!("raises by {} (puts in {})", by, total),
    }
}

/// One display line for an engine event. Hole cards are only shown for `viewer`.
pub fn describe_event(event: &RoundEvent, viewer: Option<&str>) -> Option<String> {
    let line = match event {
        RoundEvent::HandStarted {
            hand,
            small_blind_player,
            big_blind_player,
        } => format!(
            "Hand {}: {} posts the small blind, {} the big blind",
            hand, small_blind_player, big_blind_player
        ),
        RoundEvent::BlindPosted { player, amount } => format!("{} posts {}", player, amount),
        RoundEvent::HoleCardsDealt { player, cards } => {
            if viewer != Some(player.as_str()) {
                return None;
            }
            format!("Your cards: {}", format_board(cards))
        }
        RoundEvent::CommunityDealt { street, cards } => {
            format!("{}: {}", street, format_board(cards))
        }
        RoundEvent::StreetStarted { .. } => return None,
        RoundEvent::ActionApplied {
            player,
            action,
            pot,
            ..
        } => format!("{} {} (pot {})", player, format_action(action), pot),
        RoundEvent::ActionRejected {
            player,
            reason,
            attempts,
        } => format!("{}: {} (attempt {})", player, reason, attempts),
        RoundEvent::ForcedFold { player, reason } => match reason {
            ForcedFoldReason::Timeout => format!("{} ran out of time and folds", player),
            ForcedFoldReason::TooManyInvalidActions => {
                format!("{} is folded after too many invalid actions", player)
            }
        },
        RoundEvent::StreetCompleted { street, pot } => format!("{} complete, pot {}", street, pot),
        RoundEvent::PotAwarded {
            winners,
            share,
            undistributed,
            uncontested,
        } => {
            if winners.is_empty() {
                return Some(format!("No winner, {} chips left undistributed", undistributed));
            }
            let mut line = if winners.len() > 1 {
                format!("{} win {} each", winners.join(" and "), share)
            } else {
                format!("{} wins {}", winners.join(" and "), share)
            };
            if *uncontested {
                line.push_str(" uncontested");
            }
            if *undistributed > 0 {
                line.push_str(&format!(" ({} chips left undistributed)", undistributed));
            }
            line
        }
        RoundEvent::HandReset { .. } => return None,
    };
    Some(line)
}

/// The prompt shown when the terminal player must act.
pub fn format_request(request: &ActionRequest) -> String {
    let to_act = if request.owed == 0 {
        "check, raise <n> or fold".to_string()
    } else {
        format!("call {}, raise <n> or fold", request.owed)
    };
    format!(
        "{} {} board {} pot {} stack {} win {:.0}% | {}",
        request.street,
        format_board(&request.hole_cards),
        format_board(&request.community),
        request.pot,
        request.balance,
        request.win_prob,
        to_act
    )
}

/// Compact one-line result used by `sim`.
pub fn format_summary(summary: &HandSummary) -> String {
    format!(
        "hand {} ended on the {}: pot {} to {}{}",
        summary.hand,
        summary.last_street,
        summary.pot,
        summary.winners.join(", "),
        if summary.uncontested { " (uncontested)" } else { "" }
    )
}
