use crate::errors::ActionError;
use crate::player::PlayerAction as A;
use serde::{Deserialize, Serialize};

/// An action that passed validation, carrying the chips it commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatedAction {
    Fold,
    Check,
    Call { amount: u32 },
    Raise { by: u32, total: u32 },
}

impl ValidatedAction {
    /// Chips moved from the player's balance into the pot.
    pub fn committed(&self) -> u32 {
        match *self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call { amount } => amount,
            ValidatedAction::Raise { total, .. } => total,
        }
    }
}

/// Validates a player action against the player's balance and the amount owed.
///
/// There is no automatic all-in: a call or raise the balance cannot cover is rejected, and the
/// betting loop asks the player again.
///
/// # Examples
///
/// ```
/// use rivertable_engine::rules::{validate_action, ValidatedAction};
/// use rivertable_engine::player::PlayerAction;
/// use rivertable_engine::errors::ActionError;
///
/// assert_eq!(
///     validate_action(1000, 20, PlayerAction::Raise(40)),
///     Ok(ValidatedAction::Raise { by: 40, total: 60 })
/// );
/// assert_eq!(
///     validate_action(1000, 20, PlayerAction::Check),
///     Err(ActionError::CannotCheck { owed: 20 })
/// );
/// ```
pub fn validate_action(balance: u32, owed: u32, action: A) -> Result<ValidatedAction, ActionError> {
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if owed == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(ActionError::CannotCheck { owed })
            }
        }
        A::Call => {
            if balance >= owed {
                Ok(ValidatedAction::Call { amount: owed })
            } else {
                Err(ActionError::InsufficientChips {
                    needed: owed,
                    balance,
                })
            }
        }
        A::Raise(by) => {
            if by == 0 {
                return Err(ActionError::ZeroRaise);
            }
            let total = owed.checked_add(by).ok_or(ActionError::InsufficientChips {
                needed: u32::MAX,
                balance,
            })?;
            if balance >= total {
                Ok(ValidatedAction::Raise { by, total })
            } else {
                Err(ActionError::InsufficientChips {
                    needed: total,
                    balance,
                })
            }
        }
    }
}

/// Translates a chip amount placed through the control surface into an action:
/// exactly the owed amount checks or calls, anything above raises by the difference.
pub fn action_for_amount(owed: u32, amount: u32) -> Option<A> {
    match amount.cmp(&owed) {
        std::cmp::Ordering::Less => None,
        std::cmp::Ordering::Equal if owed == 0 => Some(A::Check),
        std::cmp::Ordering::Equal => Some(A::Call),
        std::cmp::Ordering::Greater => Some(A::Raise(amount - owed)),
    }
}
