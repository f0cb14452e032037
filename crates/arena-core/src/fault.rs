//! Fault isolation for units of tick work.
//!
//! Every unit of work in a tick pass runs through [`isolate`]: one
//! binding's input delivery, the statistics tick, one reset, one game
//! advance, one type-level tick, and each teardown step of an unbind.
//! Whatever the unit does -- return an error or panic -- the outcome comes
//! back as a plain [`UnitOutcome`] value and the pass moves on to the next
//! unit.
//!
//! [`execute`] is the fire-and-forget form: it isolates the unit, logs any
//! failure at `warn`, and discards it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// One unit of work inside a tick pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickUnit {
    /// Delivering a binding's queued commands to its game.
    Binding {
        /// Owner of the binding.
        player: String,
    },
    /// Advancing the statistics collector.
    Statistics,
    /// Checking a binding's game for game over and resetting it if so.
    Reset {
        /// Owner of the binding.
        player: String,
    },
    /// Advancing one game instance.
    Game {
        /// Owner of the advanced instance.
        player: String,
    },
    /// A game type's own type-level step.
    GameType {
        /// Name of the game type.
        name: String,
    },
    /// Telling the statistics collector to stop tracking an unbound player.
    Forget {
        /// The unbound player.
        player: String,
    },
    /// Closing an unbound player's game.
    Close {
        /// The unbound player.
        player: String,
    },
    /// Running the removal hook for an unbound player.
    RemoveHook {
        /// The unbound player.
        player: String,
    },
}

impl fmt::Display for TickUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding { player } => write!(f, "binding({player})"),
            Self::Statistics => f.write_str("statistics"),
            Self::Reset { player } => write!(f, "reset({player})"),
            Self::Game { player } => write!(f, "game({player})"),
            Self::GameType { name } => write!(f, "game_type({name})"),
            Self::Forget { player } => write!(f, "forget({player})"),
            Self::Close { player } => write!(f, "close({player})"),
            Self::RemoveHook { player } => write!(f, "remove_hook({player})"),
        }
    }
}

/// Why a unit of work failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitFailure {
    /// The unit returned an error.
    #[error("failed: {message}")]
    Failed {
        /// Rendered error.
        message: String,
    },

    /// The unit panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
}

/// Result of running one isolated unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    /// Which unit ran.
    pub unit: TickUnit,
    /// What happened.
    pub result: Result<(), UnitFailure>,
}

impl UnitOutcome {
    /// Whether the unit completed without error.
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Log the outcome at `warn` if it failed.
    pub fn log_failure(&self) {
        if let Err(failure) = &self.result {
            warn!(unit = %self.unit, error = %failure, "Tick unit failed");
        }
    }
}

/// Run `action` and capture any error or panic as a [`UnitOutcome`].
///
/// Never panics and never returns the action's error to the caller.
pub fn isolate<F, E>(unit: TickUnit, action: F) -> UnitOutcome
where
    F: FnOnce() -> Result<(), E>,
    E: fmt::Display,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(action)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(UnitFailure::Failed {
            message: err.to_string(),
        }),
        Err(payload) => Err(UnitFailure::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    };
    UnitOutcome { unit, result }
}

/// Run `action`, logging and discarding any failure.
pub fn execute<F, E>(unit: TickUnit, action: F)
where
    F: FnOnce() -> Result<(), E>,
    E: fmt::Display,
{
    isolate(unit, action).log_failure();
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("non-string panic payload")
    }
}
