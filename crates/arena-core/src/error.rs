//! Error type returned by game collaborators.
//!
//! Games, game types, and the statistics collector report failures through
//! [`GameError`]. The tick pass never propagates these; it captures them
//! per unit of work (see [`crate::fault`]).

/// Errors a game collaborator can report during a tick pass.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The simulation itself failed to advance or reset.
    #[error("simulation error: {message}")]
    Simulation {
        /// Description of the failure.
        message: String,
    },

    /// A command could not be applied to the game.
    #[error("rejected command: {message}")]
    Command {
        /// Description of why the command was rejected.
        message: String,
    },

    /// A lock guarding shared game state was poisoned by an earlier panic.
    #[error("lock poisoned: {resource}")]
    LockPoisoned {
        /// The state the lock protects.
        resource: &'static str,
    },
}

impl GameError {
    /// Shorthand for a [`GameError::Simulation`] error.
    pub fn simulation(message: impl Into<String>) -> Self {
        Self::Simulation {
            message: message.into(),
        }
    }
}
