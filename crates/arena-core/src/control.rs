//! Telemetry-wrapped control channel.
//!
//! Each binding owns one [`ControlChannel`]. The transport layer receives
//! it through the add-player hook and pushes commands into it whenever a
//! client sends input. Commands are buffered until the binding's next tick,
//! which drains them into the game and reports each one to the player's
//! [`PlayerSpy`].
//!
//! The channel is built eagerly when the binding is created and holds the
//! spy for its whole lifetime.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use arena_types::Command;
use tracing::warn;

use crate::error::GameError;
use crate::game::Game;
use crate::statistics::PlayerSpy;

/// Deferred input sink for one binding.
pub struct ControlChannel {
    /// Player the channel belongs to, for diagnostics.
    player: String,
    /// Commands received since the last delivery.
    pending: Mutex<VecDeque<Command>>,
    /// Telemetry handle notified for every delivered command.
    spy: Arc<dyn PlayerSpy>,
}

impl ControlChannel {
    /// Create a channel that reports delivered commands to `spy`.
    pub fn new(player: impl Into<String>, spy: Arc<dyn PlayerSpy>) -> Self {
        Self {
            player: player.into(),
            pending: Mutex::new(VecDeque::new()),
            spy,
        }
    }

    /// Queue a command for delivery on the next tick.
    pub fn send(&self, command: Command) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(command),
            Err(_poisoned) => {
                warn!(player = %self.player, ?command, "Control channel poisoned, command dropped");
            }
        }
    }

    /// Queue [`Command::Up`].
    pub fn up(&self) {
        self.send(Command::Up);
    }

    /// Queue [`Command::Down`].
    pub fn down(&self) {
        self.send(Command::Down);
    }

    /// Queue [`Command::Left`].
    pub fn left(&self) {
        self.send(Command::Left);
    }

    /// Queue [`Command::Right`].
    pub fn right(&self) {
        self.send(Command::Right);
    }

    /// Queue [`Command::Act`] with the given parameters.
    pub fn act(&self, params: Vec<i32>) {
        self.send(Command::Act(params));
    }

    /// Queue [`Command::Message`].
    pub fn message(&self, text: impl Into<String>) {
        self.send(Command::Message(text.into()));
    }

    /// Number of commands waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.pending.lock().map_or(0, |pending| pending.len())
    }

    /// Deliver every queued command to `game` in arrival order.
    ///
    /// Each command is recorded on the spy before it is applied. Delivery
    /// stops at the first command the game rejects; the rest of that batch
    /// is discarded.
    pub(crate) fn deliver(&self, game: &mut dyn Game) -> Result<usize, GameError> {
        let batch: Vec<Command> = {
            let mut pending = self.pending.lock().map_err(|_poisoned| {
                GameError::LockPoisoned {
                    resource: "control channel",
                }
            })?;
            pending.drain(..).collect()
        };

        let mut delivered: usize = 0;
        for command in &batch {
            self.spy.act();
            game.apply(command)?;
            delivered = delivered.saturating_add(1);
        }
        Ok(delivered)
    }
}

impl fmt::Debug for ControlChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlChannel")
            .field("player", &self.player)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
