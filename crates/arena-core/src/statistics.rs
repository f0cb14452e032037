//! Per-player activity telemetry.
//!
//! The registry asks the [`Statistics`] collector for a [`PlayerSpy`] when a
//! player is bound. The player's control channel reports every delivered
//! command to that spy, and the tick pass advances the collector once per
//! pass so it can count idle ticks.
//!
//! [`ActivityStatistics`] is the in-memory collector the engine uses. It
//! never performs I/O, so advancing it cannot block a tick pass.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::GameError;
use crate::game::Player;

/// Process-wide telemetry collector.
pub trait Statistics: Send + Sync {
    /// Start tracking `player` and return its telemetry handle.
    fn new_player(&self, player: &Player) -> Arc<dyn PlayerSpy>;

    /// Stop tracking the named player.
    fn remove_player(&self, _name: &str) {}

    /// Advance the collector by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the collector's state is unusable.
    fn tick(&self) -> Result<(), GameError>;

    /// Names of players that have been idle for at least `ticks` ticks,
    /// in the order they were first tracked.
    fn players_idle_for(&self, ticks: u64) -> Vec<String>;
}

/// Telemetry handle for a single player.
pub trait PlayerSpy: Send + Sync {
    /// Record that the player sent a command this tick.
    fn act(&self);
}

/// What the collector knows about one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerActivity {
    /// When the player was first tracked.
    pub joined_at: DateTime<Utc>,
    /// When the player last sent a command.
    pub last_active_at: Option<DateTime<Utc>>,
    /// Consecutive completed ticks without a command.
    pub idle_ticks: u64,
    /// Total commands recorded.
    pub commands: u64,
    /// Whether a command arrived since the last collector tick.
    acted_this_tick: bool,
}

impl PlayerActivity {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            joined_at: now,
            last_active_at: None,
            idle_ticks: 0,
            commands: 0,
            acted_this_tick: false,
        }
    }
}

/// Mutable collector state held inside the mutex.
#[derive(Debug, Default)]
struct ActivityInner {
    /// Collector ticks completed.
    ticks: u64,
    /// Tracking order, used to keep idle queries deterministic.
    order: Vec<String>,
    /// Activity per player name.
    players: BTreeMap<String, PlayerActivity>,
}

/// In-memory [`Statistics`] implementation.
///
/// Safe to share via `Arc<ActivityStatistics>`.
#[derive(Debug, Default)]
pub struct ActivityStatistics {
    inner: Arc<Mutex<ActivityInner>>,
}

impl ActivityStatistics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector ticks completed so far.
    pub fn ticks(&self) -> u64 {
        let Ok(inner) = self.inner.lock() else {
            return 0;
        };
        inner.ticks
    }

    /// Activity record for the named player, if tracked.
    pub fn activity(&self, name: &str) -> Option<PlayerActivity> {
        let Ok(inner) = self.inner.lock() else {
            return None;
        };
        inner.players.get(name).cloned()
    }

    /// Number of players being tracked.
    pub fn tracked(&self) -> usize {
        let Ok(inner) = self.inner.lock() else {
            return 0;
        };
        inner.players.len()
    }
}

impl Statistics for ActivityStatistics {
    fn new_player(&self, player: &Player) -> Arc<dyn PlayerSpy> {
        if let Ok(mut inner) = self.inner.lock() {
            let name = player.name().to_owned();
            if !inner.players.contains_key(&name) {
                inner.order.push(name.clone());
            }
            inner.players.insert(name, PlayerActivity::new(Utc::now()));
        }
        Arc::new(ActivitySpy {
            name: player.name().to_owned(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn remove_player(&self, name: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.players.remove(name);
            inner.order.retain(|tracked| tracked != name);
        }
    }

    fn tick(&self) -> Result<(), GameError> {
        let mut inner = self.inner.lock().map_err(|_poisoned| GameError::LockPoisoned {
            resource: "activity statistics",
        })?;
        inner.ticks = inner.ticks.saturating_add(1);
        for activity in inner.players.values_mut() {
            if activity.acted_this_tick {
                activity.acted_this_tick = false;
                activity.idle_ticks = 0;
            } else {
                activity.idle_ticks = activity.idle_ticks.saturating_add(1);
            }
        }
        debug!(tick = inner.ticks, players = inner.players.len(), "Statistics ticked");
        Ok(())
    }

    fn players_idle_for(&self, ticks: u64) -> Vec<String> {
        let Ok(inner) = self.inner.lock() else {
            return Vec::new();
        };
        inner
            .order
            .iter()
            .filter(|name| {
                inner
                    .players
                    .get(name.as_str())
                    .is_some_and(|activity| activity.idle_ticks >= ticks)
            })
            .cloned()
            .collect()
    }
}

/// Spy handed out by [`ActivityStatistics`].
struct ActivitySpy {
    name: String,
    inner: Arc<Mutex<ActivityInner>>,
}

impl PlayerSpy for ActivitySpy {
    fn act(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if let Some(activity) = inner.players.get_mut(&self.name) {
            activity.acted_this_tick = true;
            activity.commands = activity.commands.saturating_add(1);
            activity.last_active_at = Some(Utc::now());
        }
    }
}
