//! The owned orchestrator: registry plus tick scheduler.
//!
//! [`PlayerGames`] is the object the engine builds once and passes to the
//! periodic driver. Mutating operations (`add`, `remove`, `clear`, `tick`)
//! take `&mut self`, so a pass can never interleave with a registry change.
//! A process that mutates from several tasks shares it as
//! [`SharedPlayerGames`] and locks around each operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use arena_types::GameData;
use tokio::sync::Mutex;

use crate::config::ArenaConfig;
use crate::game::{Game, GameType, Player};
use crate::registry::{Binding, PlayerGameRegistry, PlayerHook};
use crate::snapshot;
use crate::statistics::Statistics;
use crate::tick::{TickReport, TickScheduler};

/// A [`PlayerGames`] shared between the tick driver and other tasks.
pub type SharedPlayerGames = Arc<Mutex<PlayerGames>>;

/// Player registry and tick scheduler in one owned object.
#[derive(Debug)]
pub struct PlayerGames {
    registry: PlayerGameRegistry,
    scheduler: TickScheduler,
}

impl PlayerGames {
    /// Create an empty platform with default configuration.
    pub fn new(statistics: Arc<dyn Statistics>) -> Self {
        Self {
            registry: PlayerGameRegistry::new(statistics),
            scheduler: TickScheduler::default(),
        }
    }

    /// Create an empty platform configured from `config`.
    pub fn with_config(statistics: Arc<dyn Statistics>, config: &ArenaConfig) -> Self {
        Self {
            registry: PlayerGameRegistry::new(statistics),
            scheduler: TickScheduler::new(config.inactivity),
        }
    }

    /// Wrap the platform for sharing across tasks.
    pub fn into_shared(self) -> SharedPlayerGames {
        Arc::new(Mutex::new(self))
    }

    /// Read access to the underlying registry.
    pub const fn registry(&self) -> &PlayerGameRegistry {
        &self.registry
    }

    /// Register the hook called once for every newly bound player.
    pub fn on_add_player(&mut self, hook: PlayerHook) {
        self.registry.on_add_player(hook);
    }

    /// Register the hook called once for every unbound player.
    pub fn on_remove_player(&mut self, hook: PlayerHook) {
        self.registry.on_remove_player(hook);
    }

    /// Bind `player` to `game`.
    pub fn add(&mut self, player: Player, game: Box<dyn Game>) -> &Binding {
        self.registry.add(player, game)
    }

    /// Unbind `player`; no-op if not bound.
    pub fn remove(&mut self, player: &Player) -> bool {
        self.registry.remove(player)
    }

    /// The binding of the named player, if bound.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.registry.get(name)
    }

    /// Mutable binding of the named player, if bound.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.registry.get_mut(name)
    }

    /// Every bound player in binding order.
    pub fn players(&self) -> Vec<Player> {
        self.registry.players()
    }

    /// Number of bound players.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no player is bound.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Unbind every player.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Bindings of players declared for `game_type`, in binding order.
    pub fn bindings_of_type(&self, game_type: &str) -> Vec<&Binding> {
        self.registry.bindings_of_type(game_type)
    }

    /// Distinct game types in play, in first-seen order.
    pub fn game_types(&self) -> Vec<Arc<dyn GameType>> {
        self.registry.game_types()
    }

    /// Run one orchestration pass.
    pub fn tick(&mut self) -> TickReport {
        self.scheduler.run_tick(&mut self.registry)
    }

    /// Number of completed passes.
    pub const fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Score table and visibility map for one game type.
    pub fn snapshot(&self, game_type: &str) -> Option<GameData> {
        snapshot::snapshot(&self.registry, game_type)
    }

    /// Snapshots of every game type in play.
    pub fn snapshots(&self) -> BTreeMap<String, GameData> {
        snapshot::snapshots(&self.registry)
    }
}
