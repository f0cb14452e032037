//! Shared type definitions for the Arena platform.
//!
//! This crate holds the plain value types that flow between the tick
//! orchestration core, the engine binary, and whatever dashboard consumes
//! the aggregated snapshots. Nothing here carries behavior beyond
//! construction and serialization.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for game instances and bindings
//! - [`enums`] -- Multiplayer modes and the joystick command vocabulary
//! - [`hero`] -- Per-instance hero state with optional shared-board group
//! - [`snapshot`] -- Score and visibility payloads served to dashboards

pub mod enums;
pub mod hero;
pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use enums::{Command, MultiplayerMode};
pub use hero::HeroData;
pub use ids::{BindingId, GameId};
pub use snapshot::{GameData, HeroesMap, ScoreTable};
