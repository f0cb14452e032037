//! Player registry, tick scheduler, and snapshot aggregation for the Arena
//! platform.
//!
//! This crate owns the once-per-tick orchestration pass that advances every
//! live game bound to a player. A pass runs five phases:
//! Binding Input, Statistics, Reset, Game Advance, and Type Tick. Every unit
//! of work inside a phase is fault-isolated so one broken game cannot stall
//! the rest of the platform.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `arena-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Telemetry-wrapped deferred input channel per binding.
//! - [`error`] -- [`GameError`], the failure type game collaborators return.
//! - [`fault`] -- Fault isolation: run a unit of work, capture any error or
//!   panic as an explicit outcome.
//! - [`game`] -- [`Game`] and [`GameType`] collaborator traits, [`Player`].
//! - [`multiplayer`] -- Which instances a pass advances for each
//!   [`MultiplayerMode`].
//! - [`operator`] -- Runtime controls for the periodic driver.
//! - [`platform`] -- [`PlayerGames`], the owned orchestrator object.
//! - [`registry`] -- Ordered player-to-game bindings.
//! - [`runner`] -- The fixed-rate loop that drives [`PlayerGames::tick`].
//! - [`snapshot`] -- Score tables and visibility maps for dashboards.
//! - [`statistics`] -- Per-player activity telemetry.
//! - [`tick`] -- The 5-phase tick pass.
//!
//! [`GameError`]: error::GameError
//! [`Game`]: game::Game
//! [`GameType`]: game::GameType
//! [`Player`]: game::Player
//! [`MultiplayerMode`]: arena_types::MultiplayerMode
//! [`PlayerGames`]: platform::PlayerGames
//! [`PlayerGames::tick`]: platform::PlayerGames::tick

pub mod config;
pub mod control;
pub mod error;
pub mod fault;
pub mod game;
pub mod multiplayer;
pub mod operator;
pub mod platform;
pub mod registry;
pub mod runner;
pub mod snapshot;
pub mod statistics;
pub mod tick;

#[cfg(test)]
pub(crate) mod testing;

pub use error::GameError;
pub use platform::{PlayerGames, SharedPlayerGames};
