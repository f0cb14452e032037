//! Error types for the arena engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the arena engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: arena_core::config::ConfigError,
    },

    /// Demo roster could not be built or seeded.
    #[error("demo error: {message}")]
    Demo {
        /// Description of the demo failure.
        message: String,
    },
}
