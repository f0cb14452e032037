//! Multiplayer coordination: which instances a pass advances.
//!
//! For a `Single` type every bound instance is independent and is advanced
//! once. For a `Shared` type all bound instances are handles onto one board,
//! so exactly one representative is advanced: the first binding of the type
//! in registry order. Advancing a shared board twice in one pass corrupts
//! its state.

use arena_types::MultiplayerMode;

use crate::game::GameType;

/// The instances of one game type that a pass must advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    /// No instance is bound to the type.
    Nothing,
    /// Advance only this instance (shared board).
    Representative(T),
    /// Advance every instance, in registry order.
    All(Vec<T>),
}

impl<T> Selection<T> {
    /// The selected instances in advance order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Nothing => Vec::new(),
            Self::Representative(one) => vec![one],
            Self::All(all) => all,
        }
    }
}

/// Multiplayer mode declared by a game type.
pub fn classify(game_type: &dyn GameType) -> MultiplayerMode {
    game_type.multiplayer()
}

/// Select which of `bound` (in registry order) to advance under `mode`.
pub fn select<T: Clone>(mode: MultiplayerMode, bound: &[T]) -> Selection<T> {
    if mode.is_shared() {
        bound
            .first()
            .cloned()
            .map_or(Selection::Nothing, Selection::Representative)
    } else if bound.is_empty() {
        Selection::Nothing
    } else {
        Selection::All(bound.to_vec())
    }
}
