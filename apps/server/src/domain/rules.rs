//! Fixed rule constants for the game variant.

/// Lives every player starts a game with.
pub const INITIAL_LIVES: u8 = 5;

/// A game cannot start or continue with fewer seats than this.
pub const MIN_PLAYERS: usize = 2;

/// 10 face values across 4 suits.
pub const DECK_SIZE: usize = 40;
