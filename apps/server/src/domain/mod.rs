//! Domain layer: pure game logic, no I/O.

pub mod bidding;
pub mod cards;
pub mod dealing;
pub mod errors;
pub mod player_view;
pub mod rules;
pub mod scoring;
pub mod state;
pub mod tricks;

#[cfg(test)]
mod tests_bidding;
#[cfg(test)]
mod tests_props_trick_winner;
#[cfg(test)]
mod tests_snapshot;
#[cfg(test)]
mod tests_tricks;

// Re-exports for ergonomics
pub use cards::{Card, Suit};
pub use errors::DomainError;
pub use player_view::{player_briefs, snapshot_for, GameSnapshot, PlayerBrief};
pub use state::{ConnId, GameState, Phase, PlayerId};
