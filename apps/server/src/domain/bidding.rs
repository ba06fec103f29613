//! Bidding phase: guess recording and the dealer's total restriction.

use crate::domain::errors::DomainError;
use crate::domain::state::{GameState, Phase, PlayerId};

/// Result of recording a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Every alive player has guessed; phase moved to Play and the turn
    /// reset to the player after the dealer.
    pub bidding_complete: bool,
}

/// Guesses the dealer may legally place right now.
///
/// The dealer may not make the guess total equal the round's card
/// count, except in round 1 when no other guess has been placed yet.
pub fn allowed_dealer_guesses(state: &GameState) -> Vec<u8> {
    let round = state.current_round;
    let others = state.sum_guesses;
    (0..=round)
        .filter(|&g| {
            if round == 1 && others == 0 {
                return true;
            }
            g + others != round
        })
        .collect()
}

/// Record a guess for the current player.
///
/// Rejects out-of-turn and out-of-phase calls, repeat guesses, guesses
/// above the round size, and a dealer guess that would make the total
/// equal the round's card count (enforced authoritatively, not just
/// client-side).
pub fn make_guess(
    state: &mut GameState,
    who: PlayerId,
    value: u8,
) -> Result<GuessOutcome, DomainError> {
    if state.phase != Phase::Guess {
        return Err(DomainError::PhaseMismatch);
    }
    if !state.is_current(who) {
        return Err(DomainError::OutOfTurn);
    }
    if state.player(who).is_some_and(|p| p.guess.is_some()) {
        return Err(DomainError::OutOfTurn);
    }
    if value > state.current_round {
        return Err(DomainError::InvalidGuess);
    }
    if state.is_dealer(who) && !allowed_dealer_guesses(state).contains(&value) {
        return Err(DomainError::InvalidGuess);
    }

    let player = state.player_mut(who).ok_or(DomainError::UnknownPlayer)?;
    player.guess = Some(value);
    state.sum_guesses += value;
    state.advance_turn();

    let bidding_complete = state.alive_players().all(|p| p.guess.is_some());
    if bidding_complete {
        close_bidding(state);
    }

    Ok(GuessOutcome { bidding_complete })
}

/// Close the bidding if every alive player has already guessed.
///
/// Used after a mid-bid removal, when the table may be waiting on a
/// seat that no longer exists.
pub fn resolve_pending_bids(state: &mut GameState) -> bool {
    if state.phase != Phase::Guess || state.alive_count() == 0 {
        return false;
    }
    if state.alive_players().any(|p| p.guess.is_none()) {
        return false;
    }
    close_bidding(state);
    true
}

fn close_bidding(state: &mut GameState) {
    state.phase = Phase::Play;
    if let Some(first) = state.next_alive_index(state.dealer_index) {
        state.current_index = first;
    }
}
