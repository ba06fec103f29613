//! Deck construction and round dealing.

use rand::Rng;

use crate::domain::cards;
use crate::domain::errors::DomainError;
use crate::domain::rules::{INITIAL_LIVES, MIN_PLAYERS};
use crate::domain::state::{GameState, Phase};

/// What happened while dealing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealOutcome {
    /// The deck could not supply `current_round x alive` cards, so the
    /// round counter was reset to 1 for this deal.
    pub round_reset: bool,
}

/// Start a fresh game from the lobby: reset every seat to the initial
/// life total, clear per-round state, and deal round 1.
pub fn start_game<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
) -> Result<DealOutcome, DomainError> {
    if state.players.len() < MIN_PLAYERS {
        return Err(DomainError::NotEnoughPlayers);
    }
    if state.phase != Phase::Waiting {
        return Err(DomainError::PhaseMismatch);
    }

    for p in &mut state.players {
        p.lives = INITIAL_LIVES;
        p.hand.clear();
        p.guess = None;
        p.wins = 0;
        p.played_card = None;
    }
    state.card_history.clear();
    state.last_played = None;
    state.round_details.clear();
    state.current_round = 1;
    state.first_round = true;
    state.started = true;

    Ok(start_round(state, rng))
}

/// Deal a round: fresh shuffled deck, trump revealed off the top, then
/// `current_round` cards to each alive player. Bidding opens with the
/// player seated after the dealer.
pub fn start_round<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> DealOutcome {
    for p in &mut state.players {
        p.hand.clear();
        p.guess = None;
        p.wins = 0;
        p.played_card = None;
    }

    let mut deck = cards::shuffled_deck(rng);
    state.trump_card = deck.pop();

    // Not enough cards left for the computed round size: fall back to a
    // one-card round instead of failing the deal.
    let needed = state.current_round as usize * state.alive_count();
    let round_reset = deck.len() < needed;
    if round_reset {
        state.current_round = 1;
    }

    for _ in 0..state.current_round {
        for i in 0..state.players.len() {
            if !state.players[i].is_alive() {
                continue;
            }
            if let Some(card) = deck.pop() {
                state.players[i].hand.push(card);
            }
        }
    }
    state.deck = deck;

    state.phase = Phase::Guess;
    state.trick_no = 0;
    state.sum_guesses = 0;
    state.last_played = None;
    if let Some(first) = state.next_alive_index(state.dealer_index) {
        state.current_index = first;
    }

    DealOutcome { round_reset }
}
