//! End-of-round scoring and round/game progression.

use rand::Rng;

use crate::domain::dealing;
use crate::domain::errors::DomainError;
use crate::domain::state::{GameState, Phase, Player, RoundOutcome};

/// Result of advancing past a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextRoundOutcome {
    /// At most one player is left alive; the game is over.
    pub game_over: bool,
    /// The deal fell back to a one-card round (deck exhausted).
    pub round_reset: bool,
}

/// Close the round: every alive player takes `|wins - guess|` damage,
/// floored at zero lives, and the results are recorded per player.
pub fn end_round(state: &mut GameState) {
    state.round_details.clear();

    let alive: Vec<_> = state
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_alive())
        .map(|(i, _)| i)
        .collect();

    for i in alive {
        let p = &mut state.players[i];
        let damage = p.wins.abs_diff(p.guess.unwrap_or(0));
        let lives_before = p.lives;
        p.lives = p.lives.saturating_sub(damage);
        state.round_details.insert(
            p.id,
            RoundOutcome {
                name: p.name.clone(),
                lives_before,
                damage,
                lives: p.lives,
                guess: p.guess,
                wins: p.wins,
            },
        );
    }

    state.phase = Phase::RoundEnd;
}

/// Advance from RoundEnd to the next round, or to GameOver when at most
/// one player survives. The dealer rotates to the next alive seat and
/// the first-round visibility rule expires.
pub fn next_round<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
) -> Result<NextRoundOutcome, DomainError> {
    if state.phase != Phase::RoundEnd {
        return Err(DomainError::PhaseMismatch);
    }

    if check_game_end(state) {
        state.phase = Phase::GameOver;
        return Ok(NextRoundOutcome {
            game_over: true,
            round_reset: false,
        });
    }

    if let Some(next) = state.next_alive_index(state.dealer_index) {
        state.dealer_index = next;
    }
    state.current_round += 1;
    state.first_round = false;
    state.card_history.clear();
    state.last_played = None;

    let deal = dealing::start_round(state, rng);
    Ok(NextRoundOutcome {
        game_over: false,
        round_reset: deal.round_reset,
    })
}

pub fn check_game_end(state: &GameState) -> bool {
    state.alive_count() <= 1
}

/// Sole survivor, if the game has one.
pub fn game_winner(state: &GameState) -> Option<&Player> {
    let mut alive = state.alive_players();
    let winner = alive.next();
    match alive.next() {
        Some(_) => None,
        None => winner,
    }
}
