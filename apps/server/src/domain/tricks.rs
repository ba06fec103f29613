//! Trick engine: trump derivation, card comparison, and trick play.

use crate::domain::cards::{value_strength, Card};
use crate::domain::errors::DomainError;
use crate::domain::scoring;
use crate::domain::state::{GameState, Phase, PlayedRecord, PlayerId};

/// Result of playing a card, describing what state changes occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Whether this play completed a trick.
    pub trick_complete: bool,
    /// Winner of the completed trick, if one was completed.
    pub trick_winner: Option<PlayerId>,
    /// Whether the round ended with this trick (phase is now RoundEnd).
    pub round_over: bool,
}

/// Dominant value for the round, derived from the revealed trump card.
///
/// One step above the trump card's value, skipping the 8/9 gap the deck
/// does not contain and wrapping past 12 back to 1.
pub fn trump_strength_value(trump_card: Card) -> u8 {
    let mut v = trump_card.value + 1;
    if v > 7 && v < 10 {
        v = 10;
    } else if v > 12 {
        v = 1;
    }
    v
}

/// Strongest card of a played set under the given trump value.
///
/// A single trump wins outright; among several trumps the highest suit
/// wins; with no trump the highest value strength wins, ties broken by
/// suit. The fold is order-independent for any set of distinct cards.
pub fn winning_card(cards: &[Card], trump_value: u8) -> Option<Card> {
    let mut iter = cards.iter().copied();
    let mut highest = iter.next()?;

    for card in iter {
        let highest_is_trump = highest.value == trump_value;
        let card_is_trump = card.value == trump_value;

        if highest_is_trump || card_is_trump {
            if card_is_trump && (!highest_is_trump || highest.suit < card.suit) {
                highest = card;
            }
        } else {
            let hs = value_strength(highest.value);
            let cs = value_strength(card.value);
            if hs < cs || (hs == cs && highest.suit < card.suit) {
                highest = card;
            }
        }
    }

    Some(highest)
}

/// Play a card from the current player's hand into the trick.
///
/// Enforces turn, phase, and index validity. When the last alive player
/// plays, the trick is resolved immediately: the winner's `wins`
/// increments, the turn passes to the winner, and the round ends once
/// the trick count reaches the round's card count.
pub fn play_card(
    state: &mut GameState,
    who: PlayerId,
    card_index: usize,
) -> Result<PlayOutcome, DomainError> {
    if state.phase != Phase::Play {
        return Err(DomainError::PhaseMismatch);
    }
    if !state.is_current(who) {
        return Err(DomainError::OutOfTurn);
    }

    let round = state.current_round;
    let trick = state.trick_no + 1;
    let player = state.player_mut(who).ok_or(DomainError::UnknownPlayer)?;
    if card_index >= player.hand.len() {
        return Err(DomainError::CardIndexOutOfRange);
    }

    let card = player.hand.remove(card_index);
    player.played_card = Some(card);
    let record = PlayedRecord {
        player_id: who,
        player_name: player.name.clone(),
        card,
        round,
        trick,
    };
    state.last_played = Some(record.clone());
    state.card_history.push(record);

    state.advance_turn();

    let mut outcome = PlayOutcome {
        trick_complete: false,
        trick_winner: None,
        round_over: false,
    };

    if state.alive_players().all(|p| p.played_card.is_some()) {
        outcome.trick_complete = true;
        outcome.trick_winner = resolve_trick(state);
        outcome.round_over = state.phase == Phase::RoundEnd;
    }

    Ok(outcome)
}

/// Resolve the trick if every alive player has already played.
///
/// Used after a mid-trick removal, when the table may be waiting on a
/// seat that no longer exists.
pub fn resolve_pending_trick(state: &mut GameState) -> Option<PlayerId> {
    if state.phase != Phase::Play || state.alive_count() == 0 {
        return None;
    }
    if state.alive_players().any(|p| p.played_card.is_none()) {
        return None;
    }
    resolve_trick(state)
}

/// Resolve a completed trick: credit the winner, hand them the lead,
/// clear played cards, and close the round when its last trick falls.
fn resolve_trick(state: &mut GameState) -> Option<PlayerId> {
    let trump_value = trump_strength_value(state.trump_card?);

    let played: Vec<(PlayerId, Card)> = state
        .alive_players()
        .filter_map(|p| p.played_card.map(|c| (p.id, c)))
        .collect();
    let best = winning_card(&played.iter().map(|(_, c)| *c).collect::<Vec<_>>(), trump_value)?;
    let winner = played.iter().find(|(_, c)| *c == best).map(|(id, _)| *id)?;

    if let Some(idx) = state.players.iter().position(|p| p.id == winner) {
        state.players[idx].wins += 1;
        state.current_index = idx;
    }
    for p in &mut state.players {
        p.played_card = None;
    }
    state.trick_no += 1;

    if state.trick_no == state.current_round {
        scoring::end_round(state);
    }

    Some(winner)
}
