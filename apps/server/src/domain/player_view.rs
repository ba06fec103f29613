//! Viewer-filtered snapshots of game state for pushing to clients.
//!
//! Hand visibility follows the variant's asymmetric first-round rule:
//! during round 1 a player sees everyone's cards except their own;
//! from round 2 on, only their own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::state::{GameState, Phase, PlayedRecord, PlayerId, RoundOutcome};

/// A card as seen by a particular viewer: either face up or a back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardView {
    Face(Card),
    Hidden { hidden: bool },
}

impl CardView {
    pub fn hidden() -> Self {
        CardView::Hidden { hidden: true }
    }
}

/// Minimal roster entry for lobby-style events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBrief {
    pub id: PlayerId,
    pub name: String,
    pub is_ready: bool,
}

/// Public view of one seat, as shown to a specific viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    /// Lives remaining.
    pub score: u8,
    pub guess: Option<u8>,
    pub wins: u8,
    pub played_card: Option<Card>,
    pub hand_size: usize,
    pub is_ready: bool,
    /// Present only when the viewer is allowed to see this hand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<CardView>>,
}

/// Per-viewer snapshot of the full room state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub room_id: String,
    pub players: Vec<PlayerPublic>,
    pub trump_card: Option<Card>,
    pub current_round: u8,
    pub phase: Phase,
    pub current_player_index: usize,
    pub dealer_index: usize,
    pub first_round: bool,
    pub semi_rounds: u8,
    pub round_details: HashMap<PlayerId, RoundOutcome>,
    pub card_history: Vec<PlayedRecord>,
    pub last_played_card: Option<PlayedRecord>,
    /// The viewer's own hand, masked during the first round.
    pub hand: Vec<CardView>,
}

fn open_hand(cards: &[Card]) -> Vec<CardView> {
    cards.iter().copied().map(CardView::Face).collect()
}

fn masked_hand(len: usize) -> Vec<CardView> {
    (0..len).map(|_| CardView::hidden()).collect()
}

/// Roster entries for `playerJoined` / `playerUpdate` style events.
pub fn player_briefs(state: &GameState) -> Vec<PlayerBrief> {
    state
        .players
        .iter()
        .map(|p| PlayerBrief {
            id: p.id,
            name: p.name.clone(),
            is_ready: p.is_ready,
        })
        .collect()
}

/// Build the snapshot `viewer` is allowed to see.
pub fn snapshot_for(state: &GameState, viewer: PlayerId) -> GameSnapshot {
    let players = state
        .players
        .iter()
        .map(|p| {
            let hand = if p.id == viewer {
                Some(if state.first_round {
                    masked_hand(p.hand.len())
                } else {
                    open_hand(&p.hand)
                })
            } else if state.first_round {
                Some(open_hand(&p.hand))
            } else {
                None
            };
            PlayerPublic {
                id: p.id,
                name: p.name.clone(),
                score: p.lives,
                guess: p.guess,
                wins: p.wins,
                played_card: p.played_card,
                hand_size: p.hand.len(),
                is_ready: p.is_ready,
                hand,
            }
        })
        .collect();

    let own_hand = state
        .player(viewer)
        .map(|p| {
            if state.first_round {
                masked_hand(p.hand.len())
            } else {
                open_hand(&p.hand)
            }
        })
        .unwrap_or_default();

    GameSnapshot {
        room_id: state.room_id.clone(),
        players,
        trump_card: state.trump_card,
        current_round: state.current_round,
        phase: state.phase,
        current_player_index: state.current_index,
        dealer_index: state.dealer_index,
        first_round: state.first_round,
        semi_rounds: state.trick_no,
        round_details: state.round_details.clone(),
        card_history: state.card_history.clone(),
        last_played_card: state.last_played.clone(),
        hand: own_hand,
    }
}
