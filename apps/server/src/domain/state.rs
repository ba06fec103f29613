//! Game state container and seat/turn bookkeeping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cards::Card;
use crate::domain::errors::DomainError;
use crate::domain::rules::INITIAL_LIVES;

/// Stable internal handle for a player, created once per durable
/// identity. Never changes for the lifetime of the seat; every state
/// reference (history, round details, indices) keys on this.
pub type PlayerId = Uuid;

/// Volatile identity of one live connection. Changes on every
/// reconnect and is a mutable attribute on the player, never a key.
pub type ConnId = Uuid;

/// Game progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Lobby, accepting ready flags.
    Waiting,
    /// Bidding in turn order.
    Guess,
    /// Trick play.
    Play,
    /// Scoring shown, waiting for a round-advance request.
    RoundEnd,
    /// At most one player left alive.
    GameOver,
    /// Fewer than two players remain; the room is being purged.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Durable, client-issued token that outlives any connection.
    pub persistent_id: String,
    /// Current transport identity.
    pub conn: ConnId,
    pub name: String,
    /// Lives remaining; 0 means eliminated.
    pub lives: u8,
    pub hand: Vec<Card>,
    pub guess: Option<u8>,
    pub wins: u8,
    pub played_card: Option<Card>,
    pub is_ready: bool,
}

impl Player {
    fn new(name: &str, persistent_id: &str, conn: ConnId) -> Self {
        Self {
            id: Uuid::new_v4(),
            persistent_id: persistent_id.to_string(),
            conn,
            name: name.to_string(),
            lives: INITIAL_LIVES,
            hand: Vec::new(),
            guess: None,
            wins: 0,
            played_card: None,
            is_ready: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

/// One card played into a trick, tagged for the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedRecord {
    pub player_id: PlayerId,
    pub player_name: String,
    pub card: Card,
    pub round: u8,
    pub trick: u8,
}

/// Per-player result of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub name: String,
    pub lives_before: u8,
    pub damage: u8,
    pub lives: u8,
    pub guess: Option<u8>,
    pub wins: u8,
}

/// Authoritative state of one room's game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub room_id: String,
    pub players: Vec<Player>,
    pub deck: Vec<Card>,
    pub trump_card: Option<Card>,
    pub current_round: u8,
    pub phase: Phase,
    pub current_index: usize,
    pub dealer_index: usize,
    /// Tricks resolved so far this round.
    pub trick_no: u8,
    /// Running total of guesses placed this round.
    pub sum_guesses: u8,
    pub round_details: HashMap<PlayerId, RoundOutcome>,
    pub card_history: Vec<PlayedRecord>,
    pub last_played: Option<PlayedRecord>,
    pub first_round: bool,
    pub started: bool,
}

impl GameState {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            players: Vec::new(),
            deck: Vec::new(),
            trump_card: None,
            current_round: 1,
            phase: Phase::Waiting,
            current_index: 0,
            dealer_index: 0,
            trick_no: 0,
            sum_guesses: 0,
            round_details: HashMap::new(),
            card_history: Vec::new(),
            last_played: None,
            first_round: true,
            started: false,
        }
    }

    /// Seat a new player. Rejects a `persistent_id` already owned by an
    /// active player (duplicate tab/session).
    pub fn add_player(
        &mut self,
        name: &str,
        persistent_id: &str,
        conn: ConnId,
    ) -> Result<PlayerId, DomainError> {
        if self
            .players
            .iter()
            .any(|p| p.persistent_id == persistent_id)
        {
            return Err(DomainError::DuplicateSession);
        }
        let player = Player::new(name, persistent_id, conn);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player and keep the turn/dealer indices pointing at a
    /// live seat.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(idx);

        if !self.players.is_empty() {
            for slot in [&mut self.current_index, &mut self.dealer_index] {
                if *slot > idx {
                    *slot -= 1;
                } else if *slot >= self.players.len() {
                    *slot = 0;
                }
            }
            if self.started {
                self.realign_indices();
            }
        } else {
            self.current_index = 0;
            self.dealer_index = 0;
        }

        // A guess the leaver already placed must stop counting against
        // the dealer's restriction.
        if self.phase == Phase::Guess {
            self.sum_guesses = self.alive_players().filter_map(|p| p.guess).sum();
        }

        Some(removed)
    }

    /// Snap turn and dealer indices onto alive players after an
    /// elimination or removal.
    fn realign_indices(&mut self) {
        if self.alive_count() == 0 {
            return;
        }
        if !self.players[self.current_index].is_alive() {
            if let Some(next) = self.next_alive_index(self.current_index) {
                self.current_index = next;
            }
        }
        if !self.players[self.dealer_index].is_alive() {
            if let Some(next) = self.next_alive_index(self.dealer_index) {
                self.dealer_index = next;
            }
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_conn(&self, conn: ConnId) -> Option<&Player> {
        self.players.iter().find(|p| p.conn == conn)
    }

    pub fn player_by_persistent(&self, persistent_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.persistent_id == persistent_id)
    }

    /// Point a player's seat at a new transport identity.
    ///
    /// Idempotent: if `old` was already rewritten to `new`, the second
    /// application finds the player under `new` and changes nothing.
    pub fn rebind_transport(&mut self, old: ConnId, new: ConnId) -> Option<PlayerId> {
        if let Some(p) = self.players.iter_mut().find(|p| p.conn == old) {
            p.conn = new;
            return Some(p.id);
        }
        self.players.iter().find(|p| p.conn == new).map(|p| p.id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// Index of the first alive player strictly after `from`, wrapping.
    pub fn next_alive_index(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|&i| self.players[i].is_alive())
    }

    /// Advance the turn to the next alive player.
    pub fn advance_turn(&mut self) {
        if let Some(next) = self.next_alive_index(self.current_index) {
            self.current_index = next;
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_index)
    }

    pub fn dealer(&self) -> Option<&Player> {
        self.players.get(self.dealer_index)
    }

    pub fn is_current(&self, id: PlayerId) -> bool {
        self.current_player().is_some_and(|p| p.id == id)
    }

    pub fn is_dealer(&self, id: PlayerId) -> bool {
        self.dealer().is_some_and(|p| p.id == id)
    }

    pub fn set_ready(&mut self, id: PlayerId, ready: bool) -> bool {
        match self.player_mut(id) {
            Some(p) => {
                p.is_ready = ready;
                true
            }
            None => false,
        }
    }

    pub fn all_ready(&self) -> bool {
        self.players.len() >= 2 && self.players.iter().all(|p| p.is_ready)
    }

    /// Back to the lobby: after a finished game, or a unanimous
    /// return-to-lobby vote. Scores are reset by the next game start.
    pub fn reset_to_lobby(&mut self) {
        self.phase = Phase::Waiting;
        self.started = false;
        self.current_round = 1;
        self.first_round = true;
        self.trick_no = 0;
        self.sum_guesses = 0;
        self.trump_card = None;
        self.deck.clear();
        self.round_details.clear();
        self.card_history.clear();
        self.last_played = None;
        for p in &mut self.players {
            p.is_ready = false;
            p.hand.clear();
            p.guess = None;
            p.wins = 0;
            p.played_card = None;
        }
    }
}
