//! Card and deck model: the 40-card Fodinha deck and its ranking order.

use serde::{Deserialize, Serialize};

/// Face values in play, listed from weakest to strongest.
///
/// Fodinha ranks values in a non-numeric order: 4 is the weakest card
/// and 3 the strongest. 8s and 9s are not part of the deck.
pub const CARD_VALUES: [u8; 10] = [4, 5, 6, 7, 10, 11, 12, 1, 2, 3];

/// Suits listed from weakest to strongest; `Ord` follows declaration
/// order and is the tie-break order for equal-strength values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Diamonds,
    Spades,
    Hearts,
    Clubs,
}

pub const SUITS: [Suit; 4] = [Suit::Diamonds, Suit::Spades, Suit::Hearts, Suit::Clubs];

/// One playing card. Immutable once dealt until played.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub value: u8,
    pub suit: Suit,
}

/// Strength rank of a face value (0 = weakest), or `None` for values
/// outside the deck.
pub fn value_strength(value: u8) -> Option<u8> {
    CARD_VALUES.iter().position(|&v| v == value).map(|i| i as u8)
}

/// Build one copy of each `(value, suit)` pair: 40 cards, no duplicates.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(CARD_VALUES.len() * SUITS.len());
    for &value in &CARD_VALUES {
        for &suit in &SUITS {
            deck.push(Card { value, suit });
        }
    }
    deck
}

/// Full deck in a uniform random order (Fisher-Yates via `rand`).
pub fn shuffled_deck<R: rand::Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    use rand::seq::SliceRandom;

    let mut deck = full_deck();
    deck.shuffle(rng);
    deck
}
