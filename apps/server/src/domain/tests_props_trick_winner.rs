use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::cards::{full_deck, value_strength, Card, CARD_VALUES};
use crate::domain::tricks::winning_card;

/// Distinct cards dealt off a seeded shuffle, plus a trump value.
fn table(seed: u64, n: usize) -> (Vec<Card>, u8) {
    let mut deck = full_deck();
    let mut rng = StdRng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    let trump_value = CARD_VALUES[seed as usize % CARD_VALUES.len()];
    (deck.into_iter().take(n).collect(), trump_value)
}

proptest! {
    #[test]
    fn winner_does_not_depend_on_play_order(seed in any::<u64>(), n in 2usize..=8, perm_seed in any::<u64>()) {
        let (cards, trump_value) = table(seed, n);
        let expected = winning_card(&cards, trump_value);

        let mut reordered = cards.clone();
        reordered.shuffle(&mut StdRng::seed_from_u64(perm_seed));
        prop_assert_eq!(winning_card(&reordered, trump_value), expected);
    }

    #[test]
    fn winner_is_always_one_of_the_played_cards(seed in any::<u64>(), n in 2usize..=8) {
        let (cards, trump_value) = table(seed, n);
        let winner = winning_card(&cards, trump_value).unwrap();
        prop_assert!(cards.contains(&winner));
    }

    #[test]
    fn a_trump_on_the_table_always_takes_the_trick(seed in any::<u64>(), n in 2usize..=8) {
        let (cards, trump_value) = table(seed, n);
        prop_assume!(cards.iter().any(|c| c.value == trump_value));
        let winner = winning_card(&cards, trump_value).unwrap();
        prop_assert_eq!(winner.value, trump_value);
    }

    #[test]
    fn without_trumps_the_strongest_value_wins(seed in any::<u64>(), n in 2usize..=8) {
        let (cards, trump_value) = table(seed, n);
        prop_assume!(cards.iter().all(|c| c.value != trump_value));
        let winner = winning_card(&cards, trump_value).unwrap();
        let best = cards.iter().map(|c| value_strength(c.value).unwrap()).max().unwrap();
        prop_assert_eq!(value_strength(winner.value).unwrap(), best);
    }
}

#[test]
fn empty_table_has_no_winner() {
    assert_eq!(winning_card(&[], 4), None);
}
