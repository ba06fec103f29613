use uuid::Uuid;

use crate::domain::cards::{Card, Suit};
use crate::domain::errors::DomainError;
use crate::domain::state::{GameState, Phase, PlayerId};
use crate::domain::tricks::{play_card, trump_strength_value, winning_card};

fn c(value: u8, suit: Suit) -> Card {
    Card { value, suit }
}

/// Game mid-play with the given hands, seat 0 as dealer, seat 1 to act.
fn play_state(hands: &[Vec<Card>], trump: Card) -> (GameState, Vec<PlayerId>) {
    let mut state = GameState::new("R1");
    let mut ids = Vec::new();
    for i in 0..hands.len() {
        let id = state
            .add_player(&format!("p{i}"), &format!("persist-{i}"), Uuid::new_v4())
            .unwrap();
        ids.push(id);
    }
    for (i, hand) in hands.iter().enumerate() {
        state.players[i].hand = hand.clone();
        state.players[i].guess = Some(0);
    }
    state.started = true;
    state.phase = Phase::Play;
    state.current_round = hands[0].len() as u8;
    state.trump_card = Some(trump);
    state.dealer_index = 0;
    state.current_index = 1 % hands.len();
    (state, ids)
}

#[test]
fn trump_value_is_one_step_above_the_trump_card() {
    assert_eq!(trump_strength_value(c(4, Suit::Hearts)), 5);
    assert_eq!(trump_strength_value(c(3, Suit::Clubs)), 4);
}

#[test]
fn trump_value_skips_the_missing_eight_and_nine() {
    assert_eq!(trump_strength_value(c(7, Suit::Spades)), 10);
}

#[test]
fn trump_value_wraps_past_twelve() {
    assert_eq!(trump_strength_value(c(12, Suit::Diamonds)), 1);
}

#[test]
fn wrapped_trump_beats_every_non_trump() {
    // Trump card 12 makes 1 the dominant value.
    let trump_value = trump_strength_value(c(12, Suit::Diamonds));
    let cards = [c(3, Suit::Clubs), c(1, Suit::Diamonds), c(2, Suit::Clubs)];
    assert_eq!(winning_card(&cards, trump_value), Some(c(1, Suit::Diamonds)));
}

#[test]
fn single_trump_wins_unconditionally() {
    let cards = [c(3, Suit::Clubs), c(5, Suit::Diamonds), c(2, Suit::Hearts)];
    assert_eq!(winning_card(&cards, 5), Some(c(5, Suit::Diamonds)));
}

#[test]
fn multiple_trumps_break_on_suit() {
    let cards = [c(5, Suit::Spades), c(5, Suit::Hearts), c(3, Suit::Clubs)];
    assert_eq!(winning_card(&cards, 5), Some(c(5, Suit::Hearts)));
}

#[test]
fn no_trump_highest_strength_wins() {
    // 3 outranks 12 outranks 7 in this variant.
    let cards = [c(7, Suit::Clubs), c(12, Suit::Spades), c(3, Suit::Diamonds)];
    assert_eq!(winning_card(&cards, 6), Some(c(3, Suit::Diamonds)));
}

#[test]
fn equal_strength_breaks_on_suit() {
    let cards = [c(11, Suit::Diamonds), c(11, Suit::Clubs), c(4, Suit::Hearts)];
    assert_eq!(winning_card(&cards, 5), Some(c(11, Suit::Clubs)));
}

#[test]
fn play_card_rejects_out_of_turn_and_phase() {
    let hands = vec![vec![c(4, Suit::Hearts)], vec![c(5, Suit::Clubs)]];
    let (mut state, ids) = play_state(&hands, c(10, Suit::Spades));

    // Seat 1 acts first; seat 0 is out of turn.
    assert_eq!(play_card(&mut state, ids[0], 0), Err(DomainError::OutOfTurn));

    state.phase = Phase::Guess;
    assert_eq!(
        play_card(&mut state, ids[1], 0),
        Err(DomainError::PhaseMismatch)
    );
}

#[test]
fn play_card_rejects_bad_index_without_mutation() {
    let hands = vec![vec![c(4, Suit::Hearts)], vec![c(5, Suit::Clubs)]];
    let (mut state, ids) = play_state(&hands, c(10, Suit::Spades));

    let before = state.clone();
    assert_eq!(
        play_card(&mut state, ids[1], 3),
        Err(DomainError::CardIndexOutOfRange)
    );
    assert_eq!(state, before);
}

#[test]
fn completed_trick_credits_winner_and_hands_over_the_lead() {
    // Trump card 6 makes 7 dominant; seat 0 holds it.
    let hands = vec![
        vec![c(7, Suit::Diamonds), c(4, Suit::Clubs)],
        vec![c(2, Suit::Spades), c(5, Suit::Hearts)],
    ];
    let (mut state, ids) = play_state(&hands, c(6, Suit::Clubs));

    let first = play_card(&mut state, ids[1], 0).unwrap();
    assert!(!first.trick_complete);
    assert!(state.is_current(ids[0]));

    let second = play_card(&mut state, ids[0], 0).unwrap();
    assert!(second.trick_complete);
    assert_eq!(second.trick_winner, Some(ids[0]));
    assert!(!second.round_over);

    assert_eq!(state.player(ids[0]).unwrap().wins, 1);
    assert!(state.is_current(ids[0]));
    assert_eq!(state.trick_no, 1);
    assert!(state.players.iter().all(|p| p.played_card.is_none()));
    assert_eq!(state.card_history.len(), 2);
    assert_eq!(state.card_history[1].trick, 1);
}

#[test]
fn last_trick_of_the_round_moves_to_round_end() {
    let hands = vec![vec![c(3, Suit::Clubs)], vec![c(4, Suit::Hearts)]];
    let (mut state, ids) = play_state(&hands, c(10, Suit::Spades));

    play_card(&mut state, ids[1], 0).unwrap();
    let last = play_card(&mut state, ids[0], 0).unwrap();
    assert!(last.round_over);
    assert_eq!(state.phase, Phase::RoundEnd);
    assert!(!state.round_details.is_empty());
}
