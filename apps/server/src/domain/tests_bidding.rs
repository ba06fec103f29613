use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::domain::bidding::{allowed_dealer_guesses, make_guess, resolve_pending_bids};
use crate::domain::dealing;
use crate::domain::errors::DomainError;
use crate::domain::state::{GameState, Phase, PlayerId};

fn started_game(names: &[&str], seed: u64) -> (GameState, Vec<PlayerId>, StdRng) {
    let mut state = GameState::new("R1");
    let ids = names
        .iter()
        .map(|n| {
            state
                .add_player(n, &format!("persist-{n}"), Uuid::new_v4())
                .unwrap()
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(seed);
    dealing::start_game(&mut state, &mut rng).unwrap();
    (state, ids, rng)
}

#[test]
fn bidding_starts_after_the_dealer_and_follows_seat_order() {
    let (mut state, ids, _) = started_game(&["ana", "bia", "caio"], 7);
    assert_eq!(state.phase, Phase::Guess);
    assert_eq!(state.dealer_index, 0);
    assert!(state.is_current(ids[1]));

    assert_eq!(
        make_guess(&mut state, ids[2], 0),
        Err(DomainError::OutOfTurn)
    );

    make_guess(&mut state, ids[1], 1).unwrap();
    assert!(state.is_current(ids[2]));
}

#[test]
fn guess_above_round_size_is_rejected() {
    let (mut state, ids, _) = started_game(&["ana", "bia"], 3);
    assert_eq!(
        make_guess(&mut state, ids[1], 2),
        Err(DomainError::InvalidGuess)
    );
}

#[test]
fn all_guesses_in_moves_to_play_with_the_lead_after_the_dealer() {
    let (mut state, ids, _) = started_game(&["ana", "bia", "caio"], 11);

    make_guess(&mut state, ids[1], 0).unwrap();
    let mid = make_guess(&mut state, ids[2], 1).unwrap();
    assert!(!mid.bidding_complete);

    let last = make_guess(&mut state, ids[0], 1).unwrap();
    assert!(last.bidding_complete);
    assert_eq!(state.phase, Phase::Play);
    assert!(state.is_current(ids[1]));
}

#[test]
fn dealer_cannot_match_the_round_total() {
    let (mut state, ids, mut rng) = started_game(&["ana", "bia", "caio"], 5);
    state.current_round = 2;
    state.first_round = false;
    dealing::start_round(&mut state, &mut rng);

    make_guess(&mut state, ids[1], 1).unwrap();
    make_guess(&mut state, ids[2], 0).unwrap();

    // Total so far is 1 of 2; guessing 1 would close the book.
    assert_eq!(allowed_dealer_guesses(&state), vec![0, 2]);
    assert_eq!(
        make_guess(&mut state, ids[0], 1),
        Err(DomainError::InvalidGuess)
    );

    make_guess(&mut state, ids[0], 2).unwrap();
    assert_eq!(state.phase, Phase::Play);
}

#[test]
fn round_one_dealer_restriction_waived_when_no_guess_placed() {
    let (mut state, ids, _) = started_game(&["ana", "bia"], 9);

    // Non-dealer guesses 0, so the running total stays at 0 and the
    // round-1 waiver applies: the dealer may still guess 1.
    make_guess(&mut state, ids[1], 0).unwrap();
    assert_eq!(allowed_dealer_guesses(&state), vec![0, 1]);
    make_guess(&mut state, ids[0], 1).unwrap();
    assert_eq!(state.phase, Phase::Play);
}

#[test]
fn round_one_dealer_restriction_applies_once_a_guess_lands() {
    let (mut state, ids, _) = started_game(&["ana", "bia"], 13);

    make_guess(&mut state, ids[1], 1).unwrap();
    assert_eq!(allowed_dealer_guesses(&state), vec![1]);
    assert_eq!(
        make_guess(&mut state, ids[0], 0),
        Err(DomainError::InvalidGuess)
    );
    make_guess(&mut state, ids[0], 1).unwrap();
}

#[test]
fn eliminated_seat_is_skipped_in_bid_order() {
    let (mut state, ids, mut rng) = started_game(&["ana", "bia", "caio", "duda"], 17);
    state.players[2].lives = 0;
    state.current_round = 2;
    state.first_round = false;
    dealing::start_round(&mut state, &mut rng);

    assert!(state.players[2].hand.is_empty());
    assert!(state.is_current(ids[1]));
    make_guess(&mut state, ids[1], 0).unwrap();
    // Seat 2 is dead; the turn lands on seat 3.
    assert!(state.is_current(ids[3]));
    make_guess(&mut state, ids[3], 1).unwrap();

    let done = make_guess(&mut state, ids[0], 0).unwrap();
    assert!(done.bidding_complete);
    assert!(state.players[2].guess.is_none());
}

#[test]
fn removing_the_last_open_bidder_closes_the_bidding() {
    let (mut state, ids, _) = started_game(&["ana", "bia", "caio"], 19);

    make_guess(&mut state, ids[1], 0).unwrap();
    make_guess(&mut state, ids[2], 1).unwrap();
    // Only the dealer still owes a guess; the table would wait forever
    // on the seat once it is gone.
    assert!(state.is_current(ids[0]));

    state.remove_player(ids[0]).unwrap();
    assert!(resolve_pending_bids(&mut state));
    assert_eq!(state.phase, Phase::Play);
    // Lead is the first alive seat after the dealer.
    assert!(state.is_current(ids[2]));
    assert_eq!(state.sum_guesses, 1);

    // Nothing left pending; a second call changes nothing.
    assert!(!resolve_pending_bids(&mut state));
}

#[test]
fn removing_a_bidder_recounts_the_guess_total() {
    let (mut state, ids, _) = started_game(&["ana", "bia", "caio"], 23);

    make_guess(&mut state, ids[1], 1).unwrap();
    assert_eq!(state.sum_guesses, 1);

    state.remove_player(ids[1]).unwrap();
    assert_eq!(state.sum_guesses, 0);
    // Two seats still owe a guess, so bidding stays open.
    assert!(!resolve_pending_bids(&mut state));
    assert_eq!(state.phase, Phase::Guess);
}

#[test]
fn a_seat_may_only_guess_once_per_round() {
    let (mut state, ids, _) = started_game(&["ana", "bia", "caio"], 29);

    make_guess(&mut state, ids[1], 0).unwrap();
    // Force the turn back onto a seat that already guessed, as a
    // mid-bid removal's index fixup can.
    state.current_index = 1;

    assert_eq!(
        make_guess(&mut state, ids[1], 1),
        Err(DomainError::OutOfTurn)
    );
    assert_eq!(state.players[1].guess, Some(0));
    assert_eq!(state.sum_guesses, 0);
}
