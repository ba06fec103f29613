use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::domain::dealing::{start_game, start_round};
use crate::domain::player_view::{player_briefs, snapshot_for, CardView};
use crate::domain::state::{GameState, PlayerId};

fn started(names: &[&str], seed: u64) -> (GameState, Vec<PlayerId>, StdRng) {
    let mut state = GameState::new("ROOM42");
    let ids = names
        .iter()
        .map(|n| {
            state
                .add_player(n, &format!("persist-{n}"), Uuid::new_v4())
                .unwrap()
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(seed);
    start_game(&mut state, &mut rng).unwrap();
    (state, ids, rng)
}

fn is_masked(view: &[CardView]) -> bool {
    view.iter().all(|c| matches!(c, CardView::Hidden { .. }))
}

fn is_open(view: &[CardView]) -> bool {
    view.iter().all(|c| matches!(c, CardView::Face(_)))
}

#[test]
fn first_round_hides_your_hand_and_shows_everyone_elses() {
    let (state, ids, _) = started(&["ana", "bia", "caio"], 5);
    let snap = snapshot_for(&state, ids[0]);

    assert!(state.first_round);
    assert_eq!(snap.hand.len(), 1);
    assert!(is_masked(&snap.hand));

    for p in &snap.players {
        let hand = p.hand.as_ref().expect("round 1 exposes every hand slot");
        if p.id == ids[0] {
            assert!(is_masked(hand));
        } else {
            assert!(is_open(hand));
        }
    }
}

#[test]
fn later_rounds_show_only_your_own_hand() {
    let (mut state, ids, mut rng) = started(&["ana", "bia"], 8);
    state.current_round = 2;
    state.first_round = false;
    start_round(&mut state, &mut rng);

    let snap = snapshot_for(&state, ids[1]);
    assert_eq!(snap.hand.len(), 2);
    assert!(is_open(&snap.hand));

    for p in &snap.players {
        if p.id == ids[1] {
            assert!(is_open(p.hand.as_ref().unwrap()));
        } else {
            assert!(p.hand.is_none());
            assert_eq!(p.hand_size, 2);
        }
    }
}

#[test]
fn two_viewers_disagree_only_on_hand_visibility() {
    let (mut state, ids, mut rng) = started(&["ana", "bia"], 12);
    state.current_round = 2;
    state.first_round = false;
    start_round(&mut state, &mut rng);

    let a = snapshot_for(&state, ids[0]);
    let b = snapshot_for(&state, ids[1]);

    assert_eq!(a.trump_card, b.trump_card);
    assert_eq!(a.current_round, b.current_round);
    assert_eq!(a.current_player_index, b.current_player_index);
    assert_ne!(a.hand, b.hand);
}

#[test]
fn snapshot_serializes_with_camel_case_keys() {
    let (state, ids, _) = started(&["ana", "bia"], 3);
    let json = serde_json::to_value(snapshot_for(&state, ids[0])).unwrap();

    assert_eq!(json["roomId"], "ROOM42");
    assert!(json["trumpCard"].is_object());
    assert!(json["currentPlayerIndex"].is_number());
    assert!(json["players"][0]["handSize"].is_number());
    // Masked cards serialize as a back marker, not a face.
    assert_eq!(json["hand"][0]["hidden"], true);
}

#[test]
fn briefs_carry_roster_and_ready_flags() {
    let mut state = GameState::new("ROOM42");
    let a = state.add_player("ana", "pa", Uuid::new_v4()).unwrap();
    let _b = state.add_player("bia", "pb", Uuid::new_v4()).unwrap();
    state.set_ready(a, true);

    let briefs = player_briefs(&state);
    assert_eq!(briefs.len(), 2);
    assert!(briefs[0].is_ready);
    assert!(!briefs[1].is_ready);
    assert_eq!(briefs[1].name, "bia");
}
