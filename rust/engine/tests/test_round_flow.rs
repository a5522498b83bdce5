use rivertable_engine::betting::TurnOutcome;
use rivertable_engine::cards::parse_cards;
use rivertable_engine::deck::Deck;
use rivertable_engine::equity::UniformEquity;
use rivertable_engine::errors::{ActionError, GameError};
use rivertable_engine::events::{ForcedFoldReason, RoundEvent};
use rivertable_engine::logger::Street;
use rivertable_engine::player::PlayerAction as A;
use rivertable_engine::round::{Phase, Round, RoundConfig};
use rivertable_engine::rules::ValidatedAction;

fn heads_up() -> Round {
    Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20).with_seed(11))
        .unwrap()
        .with_equity(UniformEquity)
}

fn balances(r: &Round) -> Vec<u32> {
    r.state().players().iter().map(|p| p.balance()).collect()
}

#[test]
fn blinds_are_posted_and_small_blind_acts_first_heads_up() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    assert_eq!(r.phase(), Phase::Betting(Street::Preflop));
    assert_eq!(r.state().pot(), 30);
    assert_eq!(r.state().current_bet(), 20);
    assert_eq!(balances(&r), vec![990, 980]);
    let req = r.current_request().unwrap();
    assert_eq!(req.player, "Alice");
    assert_eq!(req.owed, 10);
    assert!(r.state().player(0).is_action_pending());
    assert_eq!(r.state().player(0).hole_cards().len(), 2);
    assert_eq!(r.state().player(1).hole_cards().len(), 2);
}

#[test]
fn call_leaves_big_blind_an_option_before_the_flop() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    r.act("Alice", A::Call).unwrap();
    assert_eq!(r.state().pot(), 40);
    // the big blind has not acted yet
    assert_eq!(r.phase(), Phase::Betting(Street::Preflop));
    assert_eq!(r.current_request().unwrap().player, "Bob");
    r.act("Bob", A::Check).unwrap();
    assert_eq!(r.phase(), Phase::Betting(Street::Flop));
    assert_eq!(r.state().community().len(), 3);
    assert_eq!(r.state().current_bet(), 0);
    assert_eq!(r.state().pot(), 40);
}

#[test]
fn check_while_owing_is_rejected_and_reprompted() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    let outcome = r.act("Alice", A::Check).unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Rejected(ActionError::CannotCheck { owed: 10 })
    );
    assert_eq!(r.state().pot(), 30);
    let req = r.current_request().unwrap();
    assert_eq!(req.player, "Alice");
    assert_eq!(req.attempt, 1);
}

#[test]
fn raise_reopens_and_call_closes_the_street() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    let outcome = r.act("Alice", A::Raise(40)).unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Applied(ValidatedAction::Raise { by: 40, total: 50 })
    );
    assert_eq!(r.state().pot(), 80);
    assert_eq!(r.state().current_bet(), 60);
    assert_eq!(r.current_request().unwrap().owed, 40);
    r.act("Bob", A::Call).unwrap();
    assert_eq!(r.state().pot(), 120);
    assert_eq!(r.phase(), Phase::Betting(Street::Flop));
    assert_eq!(balances(&r), vec![940, 940]);
}

#[test]
fn fold_ends_hand_and_rotates_blinds() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    r.act("Alice", A::Fold).unwrap();
    assert_eq!(r.phase(), Phase::Waiting);
    assert_eq!(balances(&r), vec![990, 1010]);
    assert_eq!(r.state().pot(), 0);
    assert_eq!(r.small_blind_index(), 1);
    let summary = r.history().last().unwrap();
    assert!(summary.uncontested);
    assert_eq!(summary.winners, vec!["Bob".to_string()]);
    assert_eq!(summary.last_street, Street::Preflop);

    r.drain_events();
    r.start_hand().unwrap();
    let events = r.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        RoundEvent::HandStarted { hand: 2, small_blind_player, .. } if small_blind_player == "Bob"
    )));
    assert_eq!(balances(&r), vec![970, 1000]);
}

#[test]
fn stacked_deck_showdown_pays_the_best_hand() {
    let mut r = heads_up();
    // seat 0, seat 1, seat 0, seat 1, then flop, turn and river
    let top = parse_cards("As 2c Ad 7d Kh 9s 4c 3h Jd").unwrap();
    r.replace_deck(Deck::stacked(&top)).unwrap();
    r.start_hand().unwrap();
    r.act("Alice", A::Call).unwrap();
    r.act("Bob", A::Check).unwrap();
    for _ in 0..3 {
        r.act("Alice", A::Check).unwrap();
        r.act("Bob", A::Check).unwrap();
    }
    assert_eq!(r.phase(), Phase::Waiting);
    let summary = r.history().last().unwrap();
    assert_eq!(summary.winners, vec!["Alice".to_string()]);
    assert_eq!(summary.pot, 40);
    assert_eq!(summary.share, 40);
    assert_eq!(summary.undistributed, 0);
    assert!(!summary.uncontested);
    assert_eq!(summary.showdown.len(), 2);
    assert_eq!(balances(&r), vec![1020, 980]);

    let rounds: Vec<Street> = r.log().records().iter().map(|rec| rec.round).collect();
    assert_eq!(
        rounds,
        vec![Street::Preflop, Street::Flop, Street::Turn, Street::River]
    );
    let river = r.log().last().unwrap();
    assert_eq!(river.pot, 40);
    assert_eq!(river.community_cards.len(), 5);
    assert_eq!(river.community_cards[0], "K♥");
}

#[test]
fn later_streets_start_at_first_unfolded_seat() {
    let mut r = Round::with_players(["P0", "P1", "P2"], 500, RoundConfig::new(5, 10))
        .unwrap()
        .with_equity(UniformEquity);
    r.start_hand().unwrap();
    // pre-flop starts two seats after the small blind
    assert_eq!(r.current_request().unwrap().player, "P2");
    r.act("P2", A::Call).unwrap();
    r.act("P0", A::Fold).unwrap();
    r.act("P1", A::Check).unwrap();
    assert_eq!(r.phase(), Phase::Betting(Street::Flop));
    assert_eq!(r.current_request().unwrap().player, "P1");
    assert_eq!(r.state().pot(), 25);
}

#[test]
fn short_blind_aborts_without_moving_chips() {
    let mut r = Round::new(
        vec![
            rivertable_engine::player::Player::new("Alice", 1000),
            rivertable_engine::player::Player::new("Bob", 15),
        ],
        RoundConfig::new(10, 20),
    )
    .unwrap();
    let err = r.start_hand().unwrap_err();
    assert!(matches!(
        err,
        GameError::InsufficientBlind { ref player, amount: 20, balance: 15, .. } if player == "Bob"
    ));
    assert_eq!(balances(&r), vec![1000, 15]);
    assert_eq!(r.state().pot(), 0);
    assert_eq!(r.hand_number(), 0);
    assert_eq!(r.phase(), Phase::Waiting);
}

#[test]
fn timeout_and_repeated_invalid_input_fold_the_player() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    assert_eq!(
        r.time_out(0).unwrap(),
        TurnOutcome::ForcedFold(ForcedFoldReason::Timeout)
    );
    assert_eq!(r.phase(), Phase::Waiting);
    assert_eq!(balances(&r), vec![990, 1010]);

    r.start_hand().unwrap();
    // Bob is the small blind now
    assert_eq!(r.current_request().unwrap().seat, 1);
    assert!(matches!(
        r.reject_input(1, "bet big").unwrap(),
        TurnOutcome::Rejected(ActionError::Unrecognised(_))
    ));
    assert!(matches!(
        r.act_seat(1, A::Raise(5000)).unwrap(),
        TurnOutcome::Rejected(ActionError::InsufficientChips { .. })
    ));
    assert_eq!(
        r.reject_input(1, "???").unwrap(),
        TurnOutcome::ForcedFold(ForcedFoldReason::TooManyInvalidActions)
    );
    assert_eq!(balances(&r), vec![1000, 1000]);
    let events = r.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        RoundEvent::ActionRejected { attempts: 2, .. }
    )));
}

#[test]
fn start_twice_and_blinds_change_mid_hand_are_refused() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    assert_eq!(r.start_hand(), Err(GameError::HandInProgress));
    assert_eq!(r.set_blinds(50, 100), Err(GameError::HandInProgress));
    r.act("Alice", A::Fold).unwrap();
    r.set_blinds(50, 100).unwrap();
    assert_eq!(
        r.set_blinds(100, 50),
        Err(GameError::InvalidBlinds {
            small: 100,
            big: 50
        })
    );
    r.start_hand().unwrap();
    assert_eq!(r.state().pot(), 150);
}

#[test]
fn acting_when_no_hand_is_running_is_resolved() {
    let mut r = heads_up();
    assert_eq!(r.act("Alice", A::Check), Err(GameError::RoundResolved));
    assert!(r.current_request().is_none());
}

#[test]
fn unknown_seats_are_refused_by_every_turn_entry_point() {
    let mut r = heads_up();
    r.start_hand().unwrap();
    let missing = |res: Result<TurnOutcome, GameError>| matches!(res, Err(GameError::PlayerNotFound(_)));
    assert!(missing(r.time_out(9)));
    assert!(missing(r.reject_input(9, "shove")));
    assert!(missing(r.act_seat(2, A::Call)));
    // nothing moved and Alice is still on the clock
    assert_eq!(r.state().pot(), 30);
    assert_eq!(r.current_request().unwrap().attempt, 0);
    assert_eq!(r.current_request().unwrap().player, "Alice");
}
