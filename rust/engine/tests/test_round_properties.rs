use rivertable_engine::betting::{ActionRequest, SourceError};
use rivertable_engine::equity::UniformEquity;
use rivertable_engine::errors::GameError;
use rivertable_engine::events::{NoopObserver, RoundEvent, RoundObserver};
use rivertable_engine::hand::{HandStrength, WinnerRanking};
use rivertable_engine::logger::Street;
use rivertable_engine::player::PlayerAction as A;
use rivertable_engine::round::{Phase, Round, RoundConfig};
use rivertable_engine::snapshot::CardView;

/// Ranks every remaining hand as a winner.
struct EveryoneTies;

impl WinnerRanking for EveryoneTies {
    fn winners(&self, hands: &[(String, HandStrength)]) -> Vec<String> {
        hands.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[derive(Default)]
struct Recorder {
    streets: Vec<Street>,
    events: usize,
}

impl RoundObserver for Recorder {
    fn on_street_start(&mut self, street: Street) {
        self.streets.push(street);
    }
    fn on_event(&mut self, _event: &RoundEvent) {
        self.events += 1;
    }
}

fn check_or_call(req: &ActionRequest) -> Result<A, SourceError> {
    Ok(if req.owed == 0 { A::Check } else { A::Call })
}

#[test]
fn three_way_tie_floors_the_split_and_flags_the_remainder() {
    let mut r = Round::with_players(["P0", "P1", "P2", "P3"], 1000, RoundConfig::new(10, 20))
        .unwrap()
        .with_equity(UniformEquity)
        .with_ranking(EveryoneTies);
    r.start_hand().unwrap();
    r.act("P2", A::Call).unwrap();
    r.act("P3", A::Call).unwrap();
    r.act("P0", A::Fold).unwrap();
    r.act("P1", A::Check).unwrap();
    assert_eq!(r.state().pot(), 70);
    assert_eq!(r.phase(), Phase::Betting(Street::Flop));

    r.act("P1", A::Raise(10)).unwrap();
    r.act("P2", A::Call).unwrap();
    r.act("P3", A::Call).unwrap();
    assert_eq!(r.state().pot(), 100);
    for _ in 0..2 {
        for name in ["P1", "P2", "P3"] {
            r.act(name, A::Check).unwrap();
        }
    }
    assert_eq!(r.phase(), Phase::Waiting);

    let summary = r.history().last().unwrap().clone();
    assert_eq!(summary.winners, vec!["P1", "P2", "P3"]);
    assert_eq!(summary.share, 33);
    assert_eq!(summary.undistributed, 1);
    let balances: Vec<u32> = r.state().players().iter().map(|p| p.balance()).collect();
    assert_eq!(balances, vec![990, 1003, 1003, 1003]);
    assert_eq!(r.state().total_chips(), 3999);

    let events = r.drain_events();
    assert!(events.contains(&RoundEvent::PotAwarded {
        winners: vec!["P1".into(), "P2".into(), "P3".into()],
        share: 33,
        undistributed: 1,
        uncontested: false,
    }));
}

#[test]
fn chips_are_conserved_across_many_hands() {
    let mut r = Round::with_players(
        ["Ann", "Ben", "Cat", "Dan", "Eve"],
        2000,
        RoundConfig::new(10, 20).with_seed(2024),
    )
    .unwrap()
    .with_equity(UniformEquity);
    let mut turn = 0u32;
    let mut source = |req: &ActionRequest| -> Result<A, SourceError> {
        turn += 1;
        Ok(match turn % 7 {
            0 if req.balance > req.owed + 30 => A::Raise(30),
            3 if req.owed > 0 => A::Fold,
            _ if req.owed == 0 => A::Check,
            _ => A::Call,
        })
    };
    let mut lost = 0;
    for _ in 0..40 {
        let summary = r.play_round(&mut source, &mut NoopObserver).unwrap();
        lost += summary.undistributed;
        assert_eq!(r.state().pot(), 0);
        assert_eq!(r.state().total_chips() + lost, 10_000);
        assert!(r
            .state()
            .players()
            .iter()
            .all(|p| p.hole_cards().is_empty() && !p.is_folded()));
    }
    assert_eq!(r.hand_number(), 40);
    assert_eq!(r.history().len(), 40);
}

#[test]
fn play_round_checks_down_and_cues_every_street() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20).with_seed(3))
        .unwrap()
        .with_equity(UniformEquity);
    let mut observer = Recorder::default();
    let summary = r
        .play_round(&mut check_or_call, &mut observer)
        .unwrap();
    assert_eq!(summary.pot, 40);
    assert_eq!(summary.last_street, Street::River);
    assert_eq!(
        observer.streets,
        vec![Street::Preflop, Street::Flop, Street::Turn, Street::River]
    );
    assert!(observer.events > 10);
    assert_eq!(r.log().len(), 4);
    assert_eq!(r.state().total_chips(), 2000);
}

#[test]
fn cancelled_source_refunds_and_reports_the_street() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20))
        .unwrap()
        .with_equity(UniformEquity);
    let mut calls = 0;
    let mut source = |req: &ActionRequest| -> Result<A, SourceError> {
        calls += 1;
        if req.street == Street::Flop {
            return Err(SourceError::Cancelled("window closed".into()));
        }
        check_or_call(req)
    };
    let err = r.play_round(&mut source, &mut NoopObserver).unwrap_err();
    assert_eq!(
        err,
        GameError::ActionCancelled {
            street: Street::Flop,
            reason: "window closed".into()
        }
    );
    assert_eq!(r.phase(), Phase::Waiting);
    let balances: Vec<u32> = r.state().players().iter().map(|p| p.balance()).collect();
    assert_eq!(balances, vec![1000, 1000]);
    assert!(r.history().is_empty());
    assert_eq!(calls, 3);
}

#[test]
fn reset_mid_hand_refunds_and_clears_the_board() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20))
        .unwrap()
        .with_equity(UniformEquity);
    r.start_hand().unwrap();
    r.act("Alice", A::Raise(40)).unwrap();
    r.act("Bob", A::Call).unwrap();
    assert_eq!(r.state().community().len(), 3);
    r.reset();
    assert_eq!(r.phase(), Phase::Waiting);
    assert_eq!(r.state().pot(), 0);
    assert_eq!(r.state().current_bet(), 0);
    assert!(r.state().community().is_empty());
    assert_eq!(r.small_blind_index(), 1);
    for p in r.state().players() {
        assert_eq!(p.balance(), 1000);
        assert!(p.hole_cards().is_empty());
        assert!(!p.is_folded());
    }
    assert!(r.snapshot().community_cards.iter().all(|c| *c == CardView::Down));
}

#[test]
fn place_bet_maps_amounts_to_actions() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20))
        .unwrap()
        .with_equity(UniformEquity);
    r.start_hand().unwrap();
    assert!(matches!(
        r.place_bet("Alice", 5),
        Err(GameError::InvalidAmount { amount: 5, .. })
    ));
    assert!(matches!(
        r.place_bet("Bob", 0),
        Err(GameError::NotPlayersTurn { .. })
    ));
    assert_eq!(
        r.place_bet("Mallory", 10),
        Err(GameError::PlayerNotFound("Mallory".into()))
    );
    r.place_bet("Alice", 10).unwrap();
    r.place_bet("Bob", 0).unwrap();
    assert_eq!(r.phase(), Phase::Betting(Street::Flop));

    let raised = r.place_bet("Alice", 30).unwrap();
    assert_eq!(raised.committed(), 30);
    assert_eq!(r.state().current_bet(), 30);
    assert!(matches!(
        r.place_bet("Bob", 5000),
        Err(GameError::InvalidAmount { amount: 5000, .. })
    ));
    // the rejected amount did not count against Bob
    assert_eq!(r.current_request().unwrap().attempt, 0);
    r.place_bet("Bob", 30).unwrap();
    assert_eq!(r.state().pot(), 100);
    assert_eq!(r.phase(), Phase::Betting(Street::Turn));
}

#[test]
fn out_of_turn_fold_is_accepted() {
    let mut r = Round::with_players(["P0", "P1", "P2"], 500, RoundConfig::new(5, 10))
        .unwrap()
        .with_equity(UniformEquity);
    r.start_hand().unwrap();
    assert_eq!(r.current_request().unwrap().player, "P2");
    r.fold_player("P1").unwrap();
    assert!(r.state().player(1).is_folded());
    assert_eq!(r.current_request().unwrap().player, "P2");
    assert_eq!(
        r.fold_player("P1"),
        Err(GameError::PlayerAlreadyFolded("P1".into()))
    );
    r.fold_player("P2").unwrap();
    // P0 is the only player left
    assert_eq!(r.phase(), Phase::Waiting);
    let balances: Vec<u32> = r.state().players().iter().map(|p| p.balance()).collect();
    assert_eq!(balances, vec![510, 490, 500]);
    assert_eq!(r.fold_player("P0"), Err(GameError::RoundResolved));
}

#[test]
fn snapshot_reflects_the_table() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20))
        .unwrap()
        .with_equity(UniformEquity);
    r.start_hand().unwrap();
    let snap = r.snapshot();
    assert_eq!(snap.hand, 1);
    assert_eq!(snap.phase, Phase::Betting(Street::Preflop));
    assert_eq!(snap.pot, 30);
    assert_eq!(snap.current_bet, 20);
    assert_eq!(snap.dealer_index, 0);
    assert_eq!(snap.community_cards.len(), 5);
    assert_eq!(snap.players[0].bet, 10);
    assert_eq!(snap.players[1].bet, 20);
    assert!(snap.players[0].action_pending);
    assert!(!snap.players[1].action_pending);
    assert_eq!(snap.players[0].prob_win, 50.0);
    assert_eq!(snap.players[0].hand.len(), 2);

    r.fold_player("Alice").unwrap();
    let snap = r.snapshot();
    assert_eq!(snap.players[0].pnl, vec![990]);
    assert_eq!(snap.players[1].pnl, vec![1010]);
    assert_eq!(snap.dealer_index, 1);
}

#[test]
fn street_log_exports_csv() {
    let mut r = Round::with_players(["Alice", "Bob"], 1000, RoundConfig::new(10, 20).with_seed(5))
        .unwrap()
        .with_equity(UniformEquity);
    r.play_round(&mut check_or_call, &mut NoopObserver).unwrap();
    let mut buf = Vec::new();
    r.log().write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "round,pot,community_cards,player_bets,player_balances");
    assert!(lines[1].starts_with("Pre-Flop,40,"));
    assert!(lines[1].contains("Alice: 20"));
}
