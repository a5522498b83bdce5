use rivertable_ai::{create_ai_seeded, BotSeats, AI_KINDS};
use rivertable_engine::equity::UniformEquity;
use rivertable_engine::events::NoopObserver;
use rivertable_engine::round::{Round, RoundConfig};

#[test]
fn bots_play_many_hands_without_losing_chips() {
    let names = ["Ann", "Ben", "Cat"];
    let mut bots = BotSeats::new();
    for (i, (name, kind)) in names.iter().zip(AI_KINDS).enumerate() {
        bots.seat(*name, create_ai_seeded(kind, i as u64).unwrap());
    }
    let mut round = Round::with_players(names, 5000, RoundConfig::new(10, 20).with_seed(77))
        .unwrap()
        .with_equity(UniformEquity);

    let mut undistributed = 0;
    for _ in 0..25 {
        let summary = round.play_round(&mut bots, &mut NoopObserver).unwrap();
        undistributed += summary.undistributed;
        assert_eq!(round.state().total_chips() + undistributed, 15_000);
    }
    assert_eq!(round.history().len(), 25);
}
