use liars_dice::bid::BidError;
use liars_dice::dice::ScriptedDice;
use liars_dice::game::{
    ActionError, Game, GameConfig, GameError, Outcome, Phase, PlayerId, ResolutionRule,
};

const HUMAN: PlayerId = PlayerId::new(0);
const CPU: PlayerId = PlayerId::new(1);

/// Heads-up game whose human roll is fixed and whose opponent rolled no `face`.
fn heads_up_without(human_roll: Vec<u8>, face: u8, dice: u32) -> Game {
    for seed in 0..200 {
        let mut game = Game::new(GameConfig {
            opponents: 1,
            dice_per_player: dice,
            seed: Some(seed),
            ..GameConfig::default()
        })
        .unwrap();
        game.set_dice_source(Box::new(ScriptedDice::new([human_roll.clone()])));
        game.start_round().unwrap();
        if game.player(CPU).unwrap().dice().count(face) == 0 {
            return game;
        }
    }
    panic!("no seed rolled without {face}");
}

#[test]
fn true_bid_costs_the_challenger_a_die() {
    let mut game = heads_up_without(vec![3, 3, 3, 3, 1], 3, 5);
    assert_eq!(game.total_dice(), 10);

    game.place_bid(HUMAN, 4, 3).unwrap();
    let res = game.respond(CPU, true).unwrap().unwrap();
    assert_eq!(res.actual, 4);
    assert!(res.valid);
    assert_eq!(res.loser, CPU);

    assert_eq!(game.player(HUMAN).unwrap().dice_count(), 5);
    assert_eq!(game.player(CPU).unwrap().dice_count(), 4);
    assert_eq!(game.total_dice(), 9);
    assert_eq!(game.players()[0].id(), CPU, "former challenger opens next");
    assert_eq!(game.phase(), Phase::RoundStart);
    assert_eq!(game.round(), 2);
}

#[test]
fn bid_above_dice_in_play_is_rejected() {
    let mut game = heads_up_without(vec![3, 3, 3, 3, 1], 3, 5);
    let err = game.place_bid(HUMAN, 11, 3).unwrap_err();
    assert_eq!(err, ActionError::InvalidBid(BidError::ExceedsDice { count: 11, total: 10 }));
    assert!(game.current_bid().is_null(), "rejected bid changes nothing");
    assert_eq!(game.pending().map(|p| p.player), Some(HUMAN));
}

#[test]
fn overclaim_fails_under_exact_rule() {
    let mut game = heads_up_without(vec![3, 3, 3, 3, 1], 3, 5);
    game.place_bid(HUMAN, 3, 3).unwrap();
    let res = game.respond(CPU, true).unwrap().unwrap();
    assert!(!res.valid, "four threes on the table, not three");
    assert_eq!(res.loser, HUMAN);
    assert_eq!(game.players()[0].id(), HUMAN);
}

#[test]
fn at_least_rule_accepts_overclaim() {
    for seed in 0..200 {
        let mut game = Game::new(GameConfig {
            opponents: 1,
            seed: Some(seed),
            rule: ResolutionRule::AtLeast,
            ..GameConfig::default()
        })
        .unwrap();
        game.set_dice_source(Box::new(ScriptedDice::new([vec![3, 3, 3, 3, 1]])));
        game.start_round().unwrap();
        if game.player(CPU).unwrap().dice().count(3) != 0 {
            continue;
        }
        game.place_bid(HUMAN, 3, 3).unwrap();
        let res = game.respond(CPU, true).unwrap().unwrap();
        assert!(res.valid);
        assert_eq!(res.loser, CPU);
        return;
    }
    panic!("no seed rolled without a three");
}

#[test]
fn human_losing_last_die_ends_the_game() {
    let mut game = heads_up_without(vec![2], 2, 1);
    game.place_bid(HUMAN, 2, 2).unwrap();
    let res = game.respond(CPU, true).unwrap().unwrap();
    assert!(!res.valid);
    assert_eq!(res.eliminated, vec![HUMAN]);

    assert_eq!(game.phase(), Phase::Over(Outcome::HumanEliminated));
    assert!(game.human().unwrap().is_eliminated());
    assert_eq!(game.start_round(), Err(GameError::GameOver));
    assert_eq!(game.place_bid(CPU, 1, 1), Err(ActionError::GameOver));
}

#[test]
fn bad_detected_dice_leave_the_round_unstarted() {
    let mut game = Game::new(GameConfig { opponents: 2, ..GameConfig::default() }).unwrap();
    game.set_dice_source(Box::new(ScriptedDice::new([vec![1, 2, 3]])));
    assert!(matches!(game.start_round(), Err(GameError::Input(_))));
    assert_eq!(game.phase(), Phase::RoundStart);
    assert_eq!(game.history_len(), 0);
}
