use liars_dice::agents::{Agent, AgentTable, ComputerAgent, ComputerProfile};
use liars_dice::game::{EventKind, Game, GameConfig, Outcome, PlayerId, PlayerKind};

fn computer_table(game: &Game) -> AgentTable {
    let mut table = AgentTable::standard(game, ComputerProfile::default());
    table.set_agent(PlayerId::new(0), Some(Agent::Computer(ComputerAgent::default())));
    table
}

fn mk_game(opponents: usize, dice: u32, seed: u64) -> Game {
    Game::new(GameConfig {
        opponents,
        dice_per_player: dice,
        seed: Some(seed),
        ..GameConfig::default()
    })
    .unwrap()
}

fn ids(game: &Game) -> Vec<PlayerId> {
    game.players().iter().map(|p| p.id()).collect()
}

#[test]
fn loser_opens_next_round_and_order_is_kept() {
    for seed in 0..20 {
        let mut game = mk_game(4, 3, seed);
        let mut table = computer_table(&game);
        while !game.is_over() {
            let before = ids(&game);
            let counts: Vec<u32> = game.players().iter().map(|p| p.dice_count()).collect();
            let res = table.play_round(&mut game).unwrap();

            let loser_idx = before.iter().position(|&id| id == res.loser).unwrap();
            assert_eq!(res.loser_dice_left, counts[loser_idx] - 1, "exactly one die lost");

            let mut expected = before.clone();
            expected.rotate_left(loser_idx);
            expected.retain(|id| !res.eliminated.contains(id));
            assert_eq!(ids(&game), expected, "seed {seed} round {}", res.round);

            let held: u32 = game.players().iter().map(|p| p.dice_count()).sum();
            assert_eq!(held, game.total_dice());
        }
    }
}

#[test]
fn only_the_loser_can_be_eliminated() {
    for seed in 0..20 {
        let mut game = mk_game(3, 2, seed);
        let mut table = computer_table(&game);
        while !game.is_over() {
            let res = table.play_round(&mut game).unwrap();
            assert!(res.eliminated.iter().all(|&id| id == res.loser));
            assert_eq!(res.eliminated.is_empty(), res.loser_dice_left > 0);
        }
        let out = game.eliminated().len();
        assert!(out >= 1);
        assert!(game.players().iter().all(|p| p.dice_count() > 0));
    }
}

#[test]
fn computers_never_bid_beyond_dice_in_play() {
    for seed in 0..30 {
        let mut game = mk_game(4, 5, seed);
        let mut table = computer_table(&game);
        table.play(&mut game).unwrap();

        let mut total = 0;
        for event in game.history_recent(game.history_len()) {
            match event.kind {
                EventKind::RoundStarted { total_dice } => total = total_dice,
                EventKind::BidPlaced { bid } => {
                    assert!(bid.count() >= 1 && bid.count() <= total, "{bid} with {total} dice");
                }
                _ => {}
            }
        }
    }
}

#[test]
fn game_ends_when_either_side_is_gone() {
    for seed in 0..10 {
        let mut game = mk_game(2, 2, seed);
        let mut table = computer_table(&game);
        let outcome = table.play(&mut game).unwrap();
        let human_in = game.players().iter().any(|p| p.kind() == PlayerKind::Human);
        let computers_in = game.players().iter().any(|p| p.kind() == PlayerKind::Computer);
        match outcome {
            Outcome::HumanEliminated => assert!(!human_in),
            Outcome::AllOpponentsEliminated => assert!(human_in && !computers_in),
            _ => unreachable!(),
        }
    }
}
