use liars_dice::game::{GameConfig, Phase};
use liars_dice::tui::app::{AppState, InputAction, Scene};

fn setup_table_app() -> AppState {
    let mut app = AppState::new(GameConfig { seed: Some(3), ..GameConfig::default() }).unwrap();
    app.apply_menu();
    app
}

#[test]
fn menu_navigation_and_apply() {
    let mut app = AppState::new(GameConfig::default()).unwrap();
    assert!(matches!(app.scene, Scene::Menu));
    let start = app.menu_index;
    let _ = app.handle_input(InputAction::MenuNext);
    assert_ne!(app.menu_index, start);
    let _ = app.handle_input(InputAction::MenuPrev);
    assert_eq!(app.menu_index, start);
    let _ = app.handle_input(InputAction::MenuApply);
    assert!(matches!(app.scene, Scene::Table));
}

#[test]
fn menu_opponents_stay_in_range() {
    let mut app = AppState::new(GameConfig::default()).unwrap();
    for _ in 0..10 {
        let _ = app.handle_input(InputAction::MenuInc);
    }
    assert_eq!(app.cfg.opponents, 4);
    for _ in 0..10 {
        let _ = app.handle_input(InputAction::MenuDec);
    }
    assert_eq!(app.cfg.opponents, 1);
    let _ = app.handle_input(InputAction::MenuApply);
    assert_eq!(app.game.players().len(), 2);
}

#[test]
fn help_and_history_toggle() {
    let mut app = setup_table_app();
    let _ = app.handle_input(InputAction::ToggleHelp);
    assert!(app.help_open());
    let _ = app.handle_input(InputAction::ToggleHistory);
    assert!(!app.help_open());
    assert!(app.history_open());
    let _ = app.handle_input(InputAction::ToggleHistory);
    assert!(!app.history_open());
}

#[test]
fn space_rolls_the_first_round() {
    let mut app = setup_table_app();
    assert_eq!(app.game.phase(), Phase::RoundStart);
    let _ = app.handle_input(InputAction::NextRound);
    assert_eq!(app.game.phase(), Phase::Bidding);
    assert_eq!(app.game.human().unwrap().dice().len(), 5);
}

#[test]
fn bid_entry_edit_and_cancel() {
    let mut app = setup_table_app();
    let _ = app.handle_input(InputAction::NextRound);

    assert!(app.handle_input(InputAction::BidOpen));
    assert!(app.bid_entry_active());
    assert_eq!(app.bid_entry_text(), Some("1 1"));

    let _ = app.handle_input(InputAction::BidChar('5'));
    assert_eq!(app.bid_entry_text(), Some("1 15"));
    let _ = app.handle_input(InputAction::BidChar('x'));
    assert_eq!(app.bid_entry_text(), Some("1 15"), "only digits and spaces");

    let _ = app.handle_input(InputAction::BidBackspace);
    assert_eq!(app.bid_entry_text(), Some("1 1"));

    let _ = app.handle_input(InputAction::BidCancel);
    assert!(!app.bid_entry_active());
}

#[test]
fn opening_bid_hands_turn_to_computer() {
    let mut app = setup_table_app();
    let _ = app.handle_input(InputAction::NextRound);
    let _ = app.handle_input(InputAction::BidOpen);
    assert!(app.handle_input(InputAction::BidSubmit));
    app.agents_on_turn();
    assert!(app.human_decision().is_none(), "a computer acts next");
    assert_eq!(app.game.current_bid().face(), 1);
}
