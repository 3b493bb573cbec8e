//! liars-dice: a Liar's Dice engine with computer opponents
//!
//! Goals:
//! - Pure, deterministic game core: every roll and computer decision draws from one
//!   seedable source
//! - Bid legality and the probability model usable on their own
//! - No panics for invalid input; use `Result` for recoverable errors
//!
//! ## Quick start: play a game headless
//! ```
//! use liars_dice::agents::{AgentTable, Agent, ComputerAgent, ComputerProfile};
//! use liars_dice::game::{Game, GameConfig, PlayerId};
//!
//! let mut game = Game::new(GameConfig { seed: Some(7), ..GameConfig::default() }).unwrap();
//! let mut table = AgentTable::standard(&game, ComputerProfile::default());
//! // Let the computer policy play the human's seat too.
//! table.set_agent(PlayerId::new(0), Some(Agent::Computer(ComputerAgent::default())));
//!
//! let outcome = table.play(&mut game).unwrap();
//! assert_eq!(game.outcome(), Some(outcome));
//! ```
//!
//! ## Bid legality
//! ```
//! use liars_dice::bid::{is_legal_raise, Bid};
//! use liars_dice::game::PlayerId;
//!
//! let current = Bid::try_new(PlayerId::new(1), 3, 4).unwrap();
//! let raise = Bid::try_new(PlayerId::new(2), 3, 5).unwrap();
//! assert!(is_legal_raise(&raise, &current));
//! assert!(!is_legal_raise(&current, &raise));
//! ```
//!
//! ## TUI
//! Run the interactive TUI with:
//! ```sh
//! cargo run --bin liars-dice
//! ```

pub mod agents;
pub mod bid;
pub mod dice;
pub mod engine;
pub mod game;
pub mod probability;
pub mod round;
pub mod tui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
