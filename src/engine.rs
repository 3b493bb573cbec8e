// Game engine API boundary. This trait exposes the bidding actions and the queries a
// player is allowed to make, so UIs and computer agents can drive the game without
// depending on its internals. It is implemented for the core `Game` type.

use crate::bid::Bid;
use crate::game::{ActionError, Game, GameError, Phase, PlayerId, Resolution};
use rand::RngCore;

pub use crate::game::{Pending, TurnView};

pub trait GameEngine {
    // Round lifecycle
    fn start_round(&mut self) -> Result<(), GameError>;

    // Player actions
    fn place_bid(&mut self, player: PlayerId, count: u32, face: u8) -> Result<Bid, ActionError>;
    fn respond(
        &mut self,
        player: PlayerId,
        challenge: bool,
    ) -> Result<Option<Resolution>, ActionError>;

    // Queries
    fn pending(&self) -> Option<Pending>;
    fn turn_view(&self, player: PlayerId) -> Option<TurnView>;
    fn phase(&self) -> Phase;
    fn round(&self) -> u32;
    fn total_dice(&self) -> u32;

    /// The game's shared random source.
    fn rng(&mut self) -> &mut dyn RngCore;
}

impl GameEngine for Game {
    fn start_round(&mut self) -> Result<(), GameError> {
        self.start_round()
    }

    fn place_bid(&mut self, player: PlayerId, count: u32, face: u8) -> Result<Bid, ActionError> {
        self.place_bid(player, count, face)
    }
    fn respond(
        &mut self,
        player: PlayerId,
        challenge: bool,
    ) -> Result<Option<Resolution>, ActionError> {
        self.respond(player, challenge)
    }

    fn pending(&self) -> Option<Pending> {
        self.pending()
    }
    fn turn_view(&self, player: PlayerId) -> Option<TurnView> {
        self.turn_view(player)
    }
    fn phase(&self) -> Phase {
        self.phase
    }
    fn round(&self) -> u32 {
        self.round
    }
    fn total_dice(&self) -> u32 {
        self.total_dice
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}
