//! Agents: pluggable players for the two kinds of seat at the table.
//!
//! `PlayerAgent` is the capability every seat controller offers, `Agent` is the
//! closed set of controllers (a human fed by a UI or a prompt, or the computer
//! policy) and `AgentTable` coordinates which agent acts for which player. It
//! lives in the library so UIs stay thin and headless drivers need no glue.

use crate::bid::validate_raise;
use crate::engine::{GameEngine, TurnView};
use crate::game::{ActionError, Game, GameError, Outcome, Phase, PlayerId, PlayerKind, Resolution};
use crate::round::Decision;
use core::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub mod computer;

pub use computer::{ChallengeReason, ComputerAgent, ComputerProfile};

/// Player intents, typically produced by a UI for the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    /// Call the standing bid a lie.
    Challenge,
    /// Decline to challenge; a raise must follow.
    Pass,
    /// Open, or raise the standing bid. Implies declining a pending challenge decision.
    Bid { count: u32, face: u8 },
}

/// A seat controller that can act for a player when it is their turn.
pub trait PlayerAgent {
    /// Called when `seat` may be the acting player. Returns whether anything was done.
    fn on_turn(&mut self, engine: &mut dyn GameEngine, seat: PlayerId) -> Result<bool, ActionError>;
    fn kind(&self) -> PlayerKind;
    /// Optionally receive an intent; default is to ignore it and return false.
    fn receive(&mut self, _action: Action) -> bool {
        false
    }
}

/// Blocking source of human decisions, e.g. a console.
///
/// Implementations re-ask until they produce a value; the agent reports rejected
/// values through `rejected` and asks again.
pub trait Prompt {
    /// A `(count, face)` pair for an opening bid or a raise.
    fn bid(&mut self, view: &TurnView) -> (u32, u8);
    /// Whether to challenge `view.current`.
    fn challenge(&mut self, view: &TurnView) -> bool;
    fn rejected(&mut self, _view: &TurnView, _error: &ActionError) {}
}

/// Executes the human's decisions: queued actions first, then the prompt if one is attached.
#[derive(Default)]
pub struct HumanAgent {
    pending: Option<Action>,
    prompt: Option<Box<dyn Prompt>>,
}

impl fmt::Debug for HumanAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HumanAgent")
            .field("pending", &self.pending)
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

impl HumanAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(prompt: Box<dyn Prompt>) -> Self {
        Self { pending: None, prompt: Some(prompt) }
    }

    /// The queued action, if it has not been played yet.
    pub fn pending(&self) -> Option<Action> {
        self.pending
    }

    fn play_action(
        engine: &mut dyn GameEngine,
        seat: PlayerId,
        decision: Decision,
        action: Action,
    ) -> Result<(), ActionError> {
        match (decision, action) {
            (Decision::Challenge, Action::Challenge) => engine.respond(seat, true).map(|_| ()),
            (Decision::Challenge, Action::Pass) => engine.respond(seat, false).map(|_| ()),
            (Decision::Challenge, Action::Bid { count, face }) => {
                // Check the raise before declining so a bad bid leaves the decision open.
                let view = engine.turn_view(seat).ok_or(ActionError::UnknownPlayer(seat))?;
                validate_raise(seat, count, face, &view.current, view.total_dice)?;
                engine.respond(seat, false)?;
                engine.place_bid(seat, count, face).map(|_| ())
            }
            (_, Action::Bid { count, face }) => engine.place_bid(seat, count, face).map(|_| ()),
            (_, Action::Challenge | Action::Pass) => Err(ActionError::BidExpected),
        }
    }

    fn ask(
        prompt: &mut dyn Prompt,
        engine: &mut dyn GameEngine,
        seat: PlayerId,
        decision: Decision,
    ) -> Result<(), ActionError> {
        let view = engine.turn_view(seat).ok_or(ActionError::UnknownPlayer(seat))?;
        if decision == Decision::Challenge {
            loop {
                let challenge = prompt.challenge(&view);
                match engine.respond(seat, challenge) {
                    Ok(Some(_)) => return Ok(()),
                    Ok(None) => break,
                    Err(e @ ActionError::NoRaiseAvailable) => prompt.rejected(&view, &e),
                    Err(e) => return Err(e),
                }
            }
        }
        loop {
            let (count, face) = prompt.bid(&view);
            match engine.place_bid(seat, count, face) {
                Ok(_) => return Ok(()),
                Err(e @ ActionError::InvalidBid(_)) => prompt.rejected(&view, &e),
                Err(e) => return Err(e),
            }
        }
    }
}

impl PlayerAgent for HumanAgent {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }

    fn receive(&mut self, action: Action) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(action);
        true
    }

    fn on_turn(&mut self, engine: &mut dyn GameEngine, seat: PlayerId) -> Result<bool, ActionError> {
        if matches!(engine.phase(), Phase::Over(_)) {
            self.pending = None;
            return Ok(false);
        }
        let Some(pending) = engine.pending().filter(|p| p.player == seat) else {
            return Ok(false);
        };
        if let Some(action) = self.pending.take() {
            return Self::play_action(engine, seat, pending.decision, action).map(|_| true);
        }
        if let Some(prompt) = self.prompt.as_deref_mut() {
            return Self::ask(prompt, engine, seat, pending.decision).map(|_| true);
        }
        Ok(false)
    }
}

/// The two controllers a seat can have.
#[derive(Debug)]
pub enum Agent {
    Human(HumanAgent),
    Computer(ComputerAgent),
}

impl PlayerAgent for Agent {
    fn on_turn(&mut self, engine: &mut dyn GameEngine, seat: PlayerId) -> Result<bool, ActionError> {
        match self {
            Agent::Human(a) => a.on_turn(engine, seat),
            Agent::Computer(a) => a.on_turn(engine, seat),
        }
    }

    fn kind(&self) -> PlayerKind {
        match self {
            Agent::Human(a) => a.kind(),
            Agent::Computer(a) => a.kind(),
        }
    }

    fn receive(&mut self, action: Action) -> bool {
        match self {
            Agent::Human(a) => a.receive(action),
            Agent::Computer(a) => a.receive(action),
        }
    }
}

impl From<HumanAgent> for Agent {
    fn from(agent: HumanAgent) -> Self {
        Agent::Human(agent)
    }
}

impl From<ComputerAgent> for Agent {
    fn from(agent: ComputerAgent) -> Self {
        Agent::Computer(agent)
    }
}

/// Manages one optional agent per player and drives whoever must act next.
pub struct AgentTable {
    seats: Vec<Option<Agent>>,
    min_action_delay: Duration,
    next_action_at: Option<Instant>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String = self
            .seats
            .iter()
            .map(|a| match a.as_ref().map(|ag| ag.kind()) {
                Some(PlayerKind::Human) => 'H',
                Some(_) => 'C',
                None => '-',
            })
            .collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table for `n` players, all without an agent.
    pub fn for_players(n: usize) -> Self {
        let mut seats = Vec::with_capacity(n);
        seats.resize_with(n, || None);
        Self { seats, min_action_delay: Duration::ZERO, next_action_at: None }
    }

    /// A human agent for the human and the computer policy for everyone else.
    pub fn standard(game: &Game, profile: ComputerProfile) -> Self {
        let players = game.players().iter().chain(game.eliminated());
        let mut table = Self::for_players(game.players().len() + game.eliminated().len());
        for p in players {
            let agent = match p.kind() {
                PlayerKind::Human => Agent::Human(HumanAgent::new()),
                _ => Agent::Computer(ComputerAgent::new(profile.clone())),
            };
            table.set_agent(p.id(), Some(agent));
        }
        table
    }

    /// Assign an agent to a player (or remove it with `None`).
    pub fn set_agent(&mut self, player: PlayerId, agent: Option<Agent>) {
        let idx = player.index();
        if idx >= self.seats.len() {
            self.seats.resize_with(idx + 1, || None);
        }
        self.seats[idx] = agent;
    }

    pub fn agent(&self, player: PlayerId) -> Option<&Agent> {
        self.seats.get(player.index()).and_then(Option::as_ref)
    }

    pub fn agent_kind(&self, player: PlayerId) -> Option<PlayerKind> {
        self.agent(player).map(|a| a.kind())
    }

    /// Send an intent to a player's agent, if any.
    pub fn receive(&mut self, player: PlayerId, action: Action) -> bool {
        if let Some(Some(agent)) = self.seats.get_mut(player.index()) {
            return agent.receive(action);
        }
        false
    }

    pub fn has_agent(&self, player: PlayerId) -> bool {
        self.agent(player).is_some()
    }

    /// Set a minimum delay between computer actions.
    pub fn set_min_action_delay_ms(&mut self, delay_ms: u64) {
        self.min_action_delay = Duration::from_millis(delay_ms);
    }

    /// Drive the agent of the acting player, throttling computers by the minimum delay.
    pub fn on_turn(&mut self, engine: &mut dyn GameEngine) -> Result<bool, ActionError> {
        let Some(pending) = engine.pending() else {
            return Ok(false);
        };
        let Some(Some(agent)) = self.seats.get_mut(pending.player.index()) else {
            return Ok(false);
        };
        let now = Instant::now();
        let is_computer = agent.kind() == PlayerKind::Computer;
        if is_computer && self.next_action_at.is_some_and(|next| now < next) {
            return Ok(false);
        }
        let acted = agent.on_turn(engine, pending.player)?;
        if acted && self.min_action_delay > Duration::ZERO {
            self.next_action_at = Some(now + self.min_action_delay);
        }
        Ok(acted)
    }

    /// Drive `player`'s agent immediately, without throttling.
    pub fn act(&mut self, engine: &mut dyn GameEngine, player: PlayerId) -> Result<bool, ActionError> {
        match self.seats.get_mut(player.index()) {
            Some(Some(agent)) => agent.on_turn(engine, player),
            _ => Ok(false),
        }
    }

    /// Play one round to its resolution, starting it first if needed.
    ///
    /// Fails with `AwaitingInput` when the acting player's agent has nothing to play.
    pub fn play_round(&mut self, game: &mut Game) -> Result<Resolution, GameError> {
        match game.phase() {
            Phase::Over(_) => return Err(GameError::GameOver),
            Phase::RoundStart => game.start_round()?,
            Phase::Bidding => {}
        }
        while let Some(pending) = game.pending() {
            if !self.act(game, pending.player)? {
                debug!(player = %pending.player, "agent has no input");
                return Err(GameError::AwaitingInput(pending.player));
            }
        }
        game.last_resolution().cloned().ok_or_else(|| {
            warn!(round = game.round(), "bidding ended without a resolution");
            ActionError::InvalidState("bidding ended without a resolution".into()).into()
        })
    }

    /// Play rounds until the game ends.
    pub fn play(&mut self, game: &mut Game) -> Result<Outcome, GameError> {
        loop {
            if let Some(outcome) = game.outcome() {
                return Ok(outcome);
            }
            self.play_round(game)?;
        }
    }

    /// Remove all agents.
    pub fn clear(&mut self) {
        for a in &mut self.seats {
            *a = None;
        }
        self.next_action_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use std::thread;

    fn mk_game(opponents: usize, dice: u32) -> Game {
        Game::new(GameConfig {
            opponents,
            dice_per_player: dice,
            seed: Some(11),
            ..GameConfig::default()
        })
        .unwrap()
    }

    /// Opens with one ace and challenges whenever asked.
    struct AlwaysChallenge;

    impl Prompt for AlwaysChallenge {
        fn bid(&mut self, _view: &TurnView) -> (u32, u8) {
            (1, 1)
        }
        fn challenge(&mut self, _view: &TurnView) -> bool {
            true
        }
    }

    #[test]
    fn standard_table_assigns_one_agent_per_player() {
        let g = mk_game(3, 5);
        let table = AgentTable::standard(&g, ComputerProfile::default());
        assert_eq!(table.agent_kind(PlayerId::new(0)), Some(PlayerKind::Human));
        for i in 1..=3 {
            assert_eq!(table.agent_kind(PlayerId::new(i)), Some(PlayerKind::Computer));
        }
        assert!(!table.has_agent(PlayerId::new(4)));
        assert_eq!(format!("{table:?}"), "AgentTable(HCCC)");
    }

    #[test]
    fn human_without_input_blocks_the_round() {
        let mut g = mk_game(2, 5);
        let mut table = AgentTable::standard(&g, ComputerProfile::default());
        // The human sits first and opens round one.
        assert_eq!(table.play_round(&mut g), Err(GameError::AwaitingInput(PlayerId::new(0))));
        assert_eq!(g.phase(), Phase::Bidding);
    }

    #[test]
    fn queued_bid_opens_the_round() {
        let mut g = mk_game(1, 5);
        let mut table = AgentTable::standard(&g, ComputerProfile::default());
        g.start_round().unwrap();
        assert!(table.receive(PlayerId::new(0), Action::Bid { count: 2, face: 3 }));
        assert!(!table.receive(PlayerId::new(0), Action::Pass), "one queued action at a time");
        assert!(table.act(&mut g, PlayerId::new(0)).unwrap());
        assert_eq!((g.current_bid().count(), g.current_bid().face()), (2, 3));
    }

    #[test]
    fn rejected_raise_leaves_challenge_decision_open() {
        let mut g = mk_game(1, 5);
        let mut human = HumanAgent::new();
        g.start_round().unwrap();
        g.place_bid(PlayerId::new(0), 2, 3).unwrap();
        g.respond(PlayerId::new(1), false).unwrap();
        g.place_bid(PlayerId::new(1), 3, 3).unwrap();

        human.receive(Action::Bid { count: 2, face: 6 });
        let err = human.on_turn(&mut g, PlayerId::new(0)).unwrap_err();
        assert!(matches!(err, ActionError::InvalidBid(_)));
        assert_eq!(g.pending().map(|p| p.decision), Some(Decision::Challenge));

        human.receive(Action::Bid { count: 3, face: 4 });
        assert!(human.on_turn(&mut g, PlayerId::new(0)).unwrap());
        assert_eq!((g.current_bid().count(), g.current_bid().face()), (3, 4));
    }

    #[test]
    fn pass_during_opening_is_rejected() {
        let mut g = mk_game(1, 5);
        let mut human = HumanAgent::new();
        g.start_round().unwrap();
        human.receive(Action::Pass);
        assert_eq!(human.on_turn(&mut g, PlayerId::new(0)), Err(ActionError::BidExpected));
    }

    #[test]
    fn prompted_game_plays_to_the_end() {
        let mut g = mk_game(2, 2);
        let mut table = AgentTable::standard(&g, ComputerProfile::default());
        table.set_agent(
            PlayerId::new(0),
            Some(Agent::Human(HumanAgent::with_prompt(Box::new(AlwaysChallenge)))),
        );
        let outcome = table.play(&mut g).unwrap();
        assert_eq!(g.outcome(), Some(outcome));
        let active: u32 = g.players().iter().map(|p| p.dice_count()).sum();
        assert_eq!(active, g.total_dice());
    }

    #[test]
    fn computer_actions_are_throttled() {
        let mut g = mk_game(1, 5);
        let mut table = AgentTable::standard(&g, ComputerProfile::default());
        table.set_min_action_delay_ms(30);
        g.start_round().unwrap();
        table.receive(PlayerId::new(0), Action::Bid { count: 1, face: 2 });
        assert!(table.on_turn(&mut g).unwrap(), "human acts");

        // The computer waits out the delay started by the human's action.
        assert!(!table.on_turn(&mut g).unwrap());
        assert_eq!(g.pending().map(|p| p.player), Some(PlayerId::new(1)));
        thread::sleep(Duration::from_millis(40));
        assert!(table.on_turn(&mut g).unwrap());
    }

    #[test]
    fn over_game_is_a_noop() {
        let mut g = mk_game(1, 1);
        let mut table = AgentTable::standard(&g, ComputerProfile::default());
        table.set_agent(
            PlayerId::new(0),
            Some(Agent::Human(HumanAgent::with_prompt(Box::new(AlwaysChallenge)))),
        );
        table.play(&mut g).unwrap();
        assert!(!table.on_turn(&mut g).unwrap());
        assert_eq!(table.play_round(&mut g), Err(GameError::GameOver));
    }
}
