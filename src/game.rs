use crate::bid::Bid;
use crate::dice::{DiceSet, DiceSource, InputError};
use crate::round::{BiddingRound, Decision};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, info};

/// The single random source behind every roll and computer decision in a game.
pub type GameRng = ChaCha8Rng;

pub const MIN_OPPONENTS: usize = 1;
pub const MAX_OPPONENTS: usize = 4;
pub const DEFAULT_DICE: u32 = 5;

/// Stable player identity. The human is always `PlayerId(0)`; computers follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerKind {
    Human,
    Computer,
}

/// How a challenged bid is judged against the revealed dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ResolutionRule {
    /// The bid holds only if the table shows exactly `count` dice of the face.
    #[default]
    Exact,
    /// The bid holds if the table shows at least `count`.
    AtLeast,
}

impl ResolutionRule {
    pub fn holds(self, actual: u32, claimed: u32) -> bool {
        match self {
            ResolutionRule::Exact => actual == claimed,
            ResolutionRule::AtLeast => actual >= claimed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResolutionRule::Exact => "Exact",
            ResolutionRule::AtLeast => "At least",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("opponent count must be between {MIN_OPPONENTS} and {MAX_OPPONENTS}, got {0}")]
    OpponentCount(usize),
    #[error("each player needs at least one die")]
    NoDice,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("no bidding round in progress")]
    NotBidding,
    #[error("waiting for {expected}, not {got}")]
    NotYourTurn { expected: PlayerId, got: PlayerId },
    #[error("the standing bid must be challenged or declined first")]
    ChallengeExpected,
    #[error("a bid is expected, not a challenge decision")]
    BidExpected,
    #[error("invalid bid: {0}")]
    InvalidBid(#[from] crate::bid::BidError),
    #[error("no legal raise remains, the bid must be challenged")]
    NoRaiseAvailable,
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("invalid game state: {0}")]
    InvalidState(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("dice input rejected: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("a round is already in progress")]
    RoundInProgress,
    #[error("the game is over")]
    GameOver,
    #[error("waiting on input for {0}")]
    AwaitingInput(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub player_name: String,
    pub opponents: usize,
    pub dice_per_player: u32,
    pub rule: ResolutionRule,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: "You".to_string(),
            opponents: 3,
            dice_per_player: DEFAULT_DICE,
            rule: ResolutionRule::Exact,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_OPPONENTS..=MAX_OPPONENTS).contains(&self.opponents) {
            return Err(ConfigError::OpponentCount(self.opponents));
        }
        if self.dice_per_player == 0 {
            return Err(ConfigError::NoDice);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) kind: PlayerKind,
    pub(crate) dice_count: u32,
    pub(crate) dice: DiceSet,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    /// Dice the player still owns.
    pub fn dice_count(&self) -> u32 {
        self.dice_count
    }

    /// This round's roll. Empty before the first roll and after elimination.
    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    pub fn is_eliminated(&self) -> bool {
        self.dice_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Outcome {
    HumanEliminated,
    AllOpponentsEliminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Phase {
    /// Waiting for the next roll.
    RoundStart,
    Bidding,
    Over(Outcome),
}

/// The reveal that closes a round.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Resolution {
    pub round: u32,
    pub bid: Bid,
    /// Dice on the table showing the bid's face.
    pub actual: u32,
    pub valid: bool,
    pub loser: PlayerId,
    pub loser_dice_left: u32,
    pub eliminated: Vec<PlayerId>,
    /// Every player's dice as they were when the bid was challenged.
    pub revealed: Vec<(PlayerId, DiceSet)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventKind {
    RoundStarted { total_dice: u32 },
    BidPlaced { bid: Bid },
    ChallengeDeclined { player: PlayerId },
    Challenged { bid: Bid },
    BidResolved { bid: Bid, actual: u32, valid: bool },
    DieLost { player: PlayerId, remaining: u32 },
    PlayerEliminated { player: PlayerId },
    GameEnded { outcome: Outcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct GameEvent {
    pub round: u32,
    pub kind: EventKind,
}

/// Who must act next and what they must decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub player: PlayerId,
    pub decision: Decision,
}

/// Everything one player may see when deciding: its own dice, the standing bid and the
/// number of dice in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub player: PlayerId,
    pub dice: DiceSet,
    pub current: Bid,
    pub total_dice: u32,
}

pub struct Game {
    pub(crate) rule: ResolutionRule,
    pub(crate) dice_per_player: u32,
    pub(crate) seed: u64,
    pub(crate) rng: GameRng,

    /// Active players in turn order; rebuilt after every round.
    pub(crate) roster: Vec<Player>,
    /// Eliminated players, in elimination order.
    pub(crate) out: Vec<Player>,
    pub(crate) round: u32,
    pub(crate) total_dice: u32,
    pub(crate) phase: Phase,
    pub(crate) bidding: Option<BiddingRound>,
    pub(crate) last_resolution: Option<Resolution>,
    dice_source: Option<Box<dyn DiceSource>>,
    history: Vec<GameEvent>,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("rule", &self.rule)
            .field("seed", &self.seed)
            .field("roster", &self.roster)
            .field("round", &self.round)
            .field("total_dice", &self.total_dice)
            .field("phase", &self.phase)
            .field("bidding", &self.bidding)
            .field("dice_source", &self.dice_source.is_some())
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut roster = Vec::with_capacity(config.opponents + 1);
        roster.push(Player {
            id: PlayerId(0),
            name: config.player_name,
            kind: PlayerKind::Human,
            dice_count: config.dice_per_player,
            dice: DiceSet::empty(),
        });
        roster.extend((1..=config.opponents).map(|i| Player {
            id: PlayerId(i),
            name: format!("cpu{i}"),
            kind: PlayerKind::Computer,
            dice_count: config.dice_per_player,
            dice: DiceSet::empty(),
        }));
        let total_dice = config.dice_per_player * roster.len() as u32;
        info!(players = roster.len(), dice = config.dice_per_player, seed, "new game");
        Ok(Self {
            rule: config.rule,
            dice_per_player: config.dice_per_player,
            seed,
            rng: GameRng::seed_from_u64(seed),
            roster,
            out: Vec::new(),
            round: 1,
            total_dice,
            phase: Phase::RoundStart,
            bidding: None,
            last_resolution: None,
            dice_source: None,
            history: Vec::new(),
        })
    }

    /// Read the human's dice from `source` instead of rolling them.
    pub fn set_dice_source(&mut self, source: Box<dyn DiceSource>) {
        self.dice_source = Some(source);
    }

    /// Returns the seed the game's random source started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rule(&self) -> ResolutionRule {
        self.rule
    }

    pub fn dice_per_player(&self) -> u32 {
        self.dice_per_player
    }

    /// Active players in turn order
    pub fn players(&self) -> &[Player] {
        &self.roster
    }

    /// Eliminated players, earliest first
    pub fn eliminated(&self) -> &[Player] {
        &self.out
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.iter().chain(self.out.iter()).find(|p| p.id == id)
    }

    pub fn human(&self) -> Option<&Player> {
        self.player(PlayerId(0))
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_dice(&self) -> u32 {
        self.total_dice
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Over(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn bidding(&self) -> Option<&BiddingRound> {
        self.bidding.as_ref()
    }

    /// The standing bid of the round in progress (or of the last round once resolved).
    pub fn current_bid(&self) -> Bid {
        self.bidding.as_ref().map(|b| b.current_bid()).unwrap_or_else(Bid::null)
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    pub fn pending(&self) -> Option<Pending> {
        if self.phase != Phase::Bidding {
            return None;
        }
        let round = self.bidding.as_ref()?;
        Some(Pending { player: round.actor()?, decision: round.decision()? })
    }

    pub fn turn_view(&self, player: PlayerId) -> Option<TurnView> {
        let p = self.roster.iter().find(|p| p.id == player)?;
        Some(TurnView {
            player,
            dice: p.dice.clone(),
            current: self.current_bid(),
            total_dice: self.total_dice,
        })
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub fn history_recent(&self, n: usize) -> Vec<GameEvent> {
        if n == 0 {
            return Vec::new();
        }
        let len = self.history.len();
        let start = len.saturating_sub(n);
        self.history[start..].to_vec()
    }

    pub fn history_recent_offset(&self, n: usize, offset: usize) -> Vec<GameEvent> {
        if n == 0 {
            return Vec::new();
        }
        let len = self.history.len();
        if len == 0 {
            return Vec::new();
        }
        let max_offset = len.saturating_sub(n);
        let offset = offset.min(max_offset);
        let end = len.saturating_sub(offset);
        let start = end.saturating_sub(n);
        self.history[start..end].to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Roll fresh dice for every active player and open the bidding.
    pub fn start_round(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::Over(_) => return Err(GameError::GameOver),
            Phase::Bidding => return Err(GameError::RoundInProgress),
            Phase::RoundStart => {}
        }
        // Read external dice before touching any state so a bad reading changes nothing.
        let mut detected = None;
        if let Some(source) = self.dice_source.as_mut() {
            if let Some(human) = self.roster.iter().find(|p| p.kind == PlayerKind::Human) {
                let n = human.dice_count as usize;
                detected = Some(DiceSet::from_detected(&source.read_dice(n), n)?);
            }
        }
        for p in &mut self.roster {
            let read = if p.kind == PlayerKind::Human { detected.take() } else { None };
            p.dice = read.unwrap_or_else(|| DiceSet::roll(p.dice_count as usize, &mut self.rng));
        }
        let order = self.roster.iter().map(|p| p.id).collect();
        self.bidding = Some(BiddingRound::new(order));
        self.last_resolution = None;
        self.phase = Phase::Bidding;
        info!(round = self.round, total_dice = self.total_dice, "round started");
        self.record(EventKind::RoundStarted { total_dice: self.total_dice });
        Ok(())
    }

    fn round_mut(&mut self) -> Result<&mut BiddingRound, ActionError> {
        match self.phase {
            Phase::Over(_) => return Err(ActionError::GameOver),
            Phase::RoundStart => return Err(ActionError::NotBidding),
            Phase::Bidding => {}
        }
        self.bidding.as_mut().ok_or(ActionError::NotBidding)
    }

    /// Place the opening bid, or a raise after declining to challenge.
    pub fn place_bid(&mut self, player: PlayerId, count: u32, face: u8) -> Result<Bid, ActionError> {
        let total = self.total_dice;
        let bid = self.round_mut()?.place_bid(player, count, face, total)?;
        debug!(round = self.round, %player, count, face, "bid placed");
        self.record(EventKind::BidPlaced { bid });
        Ok(bid)
    }

    /// Challenge the standing bid or decline. A challenge resolves the round at once.
    pub fn respond(
        &mut self,
        player: PlayerId,
        challenge: bool,
    ) -> Result<Option<Resolution>, ActionError> {
        let total = self.total_dice;
        let terminal = self.round_mut()?.respond(player, challenge, total)?;
        let Some(bid) = terminal else {
            debug!(round = self.round, %player, "challenge declined");
            self.record(EventKind::ChallengeDeclined { player });
            return Ok(None);
        };
        debug!(round = self.round, %player, bid = %bid, "bid challenged");
        self.record(EventKind::Challenged { bid });
        self.resolve(bid).map(Some)
    }

    fn resolve(&mut self, bid: Bid) -> Result<Resolution, ActionError> {
        let (Some(proposer), Some(challenger)) = (bid.proposer(), bid.challenger()) else {
            return Err(ActionError::InvalidState(format!("unchallenged bid resolved: {bid}")));
        };
        let actual: u32 = self.roster.iter().map(|p| p.dice.count(bid.face())).sum();
        let valid = self.rule.holds(actual, bid.count());
        let loser = if valid { challenger } else { proposer };
        let loser_idx = self
            .roster
            .iter()
            .position(|p| p.id == loser)
            .ok_or(ActionError::UnknownPlayer(loser))?;
        let revealed = self.roster.iter().map(|p| (p.id, p.dice.clone())).collect();

        let before = self.roster[loser_idx].dice_count;
        self.roster[loser_idx].dice_count = before.saturating_sub(1);
        self.total_dice = self.total_dice.saturating_sub(1);
        let remaining = self.roster[loser_idx].dice_count;
        info!(round = self.round, bid = %bid, actual, valid, loser = %loser, remaining, "bid resolved");
        self.record(EventKind::BidResolved { bid, actual, valid });
        self.record(EventKind::DieLost { player: loser, remaining });

        let eliminated = self.reseat(loser_idx);
        for &player in &eliminated {
            info!(round = self.round, %player, "player eliminated");
            self.record(EventKind::PlayerEliminated { player });
        }

        let in_play: u32 = self.roster.iter().map(|p| p.dice_count).sum();
        debug_assert_eq!(in_play, self.total_dice, "dice in play out of sync");
        if in_play != self.total_dice {
            return Err(ActionError::InvalidState(format!(
                "{in_play} dice held but {} recorded",
                self.total_dice
            )));
        }

        let resolution = Resolution {
            round: self.round,
            bid,
            actual,
            valid,
            loser,
            loser_dice_left: remaining,
            eliminated,
            revealed,
        };
        self.last_resolution = Some(resolution.clone());
        self.finish_round();
        Ok(resolution)
    }

    /// Rotate so the loser opens the next round, then drop anyone left without dice.
    /// Returns the players removed.
    fn reseat(&mut self, loser_idx: usize) -> Vec<PlayerId> {
        let mut rotated = std::mem::take(&mut self.roster);
        rotated.rotate_left(loser_idx);
        let (active, mut gone): (Vec<Player>, Vec<Player>) =
            rotated.into_iter().partition(|p| p.dice_count > 0);
        for p in &mut gone {
            p.dice.clear();
        }
        let ids = gone.iter().map(|p| p.id).collect();
        self.roster = active;
        self.out.append(&mut gone);
        ids
    }

    fn finish_round(&mut self) {
        let human_alive = self.roster.iter().any(|p| p.kind == PlayerKind::Human);
        let computers_left = self.roster.iter().any(|p| p.kind == PlayerKind::Computer);
        let outcome = if !human_alive {
            Some(Outcome::HumanEliminated)
        } else if !computers_left {
            Some(Outcome::AllOpponentsEliminated)
        } else {
            None
        };
        match outcome {
            Some(outcome) => {
                info!(round = self.round, ?outcome, "game over");
                self.phase = Phase::Over(outcome);
                self.record(EventKind::GameEnded { outcome });
            }
            None => {
                self.phase = Phase::RoundStart;
                self.round += 1;
            }
        }
    }

    fn record(&mut self, kind: EventKind) {
        self.history.push(GameEvent { round: self.round, kind });
    }
}
