//! One round of bidding: an opening bid, then each player in turn either challenges the
//! standing bid or raises it. The first challenge resolves the round.

use crate::bid::{has_legal_raise, validate_raise, Bid};
use crate::game::{ActionError, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundState {
    AwaitingFirstBid,
    AwaitingResponse,
    Resolved,
}

/// What the acting player must decide next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Decision {
    /// Open the round; never a challenge.
    OpeningBid,
    /// Challenge the standing bid or decline.
    Challenge,
    /// Having declined to challenge, raise the standing bid.
    Raise,
}

#[derive(Debug, Clone)]
pub struct BiddingRound {
    order: Vec<PlayerId>,
    turn: usize,
    current: Bid,
    state: RoundState,
    declined: bool,
    bids: u32,
}

impl BiddingRound {
    /// Start a round over `order`; the player at position 0 opens.
    pub fn new(order: Vec<PlayerId>) -> Self {
        Self {
            order,
            turn: 0,
            current: Bid::null(),
            state: RoundState::AwaitingFirstBid,
            declined: false,
            bids: 0,
        }
    }

    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn current_bid(&self) -> Bid {
        self.current
    }

    /// Number of bids placed so far, the opening bid included.
    pub fn bids(&self) -> u32 {
        self.bids
    }

    /// The player whose decision the round is waiting for.
    pub fn actor(&self) -> Option<PlayerId> {
        if self.state == RoundState::Resolved {
            return None;
        }
        self.order.get(self.turn).copied()
    }

    pub fn decision(&self) -> Option<Decision> {
        match self.state {
            RoundState::AwaitingFirstBid => Some(Decision::OpeningBid),
            RoundState::AwaitingResponse if self.declined => Some(Decision::Raise),
            RoundState::AwaitingResponse => Some(Decision::Challenge),
            RoundState::Resolved => None,
        }
    }

    /// The challenged bid, once the round is over.
    pub fn outcome(&self) -> Option<Bid> {
        (self.state == RoundState::Resolved).then_some(self.current)
    }

    fn ensure_actor(&self, player: PlayerId) -> Result<(), ActionError> {
        match self.actor() {
            None => Err(ActionError::NotBidding),
            Some(expected) if expected != player => {
                Err(ActionError::NotYourTurn { expected, got: player })
            }
            Some(_) => Ok(()),
        }
    }

    /// Place the opening bid or a raise after declining to challenge.
    pub fn place_bid(
        &mut self,
        player: PlayerId,
        count: u32,
        face: u8,
        total_dice: u32,
    ) -> Result<Bid, ActionError> {
        self.ensure_actor(player)?;
        if self.decision() == Some(Decision::Challenge) {
            return Err(ActionError::ChallengeExpected);
        }
        let bid = validate_raise(player, count, face, &self.current, total_dice)?;
        self.current = bid;
        self.state = RoundState::AwaitingResponse;
        self.declined = false;
        self.bids += 1;
        self.advance();
        Ok(bid)
    }

    /// Answer the challenge question. Returns the terminal bid when `challenge` is true.
    pub fn respond(
        &mut self,
        player: PlayerId,
        challenge: bool,
        total_dice: u32,
    ) -> Result<Option<Bid>, ActionError> {
        self.ensure_actor(player)?;
        if self.decision() != Some(Decision::Challenge) {
            return Err(ActionError::BidExpected);
        }
        if challenge {
            self.current = self.current.challenged_by(player);
            self.state = RoundState::Resolved;
            return Ok(Some(self.current));
        }
        if !has_legal_raise(&self.current, total_dice) {
            return Err(ActionError::NoRaiseAvailable);
        }
        self.declined = true;
        Ok(None)
    }

    fn advance(&mut self) {
        if !self.order.is_empty() {
            self.turn = (self.turn + 1) % self.order.len();
        }
    }
}
