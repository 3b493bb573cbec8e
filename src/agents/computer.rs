use crate::bid::{has_legal_raise, is_legal_raise, minimal_raise, Bid};
use crate::dice::{DiceSet, MAX_FACE};
use crate::engine::{GameEngine, TurnView};
use crate::game::{ActionError, PlayerId, PlayerKind};
use crate::probability::bid_probability;
use crate::round::Decision;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use super::PlayerAgent;

/// Thresholds and sampling ranges for computer play.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ComputerProfile {
    /// Challenge outright below this probability.
    pub low_confidence: f64,
    /// Below this probability a speculative challenge becomes possible.
    pub bluff_ceiling: f64,
    /// Chance of a speculative challenge under `bluff_ceiling`.
    pub bluff_challenge: f64,
    /// Raises generated before picking the most plausible one.
    pub raise_candidates: usize,
    /// Largest count increase considered in one raise.
    pub max_step: u32,
    /// Largest padding over own matches on an opening bid.
    pub max_opening_pad: u32,
    /// Chance a count increase keeps the face value.
    pub keep_face: f64,
}

impl Default for ComputerProfile {
    fn default() -> Self {
        Self {
            low_confidence: 0.3,
            bluff_ceiling: 0.5,
            bluff_challenge: 0.1,
            raise_candidates: 10,
            max_step: 3,
            max_opening_pad: 2,
            keep_face: 0.75,
        }
    }
}

/// Why a computer player challenged. Instrumentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChallengeReason {
    /// More dice than are in play, or a face that does not exist.
    Aberrant,
    /// Nothing is left to raise to.
    NoRaise,
    LowConfidence,
    Speculative,
}

/// Decide whether to challenge `view.current`. `None` means decline.
pub fn decide_challenge<R: Rng + ?Sized>(
    view: &TurnView,
    profile: &ComputerProfile,
    rng: &mut R,
) -> Option<ChallengeReason> {
    let bid = &view.current;
    if bid.is_aberrant(view.total_dice) {
        return Some(ChallengeReason::Aberrant);
    }
    if !has_legal_raise(bid, view.total_dice) {
        return Some(ChallengeReason::NoRaise);
    }
    let p = bid_probability(&view.dice, bid, view.total_dice);
    if p < profile.low_confidence {
        return Some(ChallengeReason::LowConfidence);
    }
    if p < profile.bluff_ceiling && rng.random::<f64>() < profile.bluff_challenge {
        return Some(ChallengeReason::Speculative);
    }
    None
}

/// Open a round on a face from the player's own roll, claiming its matches plus a small pad.
pub fn choose_opening_bid<R: Rng + ?Sized>(
    dice: &DiceSet,
    total_dice: u32,
    profile: &ComputerProfile,
    rng: &mut R,
) -> Option<(u32, u8)> {
    let faces = dice.distinct_faces();
    let face = *faces.choose(rng)?;
    let pad = rng.random_range(0..=profile.max_opening_pad);
    let count = (dice.count(face) + pad).min(total_dice).max(1);
    Some((count, face))
}

/// Sample one raise over `current` from the profile's ranges.
pub fn candidate_raise<R: Rng + ?Sized>(
    current: &Bid,
    total_dice: u32,
    profile: &ComputerProfile,
    rng: &mut R,
) -> (u32, u8) {
    let (lc, lv) = (current.count(), current.face());
    if lv == MAX_FACE {
        let step = rng.random_range(1..=profile.max_step.max(1));
        return ((lc + step).min(total_dice), lv);
    }
    if u32::from(lv) == total_dice {
        return (lc, rng.random_range(lv + 1..=MAX_FACE));
    }
    let hi = (lc + profile.max_step).min(total_dice).max(lc);
    let count = rng.random_range(lc..=hi);
    if count == lc {
        return (lc, rng.random_range(lv + 1..=MAX_FACE));
    }
    if rng.random::<f64>() < profile.keep_face {
        (count, lv)
    } else {
        (count, rng.random_range(lv + 1..=MAX_FACE))
    }
}

/// Generate raises and keep the one most likely to hold; ties go to the earliest.
/// `None` when no raise is possible.
pub fn choose_raise<R: Rng + ?Sized>(
    view: &TurnView,
    profile: &ComputerProfile,
    rng: &mut R,
) -> Option<(u32, u8)> {
    let current = &view.current;
    let total = view.total_dice;
    if !has_legal_raise(current, total) {
        return None;
    }
    let wanted = profile.raise_candidates.max(1);
    let mut best: Option<((u32, u8), f64)> = None;
    let mut generated = 0;
    for _ in 0..wanted * 10 {
        if generated == wanted {
            break;
        }
        let (count, face) = candidate_raise(current, total, profile, rng);
        let candidate = Bid::new(view.player, count, face);
        if count > total || !is_legal_raise(&candidate, current) {
            continue;
        }
        generated += 1;
        let p = bid_probability(&view.dice, &candidate, total);
        if best.map_or(true, |(_, bp)| p > bp) {
            best = Some(((count, face), p));
        }
    }
    best.map(|(raise, _)| raise).or_else(|| minimal_raise(current, total))
}

/// A computer opponent. Draws all randomness from the engine's shared source.
#[derive(Debug, Clone, Default)]
pub struct ComputerAgent {
    profile: ComputerProfile,
}

impl ComputerAgent {
    pub fn new(profile: ComputerProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ComputerProfile {
        &self.profile
    }

    fn bid(
        &self,
        engine: &mut dyn GameEngine,
        view: &TurnView,
        opening: bool,
    ) -> Result<(), ActionError> {
        let choice = if opening {
            choose_opening_bid(&view.dice, view.total_dice, &self.profile, engine.rng())
        } else {
            choose_raise(view, &self.profile, engine.rng())
        };
        let (count, face) = choice.ok_or(ActionError::NoRaiseAvailable)?;
        engine.place_bid(view.player, count, face).map(|_| ())
    }
}

impl PlayerAgent for ComputerAgent {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Computer
    }

    fn on_turn(&mut self, engine: &mut dyn GameEngine, seat: PlayerId) -> Result<bool, ActionError> {
        let Some(pending) = engine.pending() else {
            return Ok(false);
        };
        if pending.player != seat {
            return Ok(false);
        }
        let view = engine.turn_view(seat).ok_or(ActionError::UnknownPlayer(seat))?;
        match pending.decision {
            Decision::OpeningBid => self.bid(engine, &view, true)?,
            Decision::Raise => self.bid(engine, &view, false)?,
            Decision::Challenge => {
                if let Some(reason) = decide_challenge(&view, &self.profile, engine.rng()) {
                    debug!(%seat, bid = %view.current, ?reason, "computer challenges");
                    engine.respond(seat, true)?;
                } else {
                    engine.respond(seat, false)?;
                    self.bid(engine, &view, false)?;
                }
            }
        }
        Ok(true)
    }
}
