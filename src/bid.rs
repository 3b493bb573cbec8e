use crate::dice::{is_face, MAX_FACE, MIN_FACE};
use crate::game::PlayerId;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BidError {
    #[error("a bid must claim at least one die")]
    ZeroCount,
    #[error("face value must be between 1 and 6, got {0}")]
    FaceOutOfRange(u8),
    #[error("only {total} dice are in play, cannot bid {count}")]
    ExceedsDice { count: u32, total: u32 },
    #[error("{count} {face}s does not raise the current bid of {current_count} {current_face}s")]
    NotARaise { count: u32, face: u8, current_count: u32, current_face: u8 },
    #[error("expected two integers \"count face\", got '{0}'")]
    Parse(String),
}

/// A claim that `count` dice on the table show `face`.
///
/// The null bid (no proposer, count 0, face 0) seeds every round and is outranked by any
/// well-formed bid.
///
/// ```
/// use liars_dice::bid::{is_legal_raise, Bid};
/// use liars_dice::game::PlayerId;
///
/// let opening = Bid::try_new(PlayerId::new(0), 2, 4).unwrap();
/// assert!(is_legal_raise(&opening, &Bid::null()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bid {
    proposer: Option<PlayerId>,
    count: u32,
    face: u8,
    challenger: Option<PlayerId>,
}

impl Bid {
    pub const fn null() -> Self {
        Self { proposer: None, count: 0, face: 0, challenger: None }
    }

    pub(crate) const fn new(proposer: PlayerId, count: u32, face: u8) -> Self {
        Self { proposer: Some(proposer), count, face, challenger: None }
    }

    /// Build a well-formed bid: at least one die, face in 1..=6.
    pub fn try_new(proposer: PlayerId, count: u32, face: u8) -> Result<Self, BidError> {
        if !is_face(face) {
            return Err(BidError::FaceOutOfRange(face));
        }
        if count == 0 {
            return Err(BidError::ZeroCount);
        }
        Ok(Self::new(proposer, count, face))
    }

    pub fn proposer(&self) -> Option<PlayerId> {
        self.proposer
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn face(&self) -> u8 {
        self.face
    }

    pub fn challenger(&self) -> Option<PlayerId> {
        self.challenger
    }

    pub fn is_null(&self) -> bool {
        self.proposer.is_none()
    }

    /// Once challenged a bid is terminal.
    pub fn is_challenged(&self) -> bool {
        self.challenger.is_some()
    }

    /// A bid no honest table could satisfy: more dice than are in play, or a face that does
    /// not exist.
    pub fn is_aberrant(&self, total_dice: u32) -> bool {
        self.count > total_dice || !is_face(self.face)
    }

    pub(crate) fn challenged_by(self, challenger: PlayerId) -> Self {
        Self { challenger: Some(challenger), ..self }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("no bid");
        }
        write!(f, "{} × {}", self.count, self.face)
    }
}

/// Whether `candidate` may replace `current`.
///
/// Exactly one of: more dice of the same face, same count of a higher face, or more dice
/// of a higher face. The candidate face must be in 1..=6.
pub fn is_legal_raise(candidate: &Bid, current: &Bid) -> bool {
    if !is_face(candidate.face) {
        return false;
    }
    let (c, v) = (candidate.count, candidate.face);
    let (lc, lv) = (current.count, current.face);
    (c > lc && v == lv) || (c == lc && v > lv) || (c > lc && v > lv)
}

/// The smallest legal raise over `current` that fits within `total_dice`, if any.
pub fn minimal_raise(current: &Bid, total_dice: u32) -> Option<(u32, u8)> {
    if current.is_null() || current.count == 0 {
        return (total_dice >= 1).then_some((1, MIN_FACE));
    }
    if current.face < MAX_FACE && current.count <= total_dice {
        return Some((current.count, current.face + 1));
    }
    (current.count < total_dice).then_some((current.count + 1, current.face))
}

/// Whether any raise over `current` remains within `total_dice`.
pub fn has_legal_raise(current: &Bid, total_dice: u32) -> bool {
    minimal_raise(current, total_dice).is_some()
}

/// Validate an externally supplied bid against the current one.
pub fn validate_raise(
    proposer: PlayerId,
    count: u32,
    face: u8,
    current: &Bid,
    total_dice: u32,
) -> Result<Bid, BidError> {
    let bid = Bid::try_new(proposer, count, face)?;
    if count > total_dice {
        return Err(BidError::ExceedsDice { count, total: total_dice });
    }
    if !is_legal_raise(&bid, current) {
        return Err(BidError::NotARaise {
            count,
            face,
            current_count: current.count,
            current_face: current.face,
        });
    }
    Ok(bid)
}

/// Parse raw "count face" text into its two integers. Range checks happen in
/// [`validate_raise`].
pub fn parse_bid(s: &str) -> Result<(u32, u8), BidError> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(BidError::Parse(s.trim().to_string()));
    }
    let count = parts[0].parse::<u32>().map_err(|_| BidError::Parse(s.trim().to_string()))?;
    let face = parts[1].parse::<u8>().map_err(|_| BidError::Parse(s.trim().to_string()))?;
    Ok((count, face))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(count: u32, face: u8) -> Bid {
        Bid::new(PlayerId::new(1), count, face)
    }

    #[test]
    fn any_well_formed_bid_beats_null() {
        for face in 1..=6 {
            assert!(is_legal_raise(&bid(1, face), &Bid::null()));
        }
        assert!(!is_legal_raise(&bid(1, 0), &Bid::null()));
        assert!(!is_legal_raise(&bid(1, 7), &Bid::null()));
    }

    #[test]
    fn three_raise_branches() {
        let current = bid(3, 4);
        assert!(is_legal_raise(&bid(4, 4), &current));
        assert!(is_legal_raise(&bid(3, 5), &current));
        assert!(is_legal_raise(&bid(5, 6), &current));
        assert!(!is_legal_raise(&bid(3, 4), &current));
        assert!(!is_legal_raise(&bid(4, 3), &current), "more dice of a lower face is not a raise");
        assert!(!is_legal_raise(&bid(2, 6), &current));
    }

    #[test]
    fn validate_rejects_with_typed_errors() {
        let current = bid(3, 4);
        let me = PlayerId::new(0);
        assert_eq!(validate_raise(me, 0, 4, &current, 10), Err(BidError::ZeroCount));
        assert_eq!(validate_raise(me, 4, 7, &current, 10), Err(BidError::FaceOutOfRange(7)));
        assert_eq!(
            validate_raise(me, 11, 3, &Bid::null(), 10),
            Err(BidError::ExceedsDice { count: 11, total: 10 })
        );
        assert!(matches!(validate_raise(me, 3, 2, &current, 10), Err(BidError::NotARaise { .. })));
        let ok = validate_raise(me, 3, 5, &current, 10).unwrap();
        assert_eq!(ok.proposer(), Some(me));
        assert!(!ok.is_challenged());
    }

    #[test]
    fn minimal_raise_respects_ceiling() {
        assert_eq!(minimal_raise(&Bid::null(), 4), Some((1, 1)));
        assert_eq!(minimal_raise(&bid(2, 3), 4), Some((2, 4)));
        assert_eq!(minimal_raise(&bid(2, 6), 4), Some((3, 6)));
        assert_eq!(minimal_raise(&bid(4, 6), 4), None);
        assert!(!has_legal_raise(&bid(4, 6), 4));
        assert!(has_legal_raise(&bid(4, 5), 4));
    }

    #[test]
    fn aberrant_bids() {
        assert!(bid(11, 3).is_aberrant(10));
        assert!(!bid(10, 3).is_aberrant(10));
        assert!(Bid::null().is_aberrant(10), "face 0 is not a face");
    }

    #[test]
    fn parse_bid_requires_two_integers() {
        assert_eq!(parse_bid(" 4 3 "), Ok((4, 3)));
        assert!(matches!(parse_bid("4"), Err(BidError::Parse(_))));
        assert!(matches!(parse_bid("4 three"), Err(BidError::Parse(_))));
        assert!(matches!(parse_bid("4 3 1"), Err(BidError::Parse(_))));
    }

    #[test]
    fn challenge_marks_bid_terminal() {
        let b = bid(2, 2).challenged_by(PlayerId::new(2));
        assert!(b.is_challenged());
        assert_eq!(b.challenger(), Some(PlayerId::new(2)));
        assert_eq!(b.to_string(), "2 × 2");
        assert_eq!(Bid::null().to_string(), "no bid");
    }
}
