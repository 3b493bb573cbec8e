//! Exact binomial estimate of whether a bid holds, from one player's point of view.
//!
//! A player knows its own dice and nothing about the rest, which it treats as fair dice.
//! The probability that a bid holds is the chance that the unknown dice make up whatever
//! the player's own matches leave missing.

use crate::bid::Bid;
use crate::dice::DiceSet;

/// Chance a single fair die shows a given face.
pub const FACE_PROBABILITY: f64 = 1.0 / 6.0;

/// `P(X = k)` for `X ~ Binomial(n, p)`.
pub fn binomial_pmf(n: u32, k: u32, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    // C(n, k) built incrementally over the smaller side to stay exact for table-sized n.
    let k_small = k.min(n - k);
    let mut choose = 1.0f64;
    for i in 1..=k_small {
        choose = choose * f64::from(n - k_small + i) / f64::from(i);
    }
    choose * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32)
}

/// `P(X >= k)` for `X ~ Binomial(n, p)`, summed term by term.
pub fn binomial_survival(n: u32, k: u32, p: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n {
        return 0.0;
    }
    let sum: f64 = (k..=n).map(|i| binomial_pmf(n, i, p)).sum();
    sum.min(1.0)
}

/// Dice showing the bid's face that must come from other players.
pub fn matches_needed(own: &DiceSet, bid: &Bid) -> u32 {
    bid.count().saturating_sub(own.count(bid.face()))
}

/// Probability that `bid` holds given the owner's dice `own` and `total_dice` in play.
///
/// ```
/// use liars_dice::bid::Bid;
/// use liars_dice::dice::DiceSet;
/// use liars_dice::game::PlayerId;
/// use liars_dice::probability::bid_probability;
///
/// let own: DiceSet = "3 3 1 5 6".parse().unwrap();
/// // Two threes are already in hand.
/// let bid = Bid::try_new(PlayerId::new(1), 2, 3).unwrap();
/// assert_eq!(bid_probability(&own, &bid, 10), 1.0);
/// ```
pub fn bid_probability(own: &DiceSet, bid: &Bid, total_dice: u32) -> f64 {
    let needed = matches_needed(own, bid);
    let others = total_dice.saturating_sub(own.len() as u32);
    binomial_survival(others, needed, FACE_PROBABILITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerId;

    const EPS: f64 = 1e-12;

    fn bid(count: u32, face: u8) -> Bid {
        Bid::try_new(PlayerId::new(1), count, face).unwrap()
    }

    #[test]
    fn pmf_sums_to_one() {
        for n in 0..=25 {
            let total: f64 = (0..=n).map(|k| binomial_pmf(n, k, FACE_PROBABILITY)).sum();
            assert!((total - 1.0).abs() < 1e-9, "n={n} sum={total}");
        }
    }

    #[test]
    fn pmf_known_values() {
        // P(X=1), n=2, p=1/6 -> 2 * 1/6 * 5/6
        assert!((binomial_pmf(2, 1, FACE_PROBABILITY) - 10.0 / 36.0).abs() < EPS);
        assert!((binomial_pmf(5, 0, FACE_PROBABILITY) - (5.0f64 / 6.0).powi(5)).abs() < EPS);
        assert_eq!(binomial_pmf(3, 4, FACE_PROBABILITY), 0.0);
    }

    #[test]
    fn survival_edges() {
        assert_eq!(binomial_survival(5, 0, FACE_PROBABILITY), 1.0);
        assert_eq!(binomial_survival(5, 6, FACE_PROBABILITY), 0.0);
        let all = FACE_PROBABILITY.powi(5);
        assert!((binomial_survival(5, 5, FACE_PROBABILITY) - all).abs() < EPS);
        let none_of_five = (5.0f64 / 6.0).powi(5);
        assert!((binomial_survival(5, 1, FACE_PROBABILITY) - (1.0 - none_of_five)).abs() < EPS);
    }

    #[test]
    fn own_dice_reduce_what_is_needed() {
        let own = DiceSet::try_from_values(vec![4, 4, 2, 6, 1]).unwrap();
        assert_eq!(matches_needed(&own, &bid(3, 4)), 1);
        assert_eq!(matches_needed(&own, &bid(1, 4)), 0);
        assert_eq!(bid_probability(&own, &bid(2, 4), 10), 1.0);
        // One more four among five unknown dice.
        let expected = 1.0 - (5.0f64 / 6.0).powi(5);
        assert!((bid_probability(&own, &bid(3, 4), 10) - expected).abs() < EPS);
    }

    #[test]
    fn impossible_bid_has_zero_probability() {
        let own = DiceSet::try_from_values(vec![1, 2, 3, 5, 6]).unwrap();
        assert_eq!(bid_probability(&own, &bid(6, 4), 10), 0.0);
    }
}
