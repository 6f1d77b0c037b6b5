//! Final-score aggregation.
//!
//! `final = round((base + Σ flat points) × Π multipliers)`, where the base
//! is the session's accumulated wrong-guess penalty. Correct guesses cost
//! nothing and pay out only through bonuses.

use crate::bonus::Reward;
use serde::{Deserialize, Serialize};

/// The arithmetic behind a final score, kept separate for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: u32,
    pub flat_bonus: u32,
    pub multiplier: f64,
    pub final_score: i64,
}

/// Fold earned rewards into a breakdown.
pub fn aggregate(base_score: u32, rewards: impl Iterator<Item = Reward>) -> ScoreBreakdown {
    let mut flat_bonus = 0u32;
    let mut multiplier = 1.0f64;
    for reward in rewards {
        match reward {
            Reward::Points(p) => flat_bonus += p,
            Reward::Multiplier(m) => multiplier *= m,
        }
    }

    let final_score = (f64::from(base_score + flat_bonus) * multiplier).round() as i64;
    ScoreBreakdown {
        base_score,
        flat_bonus,
        multiplier,
        final_score,
    }
}

/// High-water-mark rule for the persisted best score.
pub fn improves(final_score: i64, best: Option<i64>) -> bool {
    match best {
        Some(best) => final_score > best,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_score_rounds_after_multiplying() {
        let rewards = [Reward::Points(8), Reward::Multiplier(1.5)];
        let breakdown = aggregate(4, rewards.into_iter());
        assert_eq!(breakdown.base_score, 4);
        assert_eq!(breakdown.flat_bonus, 8);
        assert_eq!(breakdown.multiplier, 1.5);
        assert_eq!(breakdown.final_score, 18);
    }

    #[test]
    fn multipliers_stack_multiplicatively() {
        let rewards = [
            Reward::Multiplier(1.25),
            Reward::Multiplier(1.5),
            Reward::Points(3),
            Reward::Points(3),
        ];
        let breakdown = aggregate(2, rewards.into_iter());
        assert_eq!(breakdown.flat_bonus, 6);
        assert_eq!(breakdown.multiplier, 1.875);
        assert_eq!(breakdown.final_score, 15);
    }

    #[test]
    fn no_rewards_is_identity() {
        let breakdown = aggregate(7, std::iter::empty());
        assert_eq!(breakdown.final_score, 7);
        assert_eq!(breakdown.multiplier, 1.0);
    }

    #[test]
    fn best_score_is_high_water_mark() {
        assert!(improves(10, None));
        assert!(improves(11, Some(10)));
        assert!(!improves(10, Some(10)));
        assert!(!improves(9, Some(10)));
    }
}
