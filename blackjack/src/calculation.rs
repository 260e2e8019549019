mod calculator;
mod dealer_distribution;
mod state_cache;
mod uncached;
pub mod util;

use serde::Serialize;

use crate::{Decision, Rule, StrategyHand, StrategyState};

pub use calculator::{CacheSizes, Calculator};
pub use dealer_distribution::DealerScoreDistribution;
pub(crate) use state_cache::StateCache;
pub use uncached::UncachedCalculator;

/// Payout of surrendering. Half of the bet is returned.
pub const SURRENDER_PAYOUT: f64 = 0.5;

/// Expected payout of every player action, normalized to a unit bet: 1.0 returns the
/// bet, 2.0 doubles it and 0.0 loses it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ExpectedPayouts {
    pub hit: f64,
    pub stand: f64,
    pub surrender: f64,

    /// The largest of the three above.
    pub best: f64,
}

impl ExpectedPayouts {
    pub fn new(hit: f64, stand: f64, surrender: f64) -> Self {
        let mut best = stand;
        if hit > best {
            best = hit;
        }
        if surrender > best {
            best = surrender;
        }
        Self {
            hit,
            stand,
            surrender,
            best,
        }
    }

    /// Payouts of a player who is already bust. Hitting and standing are both
    /// lost; surrender still returns half the bet unless the player has hit.
    pub fn for_bust(has_hit: bool) -> Self {
        Self::new(0.0, 0.0, surrender_payout(has_hit))
    }

    /// The action that achieves `best`. Ties go to stand, then hit.
    pub fn best_decision(&self) -> Decision {
        let (mut max_ex, mut decision) = (self.stand, Decision::Stand);
        if max_ex < self.hit {
            (max_ex, decision) = (self.hit, Decision::Hit);
        }
        if max_ex < self.surrender {
            decision = Decision::Surrender;
        }
        decision
    }

    /// Converts normalized payouts into amounts for an actual bet.
    pub fn scaled(&self, bet: f64) -> Self {
        Self {
            hit: self.hit * bet,
            stand: self.stand * bet,
            surrender: self.surrender * bet,
            best: self.best * bet,
        }
    }
}

/// Surrender is modelled as worthless rather than illegal once the player has hit.
pub fn surrender_payout(has_hit: bool) -> f64 {
    if has_hit {
        0.0
    } else {
        SURRENDER_PAYOUT
    }
}

/// Exact expectation of a blackjack hand under an infinite shoe.
pub trait ExpectationCalculator {
    /// Probability of each final dealer score, starting from `dealer_hand`.
    fn dealer_score_distribution(
        &self,
        dealer_hand: &StrategyHand,
        rule: &Rule,
    ) -> DealerScoreDistribution;

    /// Expected payout of standing on `player_score` (0 means bust).
    fn stand_expected_payout(
        &self,
        player_score: u8,
        dealer_hand: &StrategyHand,
        rule: &Rule,
    ) -> f64;

    /// Expected payout of every action, playing optimally afterwards.
    fn all_expected_payouts(&self, state: &StrategyState, rule: &Rule) -> ExpectedPayouts;
}
