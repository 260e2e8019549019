use serde::Serialize;

use crate::hand::BUST;

const NUMBER_OF_SCORES: usize = 22;

/// Probability of each final dealer score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DealerScoreDistribution {
    // Index 0 for Bust.
    // [2, 21] for the realized score the dealer stands on.
    probabilities: [f64; NUMBER_OF_SCORES],
}

impl Default for DealerScoreDistribution {
    fn default() -> Self {
        Self {
            probabilities: [0.0; NUMBER_OF_SCORES],
        }
    }
}

impl DealerScoreDistribution {
    /// Distribution of a dealer that has already finished with `score`.
    pub fn end_with_score(score: u8) -> Self {
        let mut distribution = Self::default();
        distribution.probabilities[score as usize] = 1.0;
        distribution
    }

    pub fn end_with_bust() -> Self {
        Self::end_with_score(BUST)
    }

    pub fn probability(&self, score: u8) -> f64 {
        self.probabilities
            .get(score as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn p_bust(&self) -> f64 {
        self.probabilities[BUST as usize]
    }

    /// Non-zero `(score, probability)` pairs in ascending score order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.probabilities
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != 0.0)
            .map(|(score, p)| (score as u8, *p))
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    pub(crate) fn add_assign_with_p(&mut self, rhs: &Self, p: f64) {
        for i in 0..self.probabilities.len() {
            self.probabilities[i] += rhs.probabilities[i] * p;
        }
    }

    /// Expected payout of a player standing on `player_score` against this
    /// distribution. The bust sentinel compares below every real score, so a dealer
    /// bust is a win.
    pub(crate) fn stand_payout(&self, player_score: u8) -> f64 {
        if player_score == BUST {
            return 0.0;
        }
        let mut expected_payout = 0.0;
        for (dealer_score, p) in self.iter() {
            if dealer_score < player_score {
                expected_payout += 2.0 * p;
            } else if dealer_score == player_score {
                expected_payout += p;
            }
        }
        expected_payout
    }
}

impl std::fmt::Display for DealerScoreDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (score, p) in self.iter() {
            if score == BUST {
                writeln!(f, "Bust: {:.6}", p)?;
            } else {
                writeln!(f, "{:>4}: {:.6}", score, p)?;
            }
        }
        Ok(())
    }
}
