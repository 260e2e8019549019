pub mod advice;
pub mod calculation;
mod hand;
pub mod simulation;
pub mod strategy;

use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use thiserror::Error;

pub use advice::{AdviceError, Advisor, Rank};
pub use calculation::{Calculator, ExpectationCalculator, ExpectedPayouts, UncachedCalculator};
pub use hand::{realized_score, StrategyHand, StrategyState, BUST};

/// Table rules that affect the expectation. Part of every memoization key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// The dealer keeps drawing while the realized score is below this value.
    /// Must be in [1, 21]; callers check this with [`Rule::validate`] before
    /// calculating.
    pub dealer_stand_threshold: u8,
}

impl Rule {
    pub const MIN_DEALER_STAND_THRESHOLD: u8 = 1;
    pub const MAX_DEALER_STAND_THRESHOLD: u8 = 21;

    pub fn new(dealer_stand_threshold: u8) -> Result<Self, RuleError> {
        let rule = Rule {
            dealer_stand_threshold,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if !(Self::MIN_DEALER_STAND_THRESHOLD..=Self::MAX_DEALER_STAND_THRESHOLD)
            .contains(&self.dealer_stand_threshold)
        {
            return Err(RuleError::DealerStandThresholdOutOfRange(
                self.dealer_stand_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            dealer_stand_threshold: 17,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("dealer stand threshold must be between 1 and 21, got {0}")]
    DealerStandThresholdOutOfRange(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
pub enum Decision {
    Hit,
    Stand,
    Surrender,
}

impl Decision {
    pub fn to_char(&self) -> char {
        match self {
            Decision::Hit => 'H',
            Decision::Stand => 'S',
            Decision::Surrender => 'R',
        }
    }
}
