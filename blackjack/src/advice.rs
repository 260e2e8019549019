use std::str::FromStr;
use std::sync::Arc;

use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::calculation::{Calculator, ExpectationCalculator, ExpectedPayouts};
use crate::{Decision, Rule, RuleError, StrategyHand, StrategyState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdviceError {
    #[error("player must have at least 2 cards, got {0}")]
    TooFewPlayerCards(usize),
    #[error("unknown card rank: {0:?}")]
    UnknownRank(String),
    #[error("bet must be positive")]
    InvalidBet,
    #[error(transparent)]
    InvalidRule(#[from] RuleError),
}

/// Rank of a real card. Suits never matter to the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Rank {
    #[strum(serialize = "A")]
    Ace,
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(to_string = "10", serialize = "T")]
    Ten,
    #[strum(serialize = "J")]
    Jack,
    #[strum(serialize = "Q")]
    Queen,
    #[strum(serialize = "K")]
    King,
}

impl Rank {
    /// Value used by the calculators: ace is 1, faces are 10.
    pub fn blackjack_value(&self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }

    /// Parses a comma separated list such as `"A,7"` or `"10, K"`.
    pub fn parse_list(cards: &str) -> Result<Vec<Rank>, AdviceError> {
        cards
            .split(',')
            .map(str::trim)
            .filter(|card| !card.is_empty())
            .map(Rank::parse)
            .collect()
    }

    pub fn parse(card: &str) -> Result<Rank, AdviceError> {
        Rank::from_str(card.trim()).map_err(|_| AdviceError::UnknownRank(card.to_string()))
    }
}

impl StrategyHand {
    /// Hard total of the cards with every ace counted as 1.
    pub fn from_ranks(cards: &[Rank]) -> Self {
        cards.iter().fold(StrategyHand::new(0, false), |hand, card| {
            hand.add_card(card.blackjack_value())
        })
    }
}

/// Entry point for callers holding real cards and a real bet. Validates the input the
/// calculator takes for granted and scales its payouts by the bet.
#[derive(Debug, Clone, Default)]
pub struct Advisor {
    calculator: Arc<Calculator>,
}

impl Advisor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_calculator(calculator: Arc<Calculator>) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &Arc<Calculator> {
        &self.calculator
    }

    /// Builds the calculator state for the player's cards and the dealer's up card.
    /// Holding more than two cards means the player has hit.
    pub fn strategy_state(
        player_cards: &[Rank],
        dealer_up_card: Rank,
    ) -> Result<StrategyState, AdviceError> {
        if player_cards.len() < 2 {
            return Err(AdviceError::TooFewPlayerCards(player_cards.len()));
        }
        Ok(StrategyState::new(
            StrategyHand::from_ranks(player_cards),
            StrategyHand::from_card(dealer_up_card.blackjack_value()),
            player_cards.len() > 2,
        ))
    }

    /// Expected payout of each action for the given bet.
    pub fn advise(
        &self,
        player_cards: &[Rank],
        dealer_up_card: Rank,
        bet: u32,
        rule: &Rule,
    ) -> Result<ExpectedPayouts, AdviceError> {
        rule.validate()?;
        if bet == 0 {
            return Err(AdviceError::InvalidBet);
        }
        let state = Self::strategy_state(player_cards, dealer_up_card)?;
        let payouts = self.calculator.all_expected_payouts(&state, rule);
        Ok(payouts.scaled(bet as f64))
    }

    /// Like [`Advisor::advise`], also naming the best action.
    pub fn recommend(
        &self,
        player_cards: &[Rank],
        dealer_up_card: Rank,
        bet: u32,
        rule: &Rule,
    ) -> Result<(ExpectedPayouts, Decision), AdviceError> {
        let payouts = self.advise(player_cards, dealer_up_card, bet, rule)?;
        Ok((payouts, payouts.best_decision()))
    }
}
