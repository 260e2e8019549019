use serde::{Deserialize, Serialize};

/// Realized score of a bust hand. Every legitimate total is at least 2, so this
/// never collides with a real score and compares below all of them.
pub const BUST: u8 = 0;

/// Compact hand representation used by the calculators. Aces are counted as 1 in
/// `sum`; whether one of them can be promoted to 11 is decided by
/// [`realized_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyHand {
    pub sum: u8,
    pub has_ace: bool,
}

impl StrategyHand {
    pub fn new(sum: u8, has_ace: bool) -> Self {
        StrategyHand { sum, has_ace }
    }

    /// Hand made of a single card, e.g. the dealer up card.
    /// `blackjack_value` must be in [1, 10], 1 being an ace.
    pub fn from_card(blackjack_value: u8) -> Self {
        StrategyHand {
            sum: blackjack_value,
            has_ace: blackjack_value == 1,
        }
    }

    /// Returns the hand after receiving one more card. The sum saturates, since any
    /// total past 21 is already bust.
    pub fn add_card(&self, blackjack_value: u8) -> Self {
        StrategyHand {
            sum: self.sum.saturating_add(blackjack_value),
            has_ace: self.has_ace || blackjack_value == 1,
        }
    }

    pub fn realized_score(&self) -> u8 {
        realized_score(self)
    }

    pub fn bust(&self) -> bool {
        self.sum > 21
    }

    /// An ace is currently counted as 11.
    pub fn is_soft(&self) -> bool {
        self.has_ace && self.sum + 10 <= 21
    }
}

/// Maps a hand to the score it is worth at showdown. Bust hands score [`BUST`].
pub fn realized_score(hand: &StrategyHand) -> u8 {
    if hand.sum > 21 {
        return BUST;
    }
    if hand.has_ace && hand.sum + 10 <= 21 {
        return hand.sum + 10;
    }
    hand.sum
}

/// Everything needed to evaluate the player's options. Only the dealer's up card is
/// kept, since the hole card is generated by the calculation rather than observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyState {
    pub player: StrategyHand,
    pub dealer: StrategyHand,
    /// Surrender is only allowed before the player draws a third card.
    pub has_hit: bool,
}

impl StrategyState {
    pub fn new(player: StrategyHand, dealer: StrategyHand, has_hit: bool) -> Self {
        StrategyState {
            player,
            dealer,
            has_hit,
        }
    }

    /// State after the player hits and receives the given card.
    pub fn hit(&self, blackjack_value: u8) -> Self {
        StrategyState {
            player: self.player.add_card(blackjack_value),
            dealer: self.dealer,
            has_hit: true,
        }
    }
}
