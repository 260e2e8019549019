use super::util::card_probabilities;
use super::{surrender_payout, DealerScoreDistribution, ExpectationCalculator, ExpectedPayouts};
use crate::hand::BUST;
use crate::{Rule, StrategyHand, StrategyState};

/// Dealer stand threshold of the uncached calculator.
pub const FIXED_DEALER_STAND_THRESHOLD: u8 = 17;

/// Walks the whole game tree on every call without remembering anything. The dealer
/// always stands on 17 regardless of the rule passed in.
///
/// It exists to check [`super::Calculator`] and to measure what memoization saves.
/// Starting from a small player total it is extremely slow.
#[derive(Debug, Clone, Copy, Default)]
pub struct UncachedCalculator;

impl UncachedCalculator {
    pub fn new() -> Self {
        UncachedCalculator
    }

    fn dealer_gets_cards(&self, dealer_hand: &StrategyHand) -> DealerScoreDistribution {
        let actual_sum = dealer_hand.realized_score();
        if actual_sum >= FIXED_DEALER_STAND_THRESHOLD {
            return DealerScoreDistribution::end_with_score(actual_sum);
        }
        if actual_sum == BUST {
            return DealerScoreDistribution::end_with_bust();
        }

        let mut odds = DealerScoreDistribution::default();
        for (card, p) in card_probabilities() {
            odds.add_assign_with_p(&self.dealer_gets_cards(&dealer_hand.add_card(card)), p);
        }
        odds
    }

    fn find_solution(&self, state: &StrategyState) -> ExpectedPayouts {
        let player_score = state.player.realized_score();
        if player_score == BUST {
            return ExpectedPayouts::for_bust(state.has_hit);
        }

        let stand = self.dealer_gets_cards(&state.dealer).stand_payout(player_score);
        let mut hit = 0.0;
        for (card, p) in card_probabilities() {
            hit += self.find_solution(&state.hit(card)).best * p;
        }
        ExpectedPayouts::new(hit, stand, surrender_payout(state.has_hit))
    }
}

impl ExpectationCalculator for UncachedCalculator {
    fn dealer_score_distribution(
        &self,
        dealer_hand: &StrategyHand,
        _: &Rule,
    ) -> DealerScoreDistribution {
        self.dealer_gets_cards(dealer_hand)
    }

    fn stand_expected_payout(&self, player_score: u8, dealer_hand: &StrategyHand, _: &Rule) -> f64 {
        if player_score == BUST {
            return 0.0;
        }
        self.dealer_gets_cards(dealer_hand).stand_payout(player_score)
    }

    fn all_expected_payouts(&self, state: &StrategyState, _: &Rule) -> ExpectedPayouts {
        self.find_solution(state)
    }
}
