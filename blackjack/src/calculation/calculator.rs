use super::util::card_probabilities;
use super::{
    surrender_payout, DealerScoreDistribution, ExpectationCalculator, ExpectedPayouts, StateCache,
};
use crate::hand::BUST;
use crate::{Rule, StrategyHand, StrategyState};

type DealerKey = (StrategyHand, Rule);
type StandKey = (u8, StrategyHand, Rule);
type StateKey = (StrategyState, Rule);

/// Number of entries in each memoization table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheSizes {
    pub dealer: usize,
    pub stand: usize,
    pub state: usize,
}

/// Memoizing calculator. One instance can be shared by any number of threads; the
/// tables grow for the lifetime of the instance and are never evicted, since the
/// number of reachable states for a rule is small.
///
/// Every table is keyed by the rule as well, so the same instance serves several
/// dealer stand thresholds side by side.
#[derive(Debug, Default)]
pub struct Calculator {
    dealer_odds: StateCache<DealerKey, DealerScoreDistribution>,
    stand_odds: StateCache<StandKey, f64>,
    solution: StateCache<StateKey, ExpectedPayouts>,
}

impl Calculator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cache_sizes(&self) -> CacheSizes {
        CacheSizes {
            dealer: self.dealer_odds.len(),
            stand: self.stand_odds.len(),
            state: self.solution.len(),
        }
    }

    fn memoization_dealer_gets_cards(
        &self,
        dealer_hand: &StrategyHand,
        rule: &Rule,
    ) -> DealerScoreDistribution {
        let key = (*dealer_hand, *rule);
        if let Some(odds) = self.dealer_odds.get(&key) {
            return odds;
        }

        let actual_sum = dealer_hand.realized_score();
        let odds = if actual_sum >= rule.dealer_stand_threshold {
            // Case 1: Dealer must stand.
            DealerScoreDistribution::end_with_score(actual_sum)
        } else if actual_sum == BUST {
            DealerScoreDistribution::end_with_bust()
        } else {
            // Case 2: Dealer must hit.
            let mut odds = DealerScoreDistribution::default();
            for (card, p) in card_probabilities() {
                let next_state_odds =
                    self.memoization_dealer_gets_cards(&dealer_hand.add_card(card), rule);
                odds.add_assign_with_p(&next_state_odds, p);
            }
            odds
        };

        self.dealer_odds.insert(key, odds);
        odds
    }

    fn memoization_find_solution(&self, state: &StrategyState, rule: &Rule) -> ExpectedPayouts {
        let key = (*state, *rule);
        if let Some(solution) = self.solution.get(&key) {
            return solution;
        }

        let player_score = state.player.realized_score();
        let solution = if player_score == BUST {
            ExpectedPayouts::for_bust(state.has_hit)
        } else {
            let stand = self.stand_expected_payout(player_score, &state.dealer, rule);
            let mut hit = 0.0;
            for (card, p) in card_probabilities() {
                hit += self.memoization_find_solution(&state.hit(card), rule).best * p;
            }
            ExpectedPayouts::new(hit, stand, surrender_payout(state.has_hit))
        };

        self.solution.insert(key, solution);
        solution
    }
}

impl ExpectationCalculator for Calculator {
    fn dealer_score_distribution(
        &self,
        dealer_hand: &StrategyHand,
        rule: &Rule,
    ) -> DealerScoreDistribution {
        self.memoization_dealer_gets_cards(dealer_hand, rule)
    }

    fn stand_expected_payout(
        &self,
        player_score: u8,
        dealer_hand: &StrategyHand,
        rule: &Rule,
    ) -> f64 {
        // Standing cannot help a bust player.
        if player_score == BUST {
            return 0.0;
        }

        let key = (player_score, *dealer_hand, *rule);
        if let Some(expected_payout) = self.stand_odds.get(&key) {
            return expected_payout;
        }

        let expected_payout = self
            .memoization_dealer_gets_cards(dealer_hand, rule)
            .stand_payout(player_score);
        self.stand_odds.insert(key, expected_payout);
        expected_payout
    }

    fn all_expected_payouts(&self, state: &StrategyState, rule: &Rule) -> ExpectedPayouts {
        self.memoization_find_solution(state, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::UncachedCalculator;
    use crate::Decision;
    use std::sync::Arc;
    use std::thread;

    const EPS: f64 = 1e-9;

    fn get_typical_rule() -> Rule {
        Rule {
            dealer_stand_threshold: 17,
        }
    }

    fn hand(sum: u8, has_ace: bool) -> StrategyHand {
        StrategyHand::new(sum, has_ace)
    }

    fn reachable_hands() -> Vec<StrategyHand> {
        let mut hands = vec![hand(1, true)];
        for sum in 2..=21 {
            hands.push(hand(sum, false));
            hands.push(hand(sum, true));
        }
        hands
    }

    #[test]
    fn dealer_distribution_sums_to_one() {
        let calculator = Calculator::new();
        for threshold in 1..=21 {
            let rule = Rule {
                dealer_stand_threshold: threshold,
            };
            for dealer_hand in reachable_hands() {
                let distribution = calculator.dealer_score_distribution(&dealer_hand, &rule);
                assert!(
                    (distribution.total() - 1.0).abs() < EPS,
                    "threshold {} hand {:?}: {}",
                    threshold,
                    dealer_hand,
                    distribution.total()
                );
            }
        }
    }

    #[test]
    fn dealer_ten_must_draw_to_seventeen() {
        let calculator = Calculator::new();
        let distribution =
            calculator.dealer_score_distribution(&StrategyHand::from_card(10), &get_typical_rule());

        for score in 1..=16 {
            assert_eq!(distribution.probability(score), 0.0);
        }
        let mass: f64 = [0, 17, 18, 19, 20, 21]
            .iter()
            .map(|score| distribution.probability(*score))
            .sum();
        assert!((mass - 1.0).abs() < EPS);
        // A ten only stands on 20 straight away after drawing another ten.
        assert!(distribution.probability(20) > 4.0 / 13.0);
        assert!(distribution.probability(17) > 0.0);
        assert!(distribution.p_bust() > 0.0);
    }

    #[test]
    fn dealer_stands_immediately_at_threshold() {
        let calculator = Calculator::new();
        let rule = Rule {
            dealer_stand_threshold: 10,
        };
        let distribution =
            calculator.dealer_score_distribution(&StrategyHand::from_card(10), &rule);
        assert_eq!(distribution, DealerScoreDistribution::end_with_score(10));

        // Soft hands stand on their soft score.
        let distribution =
            calculator.dealer_score_distribution(&hand(7, true), &get_typical_rule());
        assert_eq!(distribution, DealerScoreDistribution::end_with_score(17));
    }

    #[test]
    fn bust_dealer_is_a_certain_bust() {
        let calculator = Calculator::new();
        let distribution =
            calculator.dealer_score_distribution(&hand(25, false), &get_typical_rule());
        assert_eq!(distribution, DealerScoreDistribution::end_with_bust());
    }

    #[test]
    fn stand_payout_is_bounded() {
        let calculator = Calculator::new();
        let rule = get_typical_rule();
        for dealer_up_card in 1..=10 {
            let dealer = StrategyHand::from_card(dealer_up_card);
            for player_score in [0, 4, 12, 16, 17, 18, 19, 20, 21] {
                let payout = calculator.stand_expected_payout(player_score, &dealer, &rule);
                assert!(
                    (0.0..=2.0).contains(&payout),
                    "{} vs {}: {}",
                    player_score,
                    dealer_up_card,
                    payout
                );
            }
        }
    }

    #[test]
    fn standing_on_bust_pays_nothing() {
        let calculator = Calculator::new();
        let payout =
            calculator.stand_expected_payout(0, &StrategyHand::from_card(6), &get_typical_rule());
        assert_eq!(payout, 0.0);
    }

    #[test]
    fn low_stand_only_wins_on_dealer_bust() {
        let calculator = Calculator::new();
        let rule = get_typical_rule();
        let dealer = StrategyHand::from_card(6);
        let distribution = calculator.dealer_score_distribution(&dealer, &rule);
        let payout = calculator.stand_expected_payout(16, &dealer, &rule);
        assert!((payout - 2.0 * distribution.p_bust()).abs() < EPS);
    }

    #[test]
    fn surrender_depends_only_on_has_hit() {
        let calculator = Calculator::new();
        let rule = get_typical_rule();
        for player in reachable_hands() {
            for dealer_up_card in [1, 6, 10] {
                let dealer = StrategyHand::from_card(dealer_up_card);
                let fresh = calculator
                    .all_expected_payouts(&StrategyState::new(player, dealer, false), &rule);
                let hit = calculator
                    .all_expected_payouts(&StrategyState::new(player, dealer, true), &rule);
                assert_eq!(fresh.surrender, 0.5);
                assert_eq!(hit.surrender, 0.0);
            }
        }
    }

    #[test]
    fn bust_player_can_still_surrender() {
        let calculator = Calculator::new();
        let state = StrategyState::new(hand(22, false), StrategyHand::from_card(10), false);
        let payouts = calculator.all_expected_payouts(&state, &get_typical_rule());
        assert_eq!(
            payouts,
            ExpectedPayouts {
                hit: 0.0,
                stand: 0.0,
                surrender: 0.5,
                best: 0.5
            }
        );

        let state = StrategyState { has_hit: true, ..state };
        assert_eq!(
            calculator.all_expected_payouts(&state, &get_typical_rule()),
            ExpectedPayouts::default()
        );
    }

    #[test]
    fn hard_twenty_stands_against_ten() {
        let calculator = Calculator::new();
        let state = StrategyState::new(hand(20, false), StrategyHand::from_card(10), false);
        let payouts = calculator.all_expected_payouts(&state, &get_typical_rule());
        assert!(payouts.stand > payouts.hit);
        assert_eq!(payouts.best, payouts.stand);
        assert_eq!(payouts.best_decision(), Decision::Stand);
    }

    #[test]
    fn low_hand_hits() {
        let calculator = Calculator::new();
        let state = StrategyState::new(hand(8, false), StrategyHand::from_card(10), false);
        let payouts = calculator.all_expected_payouts(&state, &get_typical_rule());
        assert!(payouts.hit > payouts.stand);
        assert_eq!(payouts.best_decision(), Decision::Hit);
    }

    #[test]
    fn hard_twenty_one_never_hits() {
        let calculator = Calculator::new();
        let state = StrategyState::new(hand(21, false), StrategyHand::from_card(9), true);
        let payouts = calculator.all_expected_payouts(&state, &get_typical_rule());
        // Every card busts a hard 21.
        assert_eq!(payouts.hit, 0.0);
        assert_eq!(payouts.best, payouts.stand);
    }

    #[test]
    fn best_is_max_of_actions() {
        let calculator = Calculator::new();
        let rule = get_typical_rule();
        for player in reachable_hands() {
            for dealer_up_card in 1..=10 {
                for has_hit in [false, true] {
                    let state = StrategyState::new(
                        player,
                        StrategyHand::from_card(dealer_up_card),
                        has_hit,
                    );
                    let payouts = calculator.all_expected_payouts(&state, &rule);
                    let max = payouts.hit.max(payouts.stand).max(payouts.surrender);
                    assert_eq!(payouts.best, max);
                    assert!((0.0..=2.0).contains(&payouts.best));
                }
            }
        }
    }

    #[test]
    fn hit_is_weighted_sum_of_next_states() {
        let calculator = Calculator::new();
        let rule = get_typical_rule();
        let state = StrategyState::new(hand(12, false), StrategyHand::from_card(4), false);
        let payouts = calculator.all_expected_payouts(&state, &rule);

        let mut hit = 0.0;
        for (card, p) in card_probabilities() {
            hit += calculator.all_expected_payouts(&state.hit(card), &rule).best * p;
        }
        assert_eq!(payouts.hit, hit);
    }

    #[test]
    fn rules_are_cached_separately() {
        let calculator = Calculator::new();
        let state = StrategyState::new(hand(18, false), StrategyHand::from_card(9), false);
        let lenient = calculator.all_expected_payouts(&state, &Rule { dealer_stand_threshold: 12 });
        let strict = calculator.all_expected_payouts(&state, &Rule { dealer_stand_threshold: 17 });
        assert_ne!(lenient.stand, strict.stand);

        // Asking again returns the cached values untouched.
        let sizes = calculator.cache_sizes();
        assert_eq!(
            calculator.all_expected_payouts(&state, &Rule { dealer_stand_threshold: 12 }),
            lenient
        );
        assert_eq!(calculator.cache_sizes(), sizes);
    }

    #[test]
    fn caches_fill_lazily() {
        let calculator = Calculator::new();
        assert_eq!(calculator.cache_sizes(), CacheSizes::default());

        let state = StrategyState::new(hand(15, false), StrategyHand::from_card(9), true);
        calculator.all_expected_payouts(&state, &get_typical_rule());
        let sizes = calculator.cache_sizes();
        assert!(sizes.dealer > 0);
        assert!(sizes.stand > 0);
        assert!(sizes.state > 0);
    }

    #[test]
    fn matches_uncached_calculator() {
        let calculator = Calculator::new();
        let uncached = UncachedCalculator::new();
        let rule = get_typical_rule();

        for (player, dealer_up_card, has_hit) in [
            (hand(18, false), 10, false),
            (hand(16, false), 10, false),
            (hand(15, false), 9, true),
            (hand(13, true), 6, false),
            (hand(20, false), 1, false),
            (hand(12, false), 10, true),
        ] {
            let state = StrategyState::new(
                player,
                StrategyHand::from_card(dealer_up_card),
                has_hit,
            );
            assert_eq!(
                calculator.all_expected_payouts(&state, &rule).best,
                uncached.all_expected_payouts(&state, &rule).best,
                "{:?}",
                state
            );
        }

        for dealer_up_card in 1..=10 {
            let dealer = StrategyHand::from_card(dealer_up_card);
            assert_eq!(
                calculator.dealer_score_distribution(&dealer, &rule),
                uncached.dealer_score_distribution(&dealer, &rule)
            );
        }
    }

    #[test]
    #[ignore]
    fn matches_uncached_calculator_from_single_ace() {
        // The uncached calculator walks the full tree here, which takes a long time.
        let state = StrategyState::new(hand(1, true), StrategyHand::from_card(7), false);
        let rule = get_typical_rule();
        let memoized = Calculator::new().all_expected_payouts(&state, &rule);
        let uncached = UncachedCalculator::new().all_expected_payouts(&state, &rule);
        println!("{:#?}", memoized);
        assert_eq!(memoized.best, uncached.best);
    }

    #[test]
    fn shared_between_threads() {
        let calculator = Arc::new(Calculator::new());
        let rule = get_typical_rule();

        let handles: Vec<_> = (1..=10u8)
            .map(|dealer_up_card| {
                let calculator = Arc::clone(&calculator);
                thread::spawn(move || {
                    let state = StrategyState::new(
                        hand(2, false),
                        StrategyHand::from_card(dealer_up_card),
                        false,
                    );
                    calculator.all_expected_payouts(&state, &rule)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let single = Calculator::new();
        for (i, result) in results.iter().enumerate() {
            let state = StrategyState::new(
                hand(2, false),
                StrategyHand::from_card(i as u8 + 1),
                false,
            );
            assert_eq!(*result, single.all_expected_payouts(&state, &rule));
        }
    }
}
