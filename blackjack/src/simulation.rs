//! Monte Carlo play-out used to cross-check the exact calculators.

use rand::Rng;
use serde::Serialize;

use crate::calculation::ExpectationCalculator;
use crate::hand::BUST;
use crate::{Decision, Rule, StrategyHand, StrategyState};

static FACE_VALUE_TO_BLACKJACK_VALUE: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

/// A shoe with infinitely many decks: every face value is equally likely on every
/// draw, whatever has been dealt before.
#[derive(Debug, Clone)]
pub struct InfiniteShoe<R: Rng> {
    rng: R,
}

impl<R: Rng> InfiniteShoe<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Deals a card and returns its blackjack value.
    pub fn deal_card(&mut self) -> u8 {
        let face_value = self.rng.gen_range(1..=13);
        FACE_VALUE_TO_BLACKJACK_VALUE[face_value - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SimulationSummary {
    pub rounds: u64,
    pub mean_payout: f64,
    pub standard_error: f64,
    pub surrenders: u64,
    pub player_busts: u64,
    pub dealer_busts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RoundEnd {
    Surrender,
    PlayerBust,
    DealerBust,
    Showdown,
}

/// Plays `rounds` independent rounds from `state`. The player always takes the best
/// decision of `calculator`, and the dealer draws until reaching the stand threshold.
pub fn simulate<C: ExpectationCalculator, R: Rng>(
    calculator: &C,
    state: &StrategyState,
    rule: &Rule,
    rounds: u64,
    shoe: &mut InfiniteShoe<R>,
) -> SimulationSummary {
    let mut summary = SimulationSummary {
        rounds,
        ..Default::default()
    };
    if rounds == 0 {
        return summary;
    }

    let (mut sum, mut sum_of_squares) = (0.0, 0.0);
    for _ in 0..rounds {
        let (payout, end) = play_round(calculator, state, rule, shoe);
        sum += payout;
        sum_of_squares += payout * payout;
        match end {
            RoundEnd::Surrender => summary.surrenders += 1,
            RoundEnd::PlayerBust => summary.player_busts += 1,
            RoundEnd::DealerBust => summary.dealer_busts += 1,
            RoundEnd::Showdown => {}
        }
    }

    let n = rounds as f64;
    let mean = sum / n;
    let variance = (sum_of_squares / n - mean * mean).max(0.0);
    summary.mean_payout = mean;
    summary.standard_error = (variance / n).sqrt();
    log::debug!(
        "Simulated {} rounds from {:?}: mean payout {:.6} ± {:.6}",
        rounds,
        state,
        summary.mean_payout,
        summary.standard_error
    );
    summary
}

fn play_round<C: ExpectationCalculator, R: Rng>(
    calculator: &C,
    state: &StrategyState,
    rule: &Rule,
    shoe: &mut InfiniteShoe<R>,
) -> (f64, RoundEnd) {
    let mut state = *state;
    loop {
        let payouts = calculator.all_expected_payouts(&state, rule);
        match payouts.best_decision() {
            Decision::Surrender => return (payouts.surrender, RoundEnd::Surrender),
            Decision::Hit => state = state.hit(shoe.deal_card()),
            Decision::Stand => break,
        }
    }

    let player_score = state.player.realized_score();
    if player_score == BUST {
        return (0.0, RoundEnd::PlayerBust);
    }

    let dealer_score = dealer_plays(&state.dealer, rule, shoe);
    if dealer_score == BUST {
        return (2.0, RoundEnd::DealerBust);
    }
    let payout = match player_score.cmp(&dealer_score) {
        std::cmp::Ordering::Greater => 2.0,
        std::cmp::Ordering::Equal => 1.0,
        std::cmp::Ordering::Less => 0.0,
    };
    (payout, RoundEnd::Showdown)
}

/// Draws for the dealer and returns the final realized score.
fn dealer_plays<R: Rng>(dealer_hand: &StrategyHand, rule: &Rule, shoe: &mut InfiniteShoe<R>) -> u8 {
    let mut dealer_hand = *dealer_hand;
    loop {
        let score = dealer_hand.realized_score();
        if score == BUST || score >= rule.dealer_stand_threshold {
            return score;
        }
        dealer_hand = dealer_hand.add_card(shoe.deal_card());
    }
}
