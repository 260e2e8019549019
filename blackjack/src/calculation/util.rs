/// Probability of drawing each blackjack value from an infinite shoe, indexed by
/// `blackjack_value - 1`. Ace is 1; 10 covers ten, jack, queen and king.
pub const CARD_PROBABILITIES: [f64; 10] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    4.0 / 13.0,
];

/// `blackjack_value` must be in [1, 10], 1 being an ace.
pub(crate) fn get_card_probability(blackjack_value: u8) -> f64 {
    CARD_PROBABILITIES[(blackjack_value - 1) as usize]
}

/// Iterates `(blackjack_value, probability)` in ascending card order. Both
/// calculators sum in this order, which keeps their results bit-identical.
pub fn card_probabilities() -> impl Iterator<Item = (u8, f64)> {
    (1..=10u8).map(|card| (card, get_card_probability(card)))
}
