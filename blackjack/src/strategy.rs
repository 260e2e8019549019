use std::fmt;
use std::thread;

use crate::calculation::{Calculator, ExpectationCalculator};
use crate::{Decision, Rule, StrategyHand, StrategyState};

/// Dealer up cards in the column order of a printed chart. The ace goes last.
pub const DEALER_UP_CARDS: [u8; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 1];

const MIN_HARD_TOTAL: u8 = 4;
const MAX_HARD_TOTAL: u8 = 20;
const MIN_SOFT_OTHER_CARD: u8 = 2;
const MAX_SOFT_OTHER_CARD: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Hard total of two non-ace cards.
    Hard(u8),
    /// An ace plus one other card.
    Soft(u8),
}

impl RowKind {
    fn player_hand(&self) -> StrategyHand {
        match *self {
            RowKind::Hard(total) => StrategyHand::new(total, false),
            RowKind::Soft(other_card) => StrategyHand::new(1 + other_card, true),
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Hard(total) => write!(f, "{}", total),
            RowKind::Soft(other_card) => write!(f, "A,{}", other_card),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub kind: RowKind,
    /// Indexed like [`DEALER_UP_CARDS`].
    pub decisions: [Decision; 10],
    pub best_payouts: [f64; 10],
}

/// Best decision on the initial two cards for every common hand and dealer up card,
/// the way basic strategy charts are printed.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyChart {
    pub rule: Rule,
    pub hard_rows: Vec<ChartRow>,
    pub soft_rows: Vec<ChartRow>,
}

impl StrategyChart {
    /// Fills the chart on `number_of_threads` threads sharing `calculator`. Zero
    /// means one thread per available core.
    pub fn calculate(calculator: &Calculator, rule: &Rule, number_of_threads: usize) -> Self {
        let number_of_threads = {
            if number_of_threads == 0 {
                let parallelism = thread::available_parallelism();
                match parallelism {
                    Ok(n) => n.get(),
                    Err(_) => 1,
                }
            } else {
                number_of_threads
            }
        };

        let kinds: Vec<RowKind> = (MIN_HARD_TOTAL..=MAX_HARD_TOTAL)
            .map(RowKind::Hard)
            .chain((MIN_SOFT_OTHER_CARD..=MAX_SOFT_OTHER_CARD).map(RowKind::Soft))
            .collect();
        log::debug!(
            "Calculating {} chart rows on {} threads",
            kinds.len(),
            number_of_threads
        );

        let mut rows: Vec<ChartRow> = thread::scope(|s| {
            let handles: Vec<_> = (0..number_of_threads)
                .map(|t| {
                    let kinds = &kinds;
                    s.spawn(move || {
                        kinds
                            .iter()
                            .skip(t)
                            .step_by(number_of_threads)
                            .map(|kind| calculate_row(calculator, rule, *kind))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(rows) => rows,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });
        rows.sort_by_key(|row| match row.kind {
            RowKind::Hard(total) => (0, total),
            RowKind::Soft(other_card) => (1, other_card),
        });

        let cache_sizes = calculator.cache_sizes();
        log::debug!(
            "Chart done. Cached {} dealer, {} stand and {} player states",
            cache_sizes.dealer,
            cache_sizes.stand,
            cache_sizes.state
        );

        let (hard_rows, soft_rows): (Vec<ChartRow>, Vec<ChartRow>) = rows
            .into_iter()
            .partition(|row| matches!(row.kind, RowKind::Hard(_)));
        StrategyChart {
            rule: *rule,
            hard_rows,
            soft_rows,
        }
    }

    pub fn hard_decision(&self, total: u8, dealer_up_card: u8) -> Option<Decision> {
        Self::find(&self.hard_rows, RowKind::Hard(total), dealer_up_card)
    }

    pub fn soft_decision(&self, other_card: u8, dealer_up_card: u8) -> Option<Decision> {
        Self::find(&self.soft_rows, RowKind::Soft(other_card), dealer_up_card)
    }

    fn find(rows: &[ChartRow], kind: RowKind, dealer_up_card: u8) -> Option<Decision> {
        let col = DEALER_UP_CARDS.iter().position(|c| *c == dealer_up_card)?;
        rows.iter()
            .find(|row| row.kind == kind)
            .map(|row| row.decisions[col])
    }
}

fn calculate_row(calculator: &Calculator, rule: &Rule, kind: RowKind) -> ChartRow {
    let mut decisions = [Decision::Hit; 10];
    let mut best_payouts = [0.0; 10];
    for (col, dealer_up_card) in DEALER_UP_CARDS.iter().enumerate() {
        let state = StrategyState::new(
            kind.player_hand(),
            StrategyHand::from_card(*dealer_up_card),
            false,
        );
        let payouts = calculator.all_expected_payouts(&state, rule);
        decisions[col] = payouts.best_decision();
        best_payouts[col] = payouts.best;
    }
    ChartRow {
        kind,
        decisions,
        best_payouts,
    }
}

impl fmt::Display for StrategyChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dealer stands on {}",
            self.rule.dealer_stand_threshold
        )?;
        write!(f, "      ")?;
        for dealer_up_card in DEALER_UP_CARDS {
            match dealer_up_card {
                1 => write!(f, "{:>3}", 'A')?,
                _ => write!(f, "{:>3}", dealer_up_card)?,
            }
        }
        writeln!(f)?;

        writeln!(f, "Hard:")?;
        for row in &self.hard_rows {
            write_row(f, row)?;
        }
        writeln!(f, "Soft:")?;
        for row in &self.soft_rows {
            write_row(f, row)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &ChartRow) -> fmt::Result {
    write!(f, "{:>6}", row.kind.to_string())?;
    for decision in row.decisions {
        write!(f, "{:>3}", decision.to_char())?;
    }
    writeln!(f)
}
