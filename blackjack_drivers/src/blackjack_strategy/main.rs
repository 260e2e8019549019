use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use blackjack::simulation::{simulate, InfiniteShoe};
use blackjack::strategy::StrategyChart;
use blackjack::{
    AdviceError, Advisor, Calculator, ExpectationCalculator, Rank, Rule, StrategyHand,
    StrategyState, UncachedCalculator,
};
use blackjack_drivers::{default_config_path, parse_config_from_file, Config, ConfigError};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file. Defaults to ~/.blackjack.yml when it exists
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dealer stand threshold, overriding the config file
    #[arg(short, long)]
    threshold: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Expected payout of hit, stand and surrender for a hand
    Advise {
        /// Player cards, e.g. "A,7" or "10,2,3"
        #[arg(short, long)]
        player: String,
        /// Dealer up card
        #[arg(short, long)]
        dealer: String,
        #[arg(short, long, default_value_t = 1)]
        bet: u32,
    },
    /// Final score distribution of the dealer from an up card
    Dealer {
        #[arg(short, long)]
        dealer: String,
    },
    /// Best decision on the initial hand for every total and up card
    Chart {
        /// Worker threads, 0 for one per core
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Plays rounds out with random cards and compares with the exact expectation
    Simulate {
        #[arg(short, long)]
        player: String,
        #[arg(short, long)]
        dealer: String,
        #[arg(long)]
        rounds: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Times the memoized calculator against the uncached one
    Bench,
}

#[derive(Error, Debug)]
enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Advice(#[from] AdviceError),
}

fn load_config(args: &CommandLineArgs) -> Result<Config, ConfigError> {
    let mut config = match args.config.clone().or_else(default_config_path) {
        Some(path) => {
            log::debug!("Reading config from {}", path.display());
            parse_config_from_file(path)?
        }
        None => Config::default(),
    };
    if let Some(threshold) = args.threshold {
        config.rule.dealer_stand_threshold = threshold;
    }
    Ok(config)
}

fn parse_up_card(card: &str) -> Result<StrategyHand, AdviceError> {
    Ok(StrategyHand::from_card(Rank::parse(card)?.blackjack_value()))
}

fn run(args: CommandLineArgs) -> Result<(), DriverError> {
    let config = load_config(&args)?;
    let rule: Rule = config.rule.clone().try_into()?;
    log::info!("Dealer stands on {}", rule.dealer_stand_threshold);

    let calculator = Arc::new(Calculator::new());
    match args.command {
        Command::Advise {
            player,
            dealer,
            bet,
        } => {
            let advisor = Advisor::with_calculator(Arc::clone(&calculator));
            let player_cards = Rank::parse_list(&player)?;
            let dealer_up_card = Rank::parse(&dealer)?;
            let (payouts, decision) =
                advisor.recommend(&player_cards, dealer_up_card, bet, &rule)?;
            println!("Hit:       {:.6}", payouts.hit);
            println!("Stand:     {:.6}", payouts.stand);
            println!("Surrender: {:.6}", payouts.surrender);
            println!("Best:      {:.6} ({})", payouts.best, decision);
        }
        Command::Dealer { dealer } => {
            let dealer_hand = parse_up_card(&dealer)?;
            let distribution = calculator.dealer_score_distribution(&dealer_hand, &rule);
            print!("{}", distribution);
        }
        Command::Chart { threads } => {
            let number_of_threads = threads.unwrap_or(config.chart.number_of_threads);
            let start = Instant::now();
            let chart = StrategyChart::calculate(&calculator, &rule, number_of_threads);
            log::info!("Chart calculated in {:?}", start.elapsed());
            print!("{}", chart);
        }
        Command::Simulate {
            player,
            dealer,
            rounds,
            seed,
        } => {
            let state =
                Advisor::strategy_state(&Rank::parse_list(&player)?, Rank::parse(&dealer)?)?;
            let rounds = rounds.unwrap_or(config.simulation.rounds);
            let rng = match seed.or(config.simulation.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let exact = calculator.all_expected_payouts(&state, &rule);
            let summary = simulate(
                calculator.as_ref(),
                &state,
                &rule,
                rounds,
                &mut InfiniteShoe::new(rng),
            );
            println!("Exact:     {:.6} ({})", exact.best, exact.best_decision());
            println!(
                "Simulated: {:.6} ± {:.6} over {} rounds",
                summary.mean_payout, summary.standard_error, summary.rounds
            );
            println!(
                "Surrenders: {}, player busts: {}, dealer busts: {}",
                summary.surrenders, summary.player_busts, summary.dealer_busts
            );
        }
        Command::Bench => bench(&rule),
    }
    Ok(())
}

fn bench(rule: &Rule) {
    if rule.dealer_stand_threshold != 17 {
        log::warn!("The uncached calculator always stands on 17; results are not comparable");
    }
    let states = [
        StrategyState::new(StrategyHand::new(12, false), StrategyHand::from_card(10), false),
        StrategyState::new(StrategyHand::new(18, false), StrategyHand::from_card(10), false),
        StrategyState::new(StrategyHand::new(15, false), StrategyHand::from_card(9), true),
        StrategyState::new(StrategyHand::new(14, true), StrategyHand::from_card(6), false),
    ];

    let start = Instant::now();
    let calculator = Calculator::new();
    let memoized: Vec<f64> = states
        .iter()
        .map(|state| calculator.all_expected_payouts(state, rule).best)
        .collect();
    let memoized_elapsed = start.elapsed();

    let start = Instant::now();
    let uncached_calculator = UncachedCalculator::new();
    let uncached: Vec<f64> = states
        .iter()
        .map(|state| uncached_calculator.all_expected_payouts(state, rule).best)
        .collect();
    let uncached_elapsed = start.elapsed();

    log::info!("Memoized: {:?}, uncached: {:?}", memoized_elapsed, uncached_elapsed);
    log::info!(
        "Speedup: {:.1}x",
        uncached_elapsed.as_secs_f64() / memoized_elapsed.as_secs_f64().max(f64::EPSILON)
    );
    for (state, (m, u)) in states.iter().zip(memoized.iter().zip(uncached.iter())) {
        if m == u {
            println!("{:?}: {:.6}", state, m);
        } else {
            log::warn!("{:?}: memoized {} but uncached {}", state, m, u);
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
