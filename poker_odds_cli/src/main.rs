use clap::Parser;
use std::error::Error;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use poker_odds_core::{
    parse_cards, AbortSignal, Card, Session, SimulationConfig, Simulator, StageReport, Street,
    DEFAULT_CHUNKS, DEFAULT_TRIALS, HOLE_SIZE,
};

#[derive(Parser, Debug)]
#[command(
    name = "poker-odds",
    about = "Estimate Texas Hold'em win probability against one opponent",
    long_about = "Estimate Texas Hold'em win probability against one random opponent with \
                  Monte Carlo simulation.\n\
                  Without --hole the program asks for the hole cards, flop, turn and river \
                  one card at a time and reports after each stage."
)]
struct Args {
    /// Number of simulated deals per stage
    #[arg(short = 'n', long, default_value_t = DEFAULT_TRIALS, value_parser = clap::value_parser!(u64).range(1..))]
    trials: u64,

    /// Seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Size of a dedicated worker pool (default: one worker per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Number of independent work units the trials are split into
    #[arg(long, default_value_t = DEFAULT_CHUNKS)]
    chunks: usize,

    /// Print reports as JSON lines
    #[arg(long)]
    json: bool,

    /// Hole cards for a single non-interactive run (e.g. "AhKs")
    #[arg(long)]
    hole: Option<String>,

    /// Known community cards for the non-interactive run (0, 3, 4 or 5 cards)
    #[arg(long, requires = "hole")]
    board: Option<String>,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            trials: self.trials,
            seed: self.seed,
            threads: self.threads,
            chunks: self.chunks,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // 日志写到 stderr，stdout 只输出结果
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let simulator = Simulator::new(args.config());
    debug!(config = ?simulator.config(), "simulator ready");

    match &args.hole {
        Some(hole) => run_once(&simulator, hole, args.board.as_deref().unwrap_or_default(), args.json).await,
        None => run_interactive(&simulator, args.json).await,
    }
}

/// 命令行直接给出全部已知的牌，只计算一次
async fn run_once(simulator: &Simulator, hole: &str, board: &str, json: bool) -> Result<(), Box<dyn Error>> {
    let hole = parse_cards(hole)?;
    if hole.len() != HOLE_SIZE {
        return Err(format!("expected {HOLE_SIZE} hole cards, got {}", hole.len()).into());
    }

    let mut session = Session::new();
    for card in hole.into_iter().chain(parse_cards(board)?) {
        session.choose(card)?;
    }
    let (Some(street), Some(hole_cards)) = (session.street(), session.hole_cards()) else {
        return Err(format!("board must have 0, 3, 4 or 5 cards, got {}", session.board().len()).into());
    };

    let report = simulate(simulator, street, hole_cards, session.board()).await?;
    print_report(&report, json)
}

/// 交互模式：逐张读入底牌、翻牌、转牌、河牌，每完成一轮就输出一次胜率
async fn run_interactive(simulator: &Simulator, json: bool) -> Result<(), Box<dyn Error>> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new();

    println!("--- Poker odds ---");
    println!("Cards are two characters: rank (2-9, T, J, Q, K, A) then suit (H, D, C, S).");
    println!("Type `quit` to leave.");

    while !session.is_complete() {
        // 刚输出过一轮的结果
        if session.street().is_some() {
            println!();
        }
        print!("{}", prompt_for(&session));
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = stdin.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        match session.choose_code(input) {
            Ok(card) => debug!(%card, "card selected"),
            Err(e) if e.is_recoverable() => {
                println!("{e}. Please try again.");
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if let (Some(street), Some(hole_cards)) = (session.street(), session.hole_cards()) {
            let report = simulate(simulator, street, hole_cards, session.board()).await?;
            print_report(&report, json)?;
        }
    }

    Ok(())
}

/// 在阻塞线程池里运行模拟；Ctrl-C 会中止模拟并返回已完成部分的结果
async fn simulate(
    simulator: &Simulator,
    street: Street,
    hole_cards: [Card; HOLE_SIZE],
    board: &[Card],
) -> Result<StageReport, Box<dyn Error>> {
    let abort = AbortSignal::new();
    let task_abort = abort.clone();
    let task_simulator = simulator.clone();
    let task_board = board.to_vec();
    let mut task = tokio::task::spawn_blocking(move || task_simulator.run(hole_cards, &task_board, &task_abort));

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, reporting the trials completed so far");
            abort.abort();
            task.await
        }
    };
    let result = joined??;
    Ok(StageReport::new(street, hole_cards, board, result).aborted(abort.is_aborted()))
}

fn print_report(report: &StageReport, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn prompt_for(session: &Session) -> String {
    let needed = session.cards_needed();
    match session.pending_street() {
        Some(Street::PreFlop) => {
            let n = HOLE_SIZE - needed + 1;
            if n == 1 {
                format!("Enter hole card {n} (e.g. AH for Ace of Hearts, TS for Ten of Spades): ")
            } else {
                format!("Enter hole card {n}: ")
            }
        }
        Some(Street::Flop) => format!("Enter flop card {}: ", Street::Flop.board_len() - needed + 1),
        Some(Street::Turn) => "Enter the turn card: ".to_string(),
        Some(Street::River) => "Enter the river card: ".to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["poker-odds"]).unwrap();
        assert_eq!(args.config(), SimulationConfig::default());
        assert!(args.hole.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_args_one_shot() {
        let args = Args::try_parse_from([
            "poker-odds", "-n", "500", "--seed", "7", "--threads", "2", "--hole", "AhKs", "--board", "2c 7d 9h",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.trials, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.threads, Some(2));
        assert_eq!(args.hole.as_deref(), Some("AhKs"));
        assert_eq!(args.board.as_deref(), Some("2c 7d 9h"));
    }

    #[test]
    fn test_args_reject_zero_trials_and_board_without_hole() {
        assert!(Args::try_parse_from(["poker-odds", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["poker-odds", "--board", "2c7d9h"]).is_err());
    }

    #[test]
    fn test_prompts_follow_the_streets() {
        let mut session = Session::new();
        let mut prompts = Vec::new();
        for code in ["AH", "KS", "2C", "7D", "9H", "TC", "3S"] {
            prompts.push(prompt_for(&session));
            session.choose_code(code).unwrap();
        }
        assert!(prompts[0].starts_with("Enter hole card 1 (e.g."));
        assert_eq!(prompts[1], "Enter hole card 2: ");
        assert_eq!(prompts[2], "Enter flop card 1: ");
        assert_eq!(prompts[4], "Enter flop card 3: ");
        assert_eq!(prompts[5], "Enter the turn card: ");
        assert_eq!(prompts[6], "Enter the river card: ");
        assert_eq!(prompt_for(&session), "");
    }

    #[tokio::test]
    async fn test_one_shot_on_the_river() {
        let simulator = Simulator::new(SimulationConfig { trials: 200, seed: Some(1), ..SimulationConfig::default() });
        run_once(&simulator, "AsAh", "AdAcKd7c2h", false).await.unwrap();
        assert!(run_once(&simulator, "As", "", false).await.is_err());
        assert!(run_once(&simulator, "AsAh", "AdAc", false).await.is_err());
        assert!(run_once(&simulator, "AsAh", "AsAcKd", false).await.is_err());
    }
}
