mod config;
mod output;
mod parse;
mod replay;
mod simulate;

use chrono::Utc;
use clap::Parser;
use elorank_core::{InitialItem, RankingEngine, StabilityCriteria};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use crate::config::EngineOverrides;
use crate::output::Summary;
use crate::simulate::{SimulationOptions, rank_correlation, run_simulation};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "elorank", version, about = "Rank items from pairwise win/loss/tie comparisons")]
struct Cli {
    /// Show progress during execution
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replay a comparison log and show rankings, progress and the next pair
    Replay(ReplayArgs),
    /// Rank synthetic items with hidden strengths, letting the engine pick every pair
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/elorank/config.toml
    Init,
}

#[derive(Parser)]
struct ReplayArgs {
    /// File with items: one id per line, or a JSON array of ids / {"id", "initial_rating"}
    #[arg(long)]
    items: Option<PathBuf>,

    /// Inline item id (repeatable)
    #[arg(long = "item")]
    inline_items: Vec<String>,

    /// JSONL comparison log: {"item1", "item2", "outcome": "win|loss|tie", "timestamp"?}.
    /// Reads stdin when omitted.
    #[arg(long)]
    comparisons: Option<PathBuf>,

    /// Fail on the first unparseable or rejected log line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    engine: EngineOverrides,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of synthetic items
    #[arg(long = "items", default_value_t = 20)]
    num_items: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Probability of any comparison ending in a tie
    #[arg(long, default_value_t = 0.0)]
    tie_rate: f64,

    /// Stop after this many comparisons even if not saturated
    #[arg(long, default_value_t = 100_000)]
    max_comparisons: usize,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    engine: EngineOverrides,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("ELORANK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay(args) => run_replay(args),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Init => {
            let path = config::default_config_path()
                .unwrap_or_else(|| bail("HOME environment variable not set"));
            config::write_default_config(&path).unwrap_or_else(|e| bail(e));
            println!("Created config at {}", path.display());
            println!("Edit it to set your default k-factor, rating floor, etc.");
        }
    }
}

/// Load items from all sources: --items file plus --item inline args.
fn load_items(args: &ReplayArgs) -> Vec<InitialItem> {
    let mut items = Vec::new();

    if let Some(ref path) = args.items {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read items file {}: {e}", path.display())));
        items = parse::parse_items_from_str(&content).unwrap_or_else(|e| bail(e));
    }

    items.extend(args.inline_items.iter().map(InitialItem::new));

    if items.is_empty() {
        bail("No items provided. Use --items <file> or --item <id>.");
    }
    items
}

fn read_comparison_log(args: &ReplayArgs) -> String {
    match args.comparisons {
        Some(ref path) => std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read comparison log {}: {e}", path.display()))),
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                return String::new();
            }
            let mut content = String::new();
            stdin
                .read_to_string(&mut content)
                .unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
            content
        }
    }
}

fn run_replay(args: ReplayArgs) {
    let (engine_config, criteria) = config::load_and_resolve(&args.engine);
    let items = load_items(&args);

    let mut engine = RankingEngine::new(items, engine_config)
        .unwrap_or_else(|e| bail(format!("Failed to set up ranking: {e}")));

    let now = Utc::now();
    let (results, parse_failures) = parse::parse_comparison_log(&read_comparison_log(&args), now);

    let stats = replay::replay_log(&mut engine, &results, &parse_failures, args.strict)
        .unwrap_or_else(|e| bail(e));

    report(&engine, &criteria, now, stats.applied, args.json, None);
}

fn run_simulate(args: SimulateArgs) {
    let (engine_config, criteria) = config::load_and_resolve(&args.engine);
    let options = SimulationOptions {
        num_items: args.num_items,
        seed: args.seed,
        tie_rate: args.tie_rate,
        max_comparisons: args.max_comparisons,
    };

    let result = run_simulation(&options, engine_config, &criteria);
    let strengths = &result.true_strengths;
    let lookup: &dyn Fn(&str) -> f64 = &|id: &str| strengths.get(id).copied().unwrap_or(f64::NAN);

    report(
        &result.engine,
        &criteria,
        Utc::now(),
        result.total_comparisons,
        args.json,
        Some((lookup, strengths)),
    );
}

type Truth<'a> = (&'a dyn Fn(&str) -> f64, &'a std::collections::HashMap<String, f64>);

fn report(
    engine: &RankingEngine,
    criteria: &StabilityCriteria,
    now: chrono::DateTime<Utc>,
    total_comparisons: usize,
    json: bool,
    truth: Option<Truth>,
) {
    let rankings = engine.rankings();
    let stable = engine.stable_items(criteria);
    let next = engine
        .next_comparison(now)
        .unwrap_or_else(|e| bail(format!("Pair selection failed: {e}")));

    let summary = Summary {
        total_comparisons,
        progress: engine.progress(criteria),
        stable: &stable,
        next: next.as_ref(),
        remaining: engine.remaining_comparisons(),
    };

    let true_strength = truth.map(|(lookup, _)| lookup);
    if json {
        let correlation = truth.and_then(|(_, strengths)| rank_correlation(&rankings, strengths));
        output::print_json(&rankings, &summary, true_strength, correlation);
    } else {
        output::print_table(&rankings, &summary, true_strength);
        if let Some(rho) = truth.and_then(|(_, strengths)| rank_correlation(&rankings, strengths)) {
            println!("Rank correlation with true strengths: {rho:.3}");
        }
    }
}
