//! Evaluate command - Evaluate a trained table against baseline opponents

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::{
    cli::{
        learner_config, load_learner,
        output::{print_evaluation, print_kv, print_section},
    },
    pipeline::{EvaluationResult, GreedyAgent, OpponentKind, Seat, evaluate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeatArg {
    Alternate,
    First,
    Second,
}

impl From<SeatArg> for Seat {
    fn from(arg: SeatArg) -> Self {
        match arg {
            SeatArg::Alternate => Seat::Alternate,
            SeatArg::First => Seat::First,
            SeatArg::Second => Seat::Second,
        }
    }
}

fn parse_opponent(value: &str) -> std::result::Result<OpponentKind, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained table")]
pub struct EvaluateArgs {
    /// Path to the trained table file
    pub table: PathBuf,

    /// Opponent(s) to evaluate against; all of them when omitted
    #[arg(long, short = 'o', value_parser = parse_opponent)]
    pub opponent: Vec<OpponentKind>,

    /// Number of evaluation games per opponent
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Seat of the learner
    #[arg(long, value_enum, default_value_t = SeatArg::Alternate)]
    pub seat: SeatArg,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML training config whose `[learner]` section the table was trained with
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let learner = load_learner(&args.table, &learner_config(args.config.as_deref())?);
    let opponents = if args.opponent.is_empty() {
        OpponentKind::ALL.to_vec()
    } else {
        args.opponent.clone()
    };

    print_section("Evaluation");
    print_kv("Table", &args.table.display().to_string());
    print_kv("States", &learner.keys().len().to_string());
    print_kv("Episodes trained", &learner.episodes_trained().to_string());
    print_kv("Games per opponent", &args.games.to_string());

    let mut agent = GreedyAgent::new(learner, args.seed);
    let mut results = Vec::with_capacity(opponents.len());
    for (i, kind) in opponents.into_iter().enumerate() {
        let mut opponent = kind.build(args.seed.map(|s| s.wrapping_add(i as u64 + 1)));
        let result = evaluate(&mut agent, opponent.as_mut(), args.games, args.seat.into())
            .with_context(|| format!("evaluation against {kind} failed"))?;
        print_evaluation(&result);
        results.push(result);
    }

    if let Some(path) = &args.export {
        export_results(&args, &results, path)?;
        println!("\n✓ Results exported to: {}", path.display());
    }

    Ok(())
}

/// Export evaluation results to JSON
fn export_results(args: &EvaluateArgs, results: &[EvaluationResult], path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct EvaluationExport<'a> {
        table: String,
        games_per_opponent: usize,
        seed: Option<u64>,
        results: &'a [EvaluationResult],
    }

    let export = EvaluationExport {
        table: args.table.display().to_string(),
        games_per_opponent: args.games,
        seed: args.seed,
        results,
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &export)?;
    Ok(())
}
