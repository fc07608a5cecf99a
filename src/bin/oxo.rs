//! oxo CLI - Train, evaluate and query the tic-tac-toe engine
//!
//! This CLI provides a unified interface for:
//! - Self-play training of the double Q-learner
//! - Evaluating a trained table against baseline opponents
//! - Playing interactively against any engine
//! - One-shot move, validation and value queries with JSON output

use anyhow::Result;
use clap::{Parser, Subcommand};
use oxo::cli::commands::{
    evaluate::{self, EvaluateArgs},
    play::{self, PlayArgs},
    query::{self, MoveArgs, ValidateArgs, ValuesArgs},
    train::{self, TrainArgs},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxo")]
#[command(
    version,
    about = "Tic-tac-toe engine: exact solver and double Q-learner",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the learner by self-play
    Train(Box<TrainArgs>),

    /// Evaluate a trained table against baseline opponents
    Evaluate(EvaluateArgs),

    /// Play against an engine in the terminal
    Play(PlayArgs),

    /// Choose a move for one board
    Move(MoveArgs),

    /// Validate a board
    Validate(ValidateArgs),

    /// Show the learned values for a board
    Values(ValuesArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => train::execute(*args),
        Commands::Evaluate(args) => evaluate::execute(args),
        Commands::Play(args) => play::execute(args),
        Commands::Move(args) => query::execute_move(args),
        Commands::Validate(args) => query::execute_validate(args),
        Commands::Values(args) => query::execute_values(args),
    }
}
