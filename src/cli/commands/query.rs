//! Move, validate and values commands - One-shot queries with JSON output

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    cli::{EngineKind, learner_config, load_learner, parse_board, parse_mover},
    query::{self, MoveQuery},
};

#[derive(Parser, Debug)]
#[command(about = "Choose a move for a board and print the response as JSON")]
pub struct MoveArgs {
    /// Board as nine integers ("1,0,-1,...") or a board string ("X.O......")
    pub board: String,

    /// Player to move (x or o); inferred when omitted
    #[arg(long, short = 'm')]
    pub mover: Option<String>,

    /// Engine answering the query
    #[arg(long, short = 'e', value_enum, default_value_t = EngineKind::Unbeatable)]
    pub engine: EngineKind,

    /// Table file used by the learner engine
    #[arg(long, short = 't', default_value = "q_table.json")]
    pub table: PathBuf,

    /// TOML training config whose `[learner]` section the table was trained with
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Random seed for the engine
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Validate a board and print the report as JSON")]
pub struct ValidateArgs {
    /// Board as nine integers ("1,0,-1,...") or a board string ("X.O......")
    pub board: String,
}

#[derive(Parser, Debug)]
#[command(about = "Print the learned values for a board as JSON")]
pub struct ValuesArgs {
    /// Board as nine integers ("1,0,-1,...") or a board string ("X.O......")
    pub board: String,

    /// Player to move (x or o); inferred when omitted
    #[arg(long, short = 'm')]
    pub mover: Option<String>,

    /// Table file to read
    #[arg(long, short = 't', default_value = "q_table.json")]
    pub table: PathBuf,

    /// TOML training config whose `[learner]` section the table was trained with
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

fn query_mover(implied: Option<i64>, explicit: Option<&str>) -> Result<Option<i64>> {
    match explicit {
        Some(value) => Ok(Some(parse_mover(value)?)),
        None => Ok(implied),
    }
}

pub fn execute_move(args: MoveArgs) -> Result<()> {
    let (board, implied_mover) = parse_board(&args.board)?;
    let mover = query_mover(implied_mover, args.mover.as_deref())?;

    let settings = learner_config(args.config.as_deref())?;
    let mut engine = args.engine.build(&args.table, &settings, args.seed);
    match query::answer(engine.as_mut(), &MoveQuery { board, mover }) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            bail!("{}", error.message)
        }
    }
}

pub fn execute_validate(args: ValidateArgs) -> Result<()> {
    let (board, _) = parse_board(&args.board)?;
    let report = query::validate(&board);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn execute_values(args: ValuesArgs) -> Result<()> {
    let (board, implied_mover) = parse_board(&args.board)?;
    let mover = query_mover(implied_mover, args.mover.as_deref())?;
    let state = query::decode_board(&board, mover).context("invalid board")?;

    let learner = load_learner(&args.table, &learner_config(args.config.as_deref())?);
    let summary = learner.value_summary(&state);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
