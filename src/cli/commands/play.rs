//! Play command - Interactive game against an engine

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{EngineKind, learner_config, output::print_board, parse_mover},
    query::{MoveQuery, answer},
    tictactoe::{GameState, Outcome, Player},
};

#[derive(Parser, Debug)]
#[command(about = "Play against the engine in the terminal")]
pub struct PlayArgs {
    /// Table file used by the learner engine
    #[arg(long, short = 't', default_value = "q_table.json")]
    pub table: PathBuf,

    /// TOML training config whose `[learner]` section the table was trained with
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Engine to play against
    #[arg(long, short = 'e', value_enum, default_value_t = EngineKind::Learner)]
    pub engine: EngineKind,

    /// Side you play (x moves first)
    #[arg(long, default_value = "x")]
    pub side: String,

    /// Random seed for the engine
    #[arg(long)]
    pub seed: Option<u64>,
}

fn read_move(input: &mut impl BufRead, state: &GameState) -> Result<Option<usize>> {
    loop {
        print!("Your move (0-8, q to quit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(pos) if pos < 9 && state.is_empty(pos) => return Ok(Some(pos)),
            _ => println!("'{line}' is not a free square"),
        }
    }
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let human = match parse_mover(&args.side)? {
        1 => Player::X,
        _ => Player::O,
    };
    let settings = learner_config(args.config.as_deref())?;
    let mut engine = args.engine.build(&args.table, &settings, args.seed);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut state = GameState::new();

    println!("You are {human:?}; the engine is {}.", engine.name());
    print_board(&state);

    while !state.is_terminal() {
        if state.to_move() == human {
            let Some(pos) = read_move(&mut input, &state)? else {
                println!("Bye.");
                return Ok(());
            };
            state.apply(pos).context("illegal move")?;
        } else {
            let query = MoveQuery {
                board: state.to_wire().iter().map(|&v| i64::from(v)).collect(),
                mover: Some(i64::from(state.to_move().sign())),
            };
            let response = answer(engine.as_mut(), &query)
                .map_err(|e| anyhow::anyhow!("{} ({})", e.message, e.code))?;
            println!("Engine plays {}", response.action);
            state.apply(response.action).context("engine move rejected")?;
        }
        print_board(&state);
    }

    match state.outcome() {
        Outcome::Win(player) if player == human => println!("You win!"),
        Outcome::Win(_) => println!("The engine wins."),
        _ => println!("Draw."),
    }
    Ok(())
}
