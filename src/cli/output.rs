//! Output formatting for CLI

use crate::{pipeline::EvaluationResult, tictactoe::GameState};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a 0-1 rate as a percentage
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print the board with empty cells shown as their move index.
pub fn print_board(state: &GameState) {
    println!();
    for row in 0..3 {
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let pos = row * 3 + col;
                if state.is_empty(pos) {
                    pos.to_string()
                } else {
                    state.get(pos).to_char().to_string()
                }
            })
            .collect();
        println!(" {} | {} | {}", cells[0], cells[1], cells[2]);
        if row < 2 {
            println!("---+---+---");
        }
    }
    println!();
}

/// Print one evaluation result
pub fn print_evaluation(result: &EvaluationResult) {
    println!("\n{} vs {}", result.agent, result.opponent);
    print_kv("Games", &format_number(result.games as u64));
    print_kv(
        "Wins",
        &format!("{} ({})", result.wins, format_rate(result.win_rate)),
    );
    print_kv(
        "Draws",
        &format!("{} ({})", result.draws, format_rate(result.draw_rate)),
    );
    print_kv(
        "Losses",
        &format!("{} ({})", result.losses, format_rate(result.loss_rate)),
    );
    print_kv("Avg game length", &format!("{:.2}", result.avg_game_length));
}
