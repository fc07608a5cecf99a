//! Winning line analysis

use super::{Cell, Player};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Piece tally for a single line as seen by one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCount {
    pub own: u8,
    pub opponent: u8,
    pub empty: u8,
}

/// Utility for analyzing winning lines
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if a player has three in a row
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// All positions that would immediately win for the player, ascending
    pub fn winning_moves(cells: &[Cell; 9], player: Player) -> Vec<usize> {
        let mut moves: Vec<usize> = WINNING_LINES
            .iter()
            .filter_map(|line| Self::winning_move_in_line(cells, player, line))
            .collect();
        moves.sort_unstable();
        moves.dedup();
        moves
    }

    /// Number of lines where the player holds two cells and the third is empty
    pub fn threat_count(cells: &[Cell; 9], player: Player) -> usize {
        WINNING_LINES
            .iter()
            .filter(|line| Self::winning_move_in_line(cells, player, line).is_some())
            .count()
    }

    /// Tally every line from the player's point of view
    pub fn line_counts(cells: &[Cell; 9], player: Player) -> [LineCount; 8] {
        let own = player.to_cell();
        let mut counts = [LineCount {
            own: 0,
            opponent: 0,
            empty: 0,
        }; 8];
        for (count, line) in counts.iter_mut().zip(WINNING_LINES.iter()) {
            for &idx in line {
                match cells[idx] {
                    Cell::Empty => count.empty += 1,
                    c if c == own => count.own += 1,
                    _ => count.opponent += 1,
                }
            }
        }
        counts
    }

    fn winning_move_in_line(cells: &[Cell; 9], player: Player, line: &[usize; 3]) -> Option<usize> {
        let target = player.to_cell();
        let mut count = 0;
        let mut empty_pos = None;

        for &idx in line {
            match cells[idx] {
                Cell::Empty => {
                    if empty_pos.is_some() {
                        return None;
                    }
                    empty_pos = Some(idx);
                }
                c if c == target => count += 1,
                _ => return None,
            }
        }

        if count == 2 { empty_pos } else { None }
    }
}
