//! D4 symmetry group operations and state canonicalization

use serde::{Deserialize, Serialize};

use super::board::GameState;
use crate::types::{BOARD_SIZE, CanonicalKey};

/// D4 symmetry transformation (dihedral group of the square)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct D4Transform {
    /// Rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
    /// Whether to apply reflection
    pub reflection: bool,
}

impl D4Transform {
    /// Create identity transform
    pub fn identity() -> Self {
        D4Transform {
            rotation: 0,
            reflection: false,
        }
    }

    /// Get all 8 D4 transforms, identity first
    pub fn all() -> [D4Transform; 8] {
        let mut transforms = [Self::identity(); 8];
        for (i, rotation) in [0, 90, 180, 270].into_iter().enumerate() {
            transforms[2 * i] = D4Transform {
                rotation,
                reflection: false,
            };
            transforms[2 * i + 1] = D4Transform {
                rotation,
                reflection: true,
            };
        }
        transforms
    }

    /// Apply transform to a position (0-8)
    pub fn transform_position(&self, pos: usize) -> usize {
        let (mut row, mut col) = (pos / 3, pos % 3);

        // Mirror across the vertical axis before rotating.
        if self.reflection {
            col = 2 - col;
        }

        // Clockwise quarter turns
        for _ in 0..(self.rotation / 90) {
            let new_row = col;
            let new_col = 2 - row;
            row = new_row;
            col = new_col;
        }

        row * 3 + col
    }

    /// Apply the inverse transform to a position
    pub fn apply_inverse_to_pos(&self, pos: usize) -> usize {
        self.inverse().transform_position(pos)
    }

    /// Apply transform to any nine-cell grid
    pub fn apply_to_cells<T: Copy + Default>(&self, cells: &[T; BOARD_SIZE]) -> [T; BOARD_SIZE] {
        let mut transformed = [T::default(); BOARD_SIZE];
        for (idx, &value) in cells.iter().enumerate() {
            transformed[self.transform_position(idx)] = value;
        }
        transformed
    }

    /// Apply the inverse transform to any nine-cell grid
    pub fn apply_inverse_to_cells<T: Copy + Default>(
        &self,
        cells: &[T; BOARD_SIZE],
    ) -> [T; BOARD_SIZE] {
        self.inverse().apply_to_cells(cells)
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> D4Transform {
        if self.reflection {
            // Reflect-then-rotate compositions are involutions.
            *self
        } else {
            D4Transform {
                rotation: (360 - self.rotation) % 360,
                reflection: false,
            }
        }
    }
}

/// Canonical key of a state together with the transform that produced it.
///
/// Learned values live in the canonical frame, so action indices have to be
/// mapped through `transform` on the way in and back on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalContext {
    /// The canonical key
    pub key: CanonicalKey,
    /// The transform that maps the original board onto the canonical board
    pub transform: D4Transform,
    /// Mover-relative cells of the canonical board
    pub cells: [i8; BOARD_SIZE],
}

impl CanonicalContext {
    /// Map a move from original coordinates to canonical coordinates
    pub fn map_to_canonical(&self, original_move: usize) -> usize {
        self.transform.transform_position(original_move)
    }

    /// Map a move from canonical coordinates back to original coordinates
    pub fn map_to_original(&self, canonical_move: usize) -> usize {
        self.transform.apply_inverse_to_pos(canonical_move)
    }

    /// Re-index a canonical-frame value vector into the original frame
    pub fn values_to_original(&self, values: &[f64; BOARD_SIZE]) -> [f64; BOARD_SIZE] {
        self.transform.apply_inverse_to_cells(values)
    }
}

impl GameState {
    /// Compute the canonical key and transform in one pass.
    ///
    /// Ties between transforms yielding the same serialization go to the
    /// first transform in [`D4Transform::all`] order.
    pub fn canonical_context(&self) -> CanonicalContext {
        let relative = self.relative_cells();
        let mut serialized = CanonicalKey::serialize_cells(&relative);
        let mut transform = D4Transform::identity();
        let mut cells = relative;

        for candidate in D4Transform::all().into_iter().skip(1) {
            let image = candidate.apply_to_cells(&relative);
            let text = CanonicalKey::serialize_cells(&image);
            if text < serialized {
                serialized = text;
                transform = candidate;
                cells = image;
            }
        }

        CanonicalContext {
            key: CanonicalKey::from_canonical(serialized),
            transform,
            cells,
        }
    }

    /// Apply a D4 transform to the board, keeping the mover
    pub fn transform(&self, t: &D4Transform) -> GameState {
        GameState::from_cells(t.apply_to_cells(self.cells()), self.to_move())
    }
}

/// Map a state to its mover-relative, symmetry-reduced key.
pub fn canonicalize(state: &GameState) -> CanonicalKey {
    state.canonical_context().key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::{Cell, Player};

    #[test]
    fn test_identity_transform() {
        let t = D4Transform::identity();
        for i in 0..9 {
            assert_eq!(t.transform_position(i), i);
        }
    }

    #[test]
    fn test_rotation_90() {
        let t = D4Transform {
            rotation: 90,
            reflection: false,
        };
        // 0 1 2      6 3 0
        // 3 4 5  ->  7 4 1
        // 6 7 8      8 5 2
        assert_eq!(t.transform_position(0), 2);
        assert_eq!(t.transform_position(2), 8);
        assert_eq!(t.transform_position(4), 4);
        assert_eq!(t.transform_position(6), 0);
    }

    #[test]
    fn test_inverse_round_trips() {
        for t in D4Transform::all() {
            for i in 0..9 {
                assert_eq!(t.apply_inverse_to_pos(t.transform_position(i)), i);
            }
        }
    }

    #[test]
    fn test_transforms_are_distinct_permutations() {
        let images: Vec<Vec<usize>> = D4Transform::all()
            .iter()
            .map(|t| (0..9).map(|i| t.transform_position(i)).collect())
            .collect();
        for (i, a) in images.iter().enumerate() {
            let mut sorted = a.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..9).collect::<Vec<_>>());
            for b in &images[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_state_transform_moves_pieces_and_keeps_key() {
        let state = GameState::parse("X...O....").unwrap();
        let t = D4Transform {
            rotation: 90,
            reflection: false,
        };
        let rotated = state.transform(&t);
        assert_eq!(rotated.get(2), Cell::X);
        assert_eq!(rotated.get(4), Cell::O);
        assert!(rotated.is_empty(0));
        assert_eq!(rotated.to_move(), state.to_move());
        assert_eq!(canonicalize(&rotated), canonicalize(&state));
        assert_eq!(Cell::default(), Cell::Empty);
    }

    #[test]
    fn test_corner_openings_share_key() {
        let keys: Vec<CanonicalKey> = [0, 2, 6, 8]
            .iter()
            .map(|&m| canonicalize(&GameState::new().with_action(m).unwrap()))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        let center = canonicalize(&GameState::new().with_action(4).unwrap());
        assert_ne!(keys[0], center);
    }

    #[test]
    fn test_player_swap_shares_key() {
        let mut x_cells = [Cell::Empty; 9];
        x_cells[0] = Cell::X;
        x_cells[4] = Cell::O;
        let mut o_cells = [Cell::Empty; 9];
        o_cells[0] = Cell::O;
        o_cells[4] = Cell::X;

        let a = GameState::from_cells(x_cells, Player::X);
        let b = GameState::from_cells(o_cells, Player::O);
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn test_context_maps_moves_consistently() {
        let state = GameState::new().with_action(8).unwrap();
        let ctx = state.canonical_context();
        let key_cells = ctx.key.cells();
        // The opponent's piece sits where the canonical frame puts it.
        assert_eq!(key_cells[ctx.map_to_canonical(8)], -1);
        for a in state.legal_actions() {
            let c = ctx.map_to_canonical(a);
            assert_eq!(key_cells[c], 0);
            assert_eq!(ctx.map_to_original(c), a);
        }
    }
}
