//! Hex board geometry with column-offset coordinates

use serde::{Deserialize, Serialize};

/// Board height in rows
pub const BOARD_ROWS: i8 = 11;

/// Board width in columns
pub const BOARD_COLS: i8 = 11;

/// Offset hex coordinates (row, col)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub row: i8,
    pub col: i8,
}

/// Direction offsets (dr, dc) for odd columns
/// Index: 0=N, 1=S, 2=W, 3=E, 4=SW, 5=SE
pub const ODD_COL_DIRECTIONS: [(i8, i8); 6] = [
    (-1, 0), // N
    (1, 0),  // S
    (0, -1), // W
    (0, 1),  // E
    (1, -1), // SW
    (1, 1),  // SE
];

/// Direction offsets (dr, dc) for even columns
/// The diagonal pair flips vertical sign relative to odd columns.
pub const EVEN_COL_DIRECTIONS: [(i8, i8); 6] = [
    (-1, 0),  // N
    (1, 0),   // S
    (0, -1),  // W
    (0, 1),   // E
    (-1, -1), // NW
    (-1, 1),  // NE
];

impl Hex {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this hex is on the board.
    ///
    /// Even columns of row 0 are cut from the grid (6 cells).
    pub fn is_valid(&self) -> bool {
        if self.row < 0 || self.row >= BOARD_ROWS || self.col < 0 || self.col >= BOARD_COLS {
            return false;
        }
        !(self.row == 0 && self.col % 2 == 0)
    }

    /// Direction table for this hex's column parity
    pub fn directions(&self) -> &'static [(i8, i8); 6] {
        if self.col % 2 == 0 {
            &EVEN_COL_DIRECTIONS
        } else {
            &ODD_COL_DIRECTIONS
        }
    }

    /// All on-board neighbors of this hex
    pub fn neighbors(&self) -> impl Iterator<Item = Hex> + '_ {
        self.directions()
            .iter()
            .map(move |&(dr, dc)| Hex::new(self.row + dr, self.col + dc))
            .filter(Hex::is_valid)
    }

    /// True adjacency (neighbor-set membership, not coordinate deltas)
    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.neighbors().any(|n| n == other)
    }

    /// Approximate distance between two hexes.
    ///
    /// Returns 1 for true adjacency; otherwise the max of the row/column
    /// deltas. This is an approximation, not an exact hex metric, and the
    /// movement/attack rules are defined independently of it.
    pub fn distance(&self, other: Hex) -> i8 {
        if *self == other {
            return 0;
        }
        if self.is_adjacent(other) {
            return 1;
        }
        let dr = (self.row - other.row).abs();
        let dc = (self.col - other.col).abs();
        dr.max(dc)
    }
}

/// Iterate every valid hex on the board
pub fn all_hexes() -> impl Iterator<Item = Hex> {
    (0..BOARD_ROWS)
        .flat_map(|row| (0..BOARD_COLS).map(move |col| Hex::new(row, col)))
        .filter(Hex::is_valid)
}
