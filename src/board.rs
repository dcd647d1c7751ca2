use rand::{seq::SliceRandom, Rng};
use std::fmt;

pub const SIDE: usize = 4;
pub const CELLS: usize = SIDE * SIDE;

/// One cell's label. Exactly one `Blank` exists on a well-formed board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Number(u8),
    Blank,
}

impl Tile {
    pub fn number(self) -> Option<u8> {
        match self {
            Tile::Number(n) => Some(n),
            Tile::Blank => None,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Number(n) => write!(f, "{:2}", n),
            Tile::Blank => write!(f, "  "),
        }
    }
}

/// 4x4 grid stored row-major: row = index / SIDE, column = index % SIDE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    tiles: [Tile; CELLS],
}

impl Board {
    /// The canonical goal: 1..15 in order, blank in the last cell.
    pub fn solved() -> Self {
        let mut tiles = [Tile::Blank; CELLS];
        for (i, tile) in tiles.iter_mut().take(CELLS - 1).enumerate() {
            *tile = Tile::Number(i as u8 + 1);
        }
        Self { tiles }
    }

    /// A uniformly random permutation, redrawn until it is solvable, not
    /// already solved, and free of a three-long run of consecutive
    /// ascending labels. A qualifying permutation always exists, so the
    /// loop terminates.
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut board = Self::solved();
        loop {
            board.tiles.shuffle(rng);
            if board.is_solvable() && !board.is_solved() && !has_ascending_run(&board.tiles) {
                return board;
            }
        }
    }

    /// Solved board with a single random legal slide applied. Debug state
    /// for exercising the win path without playing a full game.
    pub fn near_win<R: Rng>(rng: &mut R) -> Self {
        let mut board = Self::solved();
        let neighbors = [CELLS - 2, CELLS - 1 - SIDE];
        board.slide(neighbors[rng.gen_range(0..neighbors.len())]);
        board
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn blank_index(&self) -> Option<usize> {
        self.tiles.iter().position(|&tile| tile == Tile::Blank)
    }

    pub fn is_solved(&self) -> bool {
        self.tiles[CELLS - 1] == Tile::Blank
            && self.tiles[..CELLS - 1]
                .iter()
                .enumerate()
                .all(|(i, &tile)| tile == Tile::Number(i as u8 + 1))
    }

    /// Swaps `index` with the blank if the two cells are adjacent. Any
    /// other input, including an out-of-range index, leaves the board
    /// untouched and returns false.
    pub fn slide(&mut self, index: usize) -> bool {
        match self.blank_index() {
            Some(empty) if index < CELLS && are_adjacent(index, empty) => {
                self.tiles.swap(index, empty);
                true
            }
            _ => false,
        }
    }

    /// Standard 15-puzzle parity rule. For odd grids a position is
    /// solvable iff the inversion count is even; for even grids the
    /// blank's row (counted 1-based from the bottom) and the inversion
    /// count must have opposite parity.
    pub fn is_solvable(&self) -> bool {
        let empty = match self.blank_index() {
            Some(empty) => empty,
            None => return false,
        };
        let inversions = count_inversions(&self.tiles);

        if SIDE % 2 == 1 {
            inversions % 2 == 0
        } else {
            let row_from_bottom = SIDE - empty / SIDE;
            (inversions + row_from_bottom) % 2 == 1
        }
    }
}

/// Same row with column distance 1, or same column with row distance 1.
/// No wraparound, no diagonals.
pub fn are_adjacent(i: usize, j: usize) -> bool {
    let (row_i, col_i) = (i / SIDE, i % SIDE);
    let (row_j, col_j) = (j / SIDE, j % SIDE);
    (row_i == row_j && col_i.abs_diff(col_j) == 1)
        || (col_i == col_j && row_i.abs_diff(row_j) == 1)
}

/// Pairs (a, b) with a before b and a > b, blank excluded.
pub fn count_inversions(tiles: &[Tile]) -> usize {
    let labels: Vec<u8> = tiles.iter().filter_map(|tile| tile.number()).collect();
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| labels[i + 1..].iter().filter(|&&next| next < label).count())
        .sum()
}

/// Three adjacent cells holding consecutive ascending labels, e.g. 7 8 9.
/// Shuffles containing one read as nearly sorted, so they are rejected.
fn has_ascending_run(tiles: &[Tile]) -> bool {
    tiles.windows(3).any(|window| {
        match (window[0].number(), window[1].number(), window[2].number()) {
            (Some(a), Some(b), Some(c)) => a + 1 == b && b + 1 == c,
            _ => false,
        }
    })
}
