//! Core board model for the sliding-tile puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Board`: an R×C grid of tile values with one blank cell, including
//!   methods for move application, goal/solved checks, the inversion-parity
//!   solvability oracle, and seeded random-board generation.
//! - `BoardError`: validation failures for malformed input grids.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;

/// Validation failures for boards built from caller-supplied grids.
///
/// All variants are fail-fast malformed-input errors; none of them is
/// retryable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// A row's length disagrees with the first row's length.
    #[error("row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The grid is smaller than the 2×2 minimum.
    #[error("board must be at least 2x2, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
    /// A tile value is outside `0..rows*cols`.
    #[error("tile value {0} is out of range for this board")]
    ValueOutOfRange(u16),
    /// A tile value occurs more than once.
    #[error("tile value {0} appears more than once")]
    DuplicateValue(u16),
    /// A cell of a textual board description could not be parsed.
    #[error("cannot parse cell at row {row}, column {col}")]
    Unparsable { row: usize, col: usize },
}

/// Represents a sliding-tile puzzle board.
///
/// The board stores an R×C grid of distinct tile values `0..R*C`, where `0`
/// denotes the blank cell, plus the blank's position. The blank position is
/// kept consistent with the grid on every mutation; it is never recomputed
/// lazily.
///
/// A slide mutates the board in place (see [`Board::slide`]); clone the
/// board first when the previous state must be kept, as the search solver
/// does for each expansion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<u16>,
    blank_row: usize,
    blank_col: usize,
}

impl Board {
    /// Creates the canonical goal board for the given dimensions: tiles
    /// `1, 2, …, rows*cols-1` in row-major order with the blank last.
    ///
    /// # Panics
    /// Panics if either dimension is below 2.
    ///
    /// # Examples
    /// ```
    /// use npuzzle_solver::engine::Board;
    /// let goal = Board::goal(3, 3);
    /// assert_eq!(goal.get(0, 0), 1);
    /// assert_eq!(goal.get(2, 2), 0);
    /// assert_eq!(goal.blank_pos(), (2, 2));
    /// ```
    pub fn goal(rows: usize, cols: usize) -> Self {
        assert!(rows >= 2 && cols >= 2, "board must be at least 2x2");
        let count = rows * cols;
        let mut cells: Vec<u16> = (1..count as u16).collect();
        cells.push(0);
        Board {
            rows,
            cols,
            cells,
            blank_row: rows - 1,
            blank_col: cols - 1,
        }
    }

    /// Builds a board from a caller-supplied grid, validating that the grid
    /// is rectangular, at least 2×2, and a permutation of `0..rows*cols`.
    /// The blank position is located during validation, so the returned
    /// board always satisfies the blank-consistency invariant.
    ///
    /// # Returns
    /// * `Ok(Board)` if the grid is well formed.
    /// * `Err(BoardError)` describing the first malformation found.
    pub fn from_grid(grid: Vec<Vec<u16>>) -> Result<Self, BoardError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, |row| row.len());
        if rows < 2 || cols < 2 {
            return Err(BoardError::TooSmall { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, row) in grid.iter().enumerate() {
            if row.len() != cols {
                return Err(BoardError::NotRectangular {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        let count = rows * cols;
        let mut seen = vec![false; count];
        for &value in &cells {
            if value as usize >= count {
                return Err(BoardError::ValueOutOfRange(value));
            }
            if seen[value as usize] {
                return Err(BoardError::DuplicateValue(value));
            }
            seen[value as usize] = true;
        }

        // Exactly rows*cols cells holding distinct in-range values form a
        // permutation, so the blank is guaranteed to be present.
        let blank = cells
            .iter()
            .position(|&v| v == 0)
            .expect("validated permutation contains the blank");

        Ok(Board {
            rows,
            cols,
            cells,
            blank_row: blank / cols,
            blank_col: blank % cols,
        })
    }

    /// Generates a solvable board by applying `steps` random slides to the
    /// goal board, never immediately undoing the previous slide.
    ///
    /// The walk is seeded, so the same arguments always produce the same
    /// board. Unlike a full value shuffle this works for rectangular boards
    /// too, and the result is solvable by construction.
    pub fn shuffled(rows: usize, cols: usize, steps: usize, seed: u64) -> Self {
        let mut board = Board::goal(rows, cols);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut prev_blank: Option<(usize, usize)> = None;

        for _ in 0..steps {
            let blank = (board.blank_row, board.blank_col);
            let options: Vec<(usize, usize)> = board
                .possible_moves()
                .into_iter()
                .filter(|&tile| Some(tile) != prev_blank)
                .collect();
            let choice = options[rng.gen_range(0..options.len())];
            board.slide(choice);
            prev_blank = Some(blank);
        }
        board
    }

    /// Generates an N×N board from a seeded full shuffle of the tile values.
    ///
    /// The result may or may not be solvable; pair with
    /// [`Board::is_solvable`] when a solvable board is required.
    ///
    /// # Panics
    /// Panics if `n` is below 2.
    pub fn random(n: usize, seed: u64) -> Self {
        assert!(n >= 2, "board must be at least 2x2");
        let mut values: Vec<u16> = (0..(n * n) as u16).collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        values.shuffle(&mut rng);

        let blank = values
            .iter()
            .position(|&v| v == 0)
            .expect("shuffle preserves the blank");
        Board {
            rows: n,
            cols: n,
            cells: values,
            blank_row: blank / n,
            blank_col: blank % n,
        }
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the blank's `(row, col)` position.
    pub fn blank_pos(&self) -> (usize, usize) {
        (self.blank_row, self.blank_col)
    }

    /// Returns the tile value at `(r, c)`; `0` is the blank.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the board dimensions.
    pub fn get(&self, r: usize, c: usize) -> u16 {
        assert!(r < self.rows && c < self.cols, "cell out of bounds");
        self.cells[r * self.cols + c]
    }

    /// Returns the positions of the tiles that may slide into the blank:
    /// the up-to-four orthogonal neighbors of the blank cell.
    pub fn possible_moves(&self) -> Vec<(usize, usize)> {
        let dr = [-1isize, 1, 0, 0];
        let dc = [0isize, 0, -1, 1];
        let mut moves = Vec::with_capacity(4);

        for i in 0..4 {
            let nr = self.blank_row as isize + dr[i];
            let nc = self.blank_col as isize + dc[i];
            if nr >= 0 && nr < self.rows as isize && nc >= 0 && nc < self.cols as isize {
                moves.push((nr as usize, nc as usize));
            }
        }
        moves
    }

    /// Slides the tile at `tile` into the blank cell.
    ///
    /// # Returns
    /// * `true` if `tile` was orthogonally adjacent to the blank and the
    ///   slide was applied.
    /// * `false` if the move was invalid; the board is left unchanged.
    ///
    /// # Examples
    /// ```
    /// use npuzzle_solver::engine::Board;
    /// let mut board = Board::goal(3, 3);
    /// assert!(board.slide((2, 1)));          // tile 8 slides right
    /// assert_eq!(board.blank_pos(), (2, 1));
    /// assert!(!board.slide((0, 0)));         // not adjacent to the blank
    /// ```
    pub fn slide(&mut self, tile: (usize, usize)) -> bool {
        let (r, c) = tile;
        if r >= self.rows || c >= self.cols {
            return false;
        }
        if r.abs_diff(self.blank_row) + c.abs_diff(self.blank_col) != 1 {
            return false;
        }

        let blank_idx = self.blank_row * self.cols + self.blank_col;
        let tile_idx = r * self.cols + c;
        self.cells.swap(blank_idx, tile_idx);
        self.blank_row = r;
        self.blank_col = c;
        true
    }

    /// Checks whether the board is in the canonical goal configuration
    /// (ascending tiles with the blank in the last cell).
    pub fn is_solved(&self) -> bool {
        let last = self.cells.len() - 1;
        self.cells.iter().enumerate().all(|(i, &v)| {
            if i == last {
                v == 0
            } else {
                v == i as u16 + 1
            }
        })
    }

    /// Counts the inversions of the board read in row-major order with the
    /// blank excluded: pairs of tiles that appear out of ascending order.
    pub fn count_inversions(&self) -> usize {
        let tiles: Vec<u16> = self.cells.iter().copied().filter(|&v| v != 0).collect();

        let mut inversions = 0;
        for i in 0..tiles.len() {
            for j in i + 1..tiles.len() {
                if tiles[i] > tiles[j] {
                    inversions += 1;
                }
            }
        }
        inversions
    }

    /// Decides whether this board can reach the goal, using the
    /// inversion-parity test instead of search:
    /// - odd N: solvable iff the inversion count is even;
    /// - even N: solvable iff `(inversions + (N - blank_row)) % 2 == 1`,
    ///   with `blank_row` counted from the top.
    ///
    /// # Panics
    /// The parity test is defined for square boards only; panics on a
    /// rectangular board.
    pub fn is_solvable(&self) -> bool {
        assert!(
            self.rows == self.cols,
            "solvability parity test is defined for square boards only"
        );
        let inversions = self.count_inversions();

        if self.rows % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + (self.rows - self.blank_row)) % 2 == 1
        }
    }
}

impl fmt::Display for Board {
    /// Formats the board as an aligned numeric grid with `.` for the blank.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.rows * self.cols - 1).to_string().len();
        for r in 0..self.rows {
            for c in 0..self.cols {
                let v = self.get(r, c);
                if v == 0 {
                    write!(f, "{:>width$} ", ".")?;
                } else {
                    write!(f, "{v:>width$} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
