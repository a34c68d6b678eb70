use crate::engine::{Board, BoardError};

/// Parses an array of string slices into a `Board`.
///
/// Each string slice represents one row, starting from row 0. Cells are
/// whitespace-separated non-negative integers; `0` is the blank. The parsed
/// grid goes through the full `Board::from_grid` validation, so the result
/// is rectangular, at least 2×2, and a permutation of `0..rows*cols`.
///
/// # Arguments
/// * `s`: A slice of string slices (`&[&str]`) representing the rows of the
///   board, top row first.
///
/// # Returns
/// * `Ok(Board)` if every cell parses and the grid is well formed.
/// * `Err(BoardError::Unparsable)` naming the first cell that is not an
///   integer, or any `Board::from_grid` validation error.
///
/// # Examples
/// ```
/// use npuzzle_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&[
///     "1 2 3",
///     "4 0 5",
///     "7 8 6",
/// ]).unwrap();
/// assert_eq!(board.blank_pos(), (1, 1));
/// assert_eq!(board.get(2, 0), 7);
///
/// assert!(board_from_str_array(&["1 x", "2 3"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, BoardError> {
    let mut grid = Vec::with_capacity(s.len());

    for (r, row_str) in s.iter().enumerate() {
        let mut row = Vec::new();
        for (c, cell) in row_str.split_whitespace().enumerate() {
            let value: u16 = cell
                .parse()
                .map_err(|_| BoardError::Unparsable { row: r, col: c })?;
            row.push(value);
        }
        grid.push(row);
    }

    Board::from_grid(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["1 2 3", "4 5 6", "7 8 0"]).unwrap();
        assert!(board.is_solved());
        assert_eq!(board.blank_pos(), (2, 2));
    }

    #[test]
    fn test_board_from_str_array_extra_whitespace() {
        let board = board_from_str_array(&["  1   2 ", "0 3"]).unwrap();
        assert_eq!(board.get(0, 1), 2);
        assert_eq!(board.blank_pos(), (1, 0));
    }

    #[test]
    fn test_board_from_str_array_unparsable_cell() {
        assert_eq!(
            board_from_str_array(&["1 2", "x 0"]),
            Err(BoardError::Unparsable { row: 1, col: 0 })
        );
        // Negative numbers do not parse as u16.
        assert_eq!(
            board_from_str_array(&["1 -2", "3 0"]),
            Err(BoardError::Unparsable { row: 0, col: 1 })
        );
    }

    #[test]
    fn test_board_from_str_array_propagates_grid_validation() {
        assert_eq!(
            board_from_str_array(&["1 2 3", "4 0"]),
            Err(BoardError::NotRectangular {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            board_from_str_array(&["1 0"]),
            Err(BoardError::TooSmall { rows: 1, cols: 2 })
        );
        assert_eq!(
            board_from_str_array(&["1 1", "2 0"]),
            Err(BoardError::DuplicateValue(1))
        );
    }
}
