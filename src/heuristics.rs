use crate::engine::Board;

/// Calculates the Manhattan distance of a board from the goal.
///
/// For every non-blank tile `v`, the tile's goal cell is row `(v-1) / cols`
/// and column `(v-1) % cols`; the heuristic sums the horizontal plus
/// vertical distance of every tile from its goal cell. The blank contributes
/// nothing.
///
/// Each slide moves exactly one tile one cell, so the sum never overstates
/// the remaining move count: the estimate is admissible, and consistent,
/// which is what makes the `Optimal` search strategy return shortest
/// solutions.
///
/// # Arguments
/// * `board`: A reference to the `Board` to evaluate.
///
/// # Returns
/// The summed tile displacement as `u32`; `0` exactly when the board is
/// solved.
///
/// # Examples
/// ```
/// use npuzzle_solver::engine::Board;
/// use npuzzle_solver::heuristics::manhattan_distance;
///
/// let mut board = Board::goal(3, 3);
/// assert_eq!(manhattan_distance(&board), 0);
///
/// board.slide((1, 2)); // tile 6 moves one cell down
/// assert_eq!(manhattan_distance(&board), 1);
/// ```
pub fn manhattan_distance(board: &Board) -> u32 {
    let cols = board.cols();
    let mut total = 0u32;

    for r in 0..board.rows() {
        for c in 0..cols {
            let v = board.get(r, c);
            if v == 0 {
                continue;
            }
            let goal_r = (v as usize - 1) / cols;
            let goal_c = (v as usize - 1) % cols;
            total += (r.abs_diff(goal_r) + c.abs_diff(goal_c)) as u32;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_manhattan_zero_on_goal() {
        assert_eq!(manhattan_distance(&Board::goal(3, 3)), 0);
        assert_eq!(manhattan_distance(&Board::goal(4, 5)), 0);
    }

    #[test]
    fn test_manhattan_known_values() {
        // Tiles 6 and blank swapped relative to the goal: 6 is one cell off.
        let board = board_from_str_array(&["1 2 3", "4 5 0", "7 8 6"]).unwrap();
        assert_eq!(manhattan_distance(&board), 1);

        // 7 and 8 each one cell from home.
        let board = board_from_str_array(&["1 2 3", "4 5 6", "8 7 0"]).unwrap();
        assert_eq!(manhattan_distance(&board), 2);
    }

    #[test]
    fn test_manhattan_ignores_blank() {
        // Only the blank is displaced (impossible to reach by slides, but the
        // heuristic is defined on any permutation).
        let board = board_from_str_array(&["0 2 3", "4 5 6", "7 8 1"]).unwrap();
        // Tile 1 travels from (2,2) to (0,0): distance 4. Blank adds nothing.
        assert_eq!(manhattan_distance(&board), 4);
    }

    #[test]
    fn test_manhattan_never_exceeds_true_distance() {
        // This board solves in exactly two slides.
        let board = board_from_str_array(&["1 2 3", "4 0 5", "7 8 6"]).unwrap();
        assert!(manhattan_distance(&board) <= 2);
        assert_eq!(manhattan_distance(&board), 2);
    }

    #[test]
    fn test_manhattan_rectangular_board() {
        let mut board = Board::goal(2, 4);
        board.slide((1, 2)); // tile 7 right
        board.slide((0, 2)); // tile 3 down
        assert_eq!(manhattan_distance(&board), 2);
    }
}
