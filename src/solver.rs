//! Heuristic-guided best-first search over board states.
//!
//! `SearchSolver` expands boards from a priority queue ordered by
//! `f = g + h` (A*, the `Optimal` strategy) or `f = h` alone (`Greedy`),
//! with `h` the Manhattan-distance estimate. Nodes live in a flat arena and
//! reference their parents by index, so path reconstruction is a walk over
//! `usize` links rather than shared ownership.

use crate::engine::Board;
use crate::heuristics::manhattan_distance;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failures of a solve attempt, for both the search solver and the
/// layer-reduction solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The wall-clock budget ran out before the goal was found. Retryable
    /// with a larger budget.
    #[error("search exceeded its time budget of {budget:?}")]
    Timeout { budget: Duration },
    /// The open set emptied without reaching the goal: no solution exists
    /// from this board.
    #[error("search space exhausted without reaching the goal")]
    Exhausted,
    /// A layer-solver progress guard fired. Either the board is unsolvable
    /// or an internal construction invariant was violated; callers should
    /// consult `Board::is_solvable` first to tell the two apart.
    #[error("construction guard tripped: {0}")]
    GuardTripped(&'static str),
}

/// The two priority orderings the search solver supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// A*: `f = g + h`. With the admissible Manhattan heuristic the
    /// returned move list is shortest possible.
    Optimal,
    /// Pure heuristic descent: `f = h`. Fast, not optimal.
    Greedy,
}

/// One explored board state in the node arena.
struct SearchNode {
    board: Board,
    g_cost: u32,
    parent: Option<usize>,
    moved: Option<(usize, usize)>,
}

/// Best-first search solver with a wall-clock budget.
///
/// A solver value is cheap and holds no per-board state between calls;
/// `nodes_expanded` is reset at the start of every solve and reports the
/// last run only.
pub struct SearchSolver {
    strategy: SearchStrategy,
    time_budget: Duration,
    nodes_expanded: u64,
}

impl SearchSolver {
    /// Creates a solver with the given strategy and wall-clock budget.
    pub fn new(strategy: SearchStrategy, time_budget: Duration) -> Self {
        SearchSolver {
            strategy,
            time_budget,
            nodes_expanded: 0,
        }
    }

    /// Number of nodes expanded by the most recent `solve` call.
    /// Diagnostic only; not part of the solve contract.
    pub fn nodes_expanded(&self) -> u64 {
        self.nodes_expanded
    }

    fn priority(&self, g_cost: u32, board: &Board) -> u32 {
        match self.strategy {
            SearchStrategy::Optimal => g_cost + manhattan_distance(board),
            SearchStrategy::Greedy => manhattan_distance(board),
        }
    }

    /// Searches for a move sequence that takes `start` to the goal.
    ///
    /// The open set is a min-heap keyed by `(f, insertion order)`; equal-`f`
    /// entries therefore pop in the order they were pushed, which keeps runs
    /// deterministic. A board may be pushed several times with improving `g`;
    /// stale entries are dropped lazily when popped against the best-g map.
    /// The timeout is polled once per expansion, so a solve may overrun the
    /// budget by at most one expansion.
    ///
    /// # Returns
    /// * `Ok(moves)`: tile coordinates that replay from `start` to the goal;
    ///   empty if `start` is already solved.
    /// * `Err(SolveError::Timeout)` if the budget ran out first.
    /// * `Err(SolveError::Exhausted)` if the reachable space was used up,
    ///   which on a connected puzzle component means `start` is unsolvable.
    pub fn solve(&mut self, start: &Board) -> Result<Vec<(usize, usize)>, SolveError> {
        self.nodes_expanded = 0;
        if start.is_solved() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let mut arena: Vec<SearchNode> = Vec::new();
        let mut open: BinaryHeap<(Reverse<(u32, u64)>, usize)> = BinaryHeap::new();
        let mut best_g: HashMap<Board, u32> = HashMap::new();
        let mut closed: HashSet<Board> = HashSet::new();
        let mut seq = 0u64;

        arena.push(SearchNode {
            board: start.clone(),
            g_cost: 0,
            parent: None,
            moved: None,
        });
        best_g.insert(start.clone(), 0);
        open.push((Reverse((self.priority(0, start), seq)), 0));

        while let Some((_, index)) = open.pop() {
            if started.elapsed() > self.time_budget {
                return Err(SolveError::Timeout {
                    budget: self.time_budget,
                });
            }

            let (board, g_cost) = {
                let node = &arena[index];
                (node.board.clone(), node.g_cost)
            };

            // Lazy deletion: a better path to this board was queued later.
            if best_g.get(&board).is_some_and(|&g| g < g_cost) {
                continue;
            }
            if !closed.insert(board.clone()) {
                continue;
            }
            self.nodes_expanded += 1;

            for tile in board.possible_moves() {
                let mut next = board.clone();
                next.slide(tile);

                if next.is_solved() {
                    arena.push(SearchNode {
                        board: next,
                        g_cost: g_cost + 1,
                        parent: Some(index),
                        moved: Some(tile),
                    });
                    return Ok(reconstruct_path(&arena, arena.len() - 1));
                }

                if closed.contains(&next) {
                    continue;
                }
                let next_g = g_cost + 1;
                if best_g.get(&next).is_some_and(|&g| g <= next_g) {
                    continue;
                }

                best_g.insert(next.clone(), next_g);
                let f = self.priority(next_g, &next);
                arena.push(SearchNode {
                    board: next,
                    g_cost: next_g,
                    parent: Some(index),
                    moved: Some(tile),
                });
                seq += 1;
                open.push((Reverse((f, seq)), arena.len() - 1));
            }
        }

        Err(SolveError::Exhausted)
    }
}

/// Walks parent links from the goal node back to the root and returns the
/// moves in forward order.
fn reconstruct_path(arena: &[SearchNode], goal_index: usize) -> Vec<(usize, usize)> {
    let mut moves = Vec::new();
    let mut cursor = goal_index;
    while let Some(tile) = arena[cursor].moved {
        moves.push(tile);
        cursor = arena[cursor]
            .parent
            .expect("node with a recorded move has a parent");
    }
    moves.reverse();
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;
    use std::collections::{HashMap, VecDeque};

    const BUDGET: Duration = Duration::from_secs(30);

    /// Replays `moves` on a copy of `board`, asserting every slide is legal,
    /// and returns the final board.
    fn replay(board: &Board, moves: &[(usize, usize)]) -> Board {
        let mut current = board.clone();
        for &tile in moves {
            assert!(
                current.slide(tile),
                "move {:?} is not adjacent to the blank",
                tile
            );
        }
        current
    }

    /// Shortest distance from `start` to the goal by plain BFS.
    fn bfs_distance(start: &Board) -> Option<u32> {
        let mut dist: HashMap<Board, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(start.clone(), 0);
        queue.push_back(start.clone());

        while let Some(board) = queue.pop_front() {
            let d = dist[&board];
            if board.is_solved() {
                return Some(d);
            }
            for tile in board.possible_moves() {
                let mut next = board.clone();
                next.slide(tile);
                if !dist.contains_key(&next) {
                    dist.insert(next.clone(), d + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[test]
    fn test_solved_board_returns_empty_list() {
        let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        let moves = solver.solve(&Board::goal(3, 3)).unwrap();
        assert!(moves.is_empty());
        assert_eq!(solver.nodes_expanded(), 0);
    }

    #[test]
    fn test_optimal_solves_near_goal_board_in_two_moves() {
        let board = board_from_str_array(&["1 2 3", "4 0 5", "7 8 6"]).unwrap();
        let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        let moves = solver.solve(&board).unwrap();
        assert_eq!(moves, vec![(1, 2), (2, 2)]);
        assert!(replay(&board, &moves).is_solved());
    }

    #[test]
    fn test_optimal_matches_bfs_distance_on_shuffled_boards() {
        for seed in 0..8 {
            let board = Board::shuffled(3, 3, 40, seed);
            let expected = bfs_distance(&board).unwrap();
            let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
            let moves = solver.solve(&board).unwrap();
            assert_eq!(
                moves.len() as u32,
                expected,
                "suboptimal solution for seed {}",
                seed
            );
            assert!(replay(&board, &moves).is_solved());
        }
    }

    #[test]
    fn test_greedy_reaches_goal_and_never_beats_optimal() {
        for seed in 0..8 {
            let board = Board::shuffled(3, 3, 40, seed);

            let mut optimal = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
            let optimal_moves = optimal.solve(&board).unwrap();

            let mut greedy = SearchSolver::new(SearchStrategy::Greedy, BUDGET);
            let greedy_moves = greedy.solve(&board).unwrap();

            assert!(replay(&board, &greedy_moves).is_solved());
            assert!(greedy_moves.len() >= optimal_moves.len());
        }
    }

    #[test]
    fn test_rectangular_boards_are_searchable() {
        let board = Board::shuffled(2, 4, 30, 5);
        let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        let moves = solver.solve(&board).unwrap();
        assert!(replay(&board, &moves).is_solved());
    }

    #[test]
    fn test_unsolvable_board_exhausts_search() {
        // 2x2 with two tiles swapped: the off-parity component has 12 states,
        // so exhaustion is quick.
        let board = board_from_str_array(&["2 1", "3 0"]).unwrap();
        assert!(!board.is_solvable());

        let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        assert_eq!(solver.solve(&board), Err(SolveError::Exhausted));
    }

    #[test]
    fn test_zero_budget_times_out() {
        let board = board_from_str_array(&[
            "5 1 2 3",
            "6 10 7 4",
            "9 14 0 8",
            "13 15 11 12",
        ])
        .unwrap();
        let mut solver = SearchSolver::new(SearchStrategy::Optimal, Duration::ZERO);
        assert_eq!(
            solver.solve(&board),
            Err(SolveError::Timeout {
                budget: Duration::ZERO
            })
        );
    }

    #[test]
    fn test_nodes_expanded_resets_between_solves() {
        let board = board_from_str_array(&["1 2 3", "4 0 5", "7 8 6"]).unwrap();
        let mut solver = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        solver.solve(&board).unwrap();
        assert!(solver.nodes_expanded() > 0);

        solver.solve(&Board::goal(3, 3)).unwrap();
        assert_eq!(solver.nodes_expanded(), 0);
    }

    #[test]
    fn test_deterministic_move_lists() {
        let board = Board::shuffled(3, 3, 60, 11);
        let mut a = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        let mut b = SearchSolver::new(SearchStrategy::Optimal, BUDGET);
        assert_eq!(a.solve(&board).unwrap(), b.solve(&board).unwrap());
    }
}
