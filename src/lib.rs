//! # N-Puzzle Solver Library
//!
//! This library provides the core model of the sliding-tile puzzle together
//! with two independent solving engines:
//! - a heuristic-guided best-first search (optimal A* and fast greedy
//!   variants), and
//! - a constructive "layer-reduction" solver that fixes the board one outer
//!   row or column at a time without searching.
//!
//! It is used by two binaries:
//! - `solve`: loads or generates a board and prints a move sequence.
//! - `compare`: runs every strategy over a batch of seeded random boards
//!   and reports move counts and node expansions.
//!
//! ## Modules
//! - `engine`: board representation (`Board`), goal construction, move
//!   application, the inversion-parity solvability oracle, and seeded
//!   random-board generation.
//! - `heuristics`: the Manhattan-distance estimator shared by both search
//!   strategies.
//! - `solver`: the priority best-first search solver (`SearchSolver`) and
//!   the solve-failure taxonomy (`SolveError`).
//! - `layering`: the constructive layer-reduction solver.
//! - `utils`: parsing board fixtures from text rows.

pub mod engine;
pub mod heuristics;
pub mod layering;
pub mod solver;
pub mod utils;

// Items from sub-modules, if public, should be accessed via their full
// path, e.g. `npuzzle_solver::solver::SearchSolver`. This keeps the
// top-level library namespace cleaner.
