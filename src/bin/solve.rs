use clap::{Parser, ValueEnum};
use npuzzle_solver::engine::Board;
use npuzzle_solver::layering::solve_by_layers;
use npuzzle_solver::solver::{SearchSolver, SearchStrategy, SolveError};
use npuzzle_solver::utils::board_from_str_array;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// A* search; shortest possible move list
    Optimal,
    /// Heuristic-only search; fast but longer solutions
    Greedy,
    /// Constructive layer reduction; scales to large boards
    Layers,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Solving strategy
    #[clap(short, long, value_enum, default_value_t = Strategy::Optimal)]
    strategy: Strategy,

    /// Wall-clock budget for the search strategies, in seconds
    #[clap(short, long, default_value_t = 120.0)]
    budget: f64,

    /// Rows of the generated board (ignored with a board file)
    #[clap(long, default_value_t = 4)]
    rows: usize,

    /// Columns of the generated board (ignored with a board file)
    #[clap(long, default_value_t = 4)]
    cols: usize,

    /// Random-walk length used to scramble the generated board
    #[clap(long, default_value_t = 200)]
    shuffle: usize,

    /// Seed for the generated board
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Path to a board file: one row per line, whitespace-separated tile
    /// values with 0 for the blank
    board_file: Option<PathBuf>,
}

fn read_board_file(path: &PathBuf) -> Result<Board, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    board_from_str_array(&lines).map_err(|e| format!("Invalid board format: {}", e))
}

fn main() {
    let args = Args::parse();

    let board = match &args.board_file {
        Some(path) => match read_board_file(path) {
            Ok(board) => {
                println!("Loaded board from {}\n", path.display());
                board
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Board::shuffled(args.rows, args.cols, args.shuffle, args.seed),
    };

    println!("Initial board state:\n{}", board);
    if board.rows() == board.cols() {
        println!("Solvable: {}\n", board.is_solvable());
    } else {
        println!();
    }

    let budget = Duration::from_secs_f64(args.budget);
    let result = match args.strategy {
        Strategy::Optimal => SearchSolver::new(SearchStrategy::Optimal, budget).solve(&board),
        Strategy::Greedy => SearchSolver::new(SearchStrategy::Greedy, budget).solve(&board),
        Strategy::Layers => solve_by_layers(&board),
    };

    match result {
        Ok(moves) => {
            println!("Moves ({}):", moves.len());
            if moves.is_empty() {
                println!("  Board is already solved.");
            }
            for (i, (r, c)) in moves.iter().enumerate() {
                println!("  Move {}: ({}, {})", i + 1, r, c);
            }
        }
        Err(SolveError::Timeout { budget }) => {
            eprintln!("No solution found within {:?}.", budget);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Solve failed: {}", e);
            std::process::exit(1);
        }
    }
}
