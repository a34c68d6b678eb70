use clap::Parser;
use npuzzle_solver::engine::Board;
use npuzzle_solver::layering::solve_by_layers;
use npuzzle_solver::solver::{SearchSolver, SearchStrategy, SolveError};
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of boards to run per strategy
    #[clap(long, default_value_t = 20)]
    boards: u64,

    /// Board side length
    #[clap(long, default_value_t = 4)]
    size: usize,

    /// Random-walk length used to scramble each board
    #[clap(long, default_value_t = 80)]
    shuffle: usize,

    /// Wall-clock budget per search solve, in seconds
    #[clap(long, default_value_t = 30.0)]
    budget: f64,
}

#[derive(Default)]
struct Tally {
    solved: u64,
    timeouts: u64,
    total_moves: u64,
    total_expanded: u64,
}

impl Tally {
    fn report(&self, name: &str, boards: u64) {
        print!(
            "{:<10} solved {:>3}/{}   avg moves {:>7.2}",
            name,
            self.solved,
            boards,
            if self.solved > 0 {
                self.total_moves as f64 / self.solved as f64
            } else {
                0.0
            }
        );
        if self.total_expanded > 0 {
            print!("   avg nodes {:>10.1}", self.total_expanded as f64 / self.solved.max(1) as f64);
        }
        if self.timeouts > 0 {
            print!("   timeouts {}", self.timeouts);
        }
        println!();
    }
}

fn main() {
    let args = Args::parse();
    let budget = Duration::from_secs_f64(args.budget);

    println!(
        "Comparing strategies on {} boards of size {}x{} (shuffle {})\n",
        args.boards, args.size, args.size, args.shuffle
    );

    let mut optimal = Tally::default();
    let mut greedy = Tally::default();
    let mut layers = Tally::default();

    for seed in 0..args.boards {
        let board = Board::shuffled(args.size, args.size, args.shuffle, seed);

        for (strategy, tally) in [
            (SearchStrategy::Optimal, &mut optimal),
            (SearchStrategy::Greedy, &mut greedy),
        ] {
            let mut solver = SearchSolver::new(strategy, budget);
            match solver.solve(&board) {
                Ok(moves) => {
                    tally.solved += 1;
                    tally.total_moves += moves.len() as u64;
                    tally.total_expanded += solver.nodes_expanded();
                }
                Err(SolveError::Timeout { .. }) => tally.timeouts += 1,
                Err(e) => eprintln!("seed {}: {}", seed, e),
            }
        }

        match solve_by_layers(&board) {
            Ok(moves) => {
                layers.solved += 1;
                layers.total_moves += moves.len() as u64;
            }
            Err(e) => eprintln!("seed {}: layers: {}", seed, e),
        }
    }

    optimal.report("optimal", args.boards);
    greedy.report("greedy", args.boards);
    layers.report("layers", args.boards);
}
