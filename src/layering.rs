//! Constructive layer-reduction solver.
//!
//! Instead of searching the state space, this solver fixes the board one
//! outer row or column at a time, always reducing the longer dimension of
//! the remaining unsolved region first, until a 2×2 region is left; that
//! region is closed by rotating the blank. Move counts are far from optimal
//! but the runtime is polynomial in the board area, so it scales to boards
//! the best-first search cannot touch.
//!
//! Tiles are walked into place with single-cell steps: the blank is routed
//! around the unsolved region by BFS (never through placed cells), then one
//! slide advances the tile. The last two tiles of a row or column cannot be
//! placed one-by-one without disturbing each other, so they are finished
//! together by an exhaustive rotation search over a small window of cells.

use crate::engine::Board;
use crate::solver::SolveError;
use std::collections::{HashMap, VecDeque};

/// Extra attempts allowed for a row or column whose end pair did not land
/// on the first try.
pub const ROW_RETRY_LIMIT: u32 = 1;

/// Ceiling on blank rotations while closing the final 2×2 region. A full
/// cycle of its solvable component takes 12 slides, so hitting this limit
/// means the board cannot be solved.
pub const CLOSE_ROTATION_LIMIT: u32 = 20;

/// Regions up to this many cells finish their end pair by searching over
/// the whole region; larger regions corral the pair into a corner window
/// first to keep the search bounded.
const PAIR_WINDOW_CELL_LIMIT: usize = 48;

/// Solves `start` by layer reduction.
///
/// Returns the full slide sequence, or an empty list for an already-solved
/// board. The solver does not consult the solvability oracle: an unsolvable
/// board makes progress until the final 2×2 region and then fails with
/// `SolveError::GuardTripped`.
pub fn solve_by_layers(start: &Board) -> Result<Vec<(usize, usize)>, SolveError> {
    LayerContext::new(start).run()
}

/// Working state for one solve: the board being mutated, the goal, the
/// cursors bounding the unsolved region, and the cells of the current line
/// that must no longer move.
struct LayerContext {
    board: Board,
    goal: Board,
    moves: Vec<(usize, usize)>,
    top: usize,
    bot: usize,
    left: usize,
    right: usize,
    row_top_down: bool,
    col_left_right: bool,
    locked: Vec<(usize, usize)>,
}

impl LayerContext {
    fn new(start: &Board) -> Self {
        LayerContext {
            board: start.clone(),
            goal: Board::goal(start.rows(), start.cols()),
            moves: Vec::new(),
            top: 0,
            bot: start.rows() - 1,
            left: 0,
            right: start.cols() - 1,
            row_top_down: true,
            col_left_right: true,
            locked: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<(usize, usize)>, SolveError> {
        if self.board.is_solved() {
            return Ok(Vec::new());
        }
        while self.region_rows() > 2 || self.region_cols() > 2 {
            if self.region_rows() > 2 && self.region_rows() >= self.region_cols() {
                self.solve_row()?;
            } else {
                self.solve_col()?;
            }
        }
        self.close_two_by_two()?;
        Ok(self.moves)
    }

    fn region_rows(&self) -> usize {
        self.bot - self.top + 1
    }

    fn region_cols(&self) -> usize {
        self.right - self.left + 1
    }

    fn in_region(&self, (r, c): (usize, usize)) -> bool {
        r >= self.top && r <= self.bot && c >= self.left && c <= self.right
    }

    /// Applies one slide and records it. A rejected slide means the solver
    /// generated a move that is not blank-adjacent, which is a bug guard
    /// rather than an input condition.
    fn slide(&mut self, tile: (usize, usize)) -> Result<(), SolveError> {
        if self.board.slide(tile) {
            self.moves.push(tile);
            Ok(())
        } else {
            Err(SolveError::GuardTripped("generated an illegal slide"))
        }
    }

    fn neighbors(&self, (r, c): (usize, usize)) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if r > 0 {
            out.push((r - 1, c));
        }
        if r + 1 < self.board.rows() {
            out.push((r + 1, c));
        }
        if c > 0 {
            out.push((r, c - 1));
        }
        if c + 1 < self.board.cols() {
            out.push((r, c + 1));
        }
        out
    }

    fn find_tile(&self, value: u16) -> Result<(usize, usize), SolveError> {
        for r in 0..self.board.rows() {
            for c in 0..self.board.cols() {
                if self.board.get(r, c) == value {
                    return Ok((r, c));
                }
            }
        }
        Err(SolveError::GuardTripped("tile value missing from the board"))
    }

    /// BFS path for the blank to `target`, confined to the unsolved region
    /// and steering around locked cells and `avoid`. Returns the cells the
    /// blank visits, excluding its current position.
    fn blank_route(
        &self,
        target: (usize, usize),
        avoid: &[(usize, usize)],
    ) -> Option<Vec<(usize, usize)>> {
        let start = self.board.blank_pos();
        if start == target {
            return Some(Vec::new());
        }
        let passable = |cell: (usize, usize)| {
            self.in_region(cell) && !self.locked.contains(&cell) && !avoid.contains(&cell)
        };
        if !passable(target) {
            return None;
        }

        let mut prev: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        prev.insert(start, start);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            if cell == target {
                break;
            }
            for next in self.neighbors(cell) {
                if passable(next) && !prev.contains_key(&next) {
                    prev.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }
        if !prev.contains_key(&target) {
            return None;
        }

        let mut path = Vec::new();
        let mut cur = target;
        while cur != start {
            path.push(cur);
            cur = prev[&cur];
        }
        path.reverse();
        Some(path)
    }

    fn move_blank_to(
        &mut self,
        target: (usize, usize),
        avoid: &[(usize, usize)],
    ) -> Result<(), SolveError> {
        let path = self
            .blank_route(target, avoid)
            .ok_or(SolveError::GuardTripped("blank has no route to its target"))?;
        for cell in path {
            self.slide(cell)?;
        }
        Ok(())
    }

    /// BFS path for a tile from `from` to `to` through unlocked region
    /// cells.
    fn tile_route(
        &self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Option<Vec<(usize, usize)>> {
        let passable =
            |cell: (usize, usize)| self.in_region(cell) && !self.locked.contains(&cell);
        if !passable(to) {
            return None;
        }

        let mut prev: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        prev.insert(from, from);
        queue.push_back(from);
        while let Some(cell) = queue.pop_front() {
            if cell == to {
                break;
            }
            for next in self.neighbors(cell) {
                if passable(next) && !prev.contains_key(&next) {
                    prev.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }
        if !prev.contains_key(&to) {
            return None;
        }

        let mut path = Vec::new();
        let mut cur = to;
        while cur != from {
            path.push(cur);
            cur = prev[&cur];
        }
        path.reverse();
        Some(path)
    }

    /// Walks the tile holding `value` to `target` one cell at a time: for
    /// each step the blank is routed to the destination cell (treating the
    /// tile itself as a wall), then the tile slides into it.
    fn place_tile(&mut self, value: u16, target: (usize, usize)) -> Result<(), SolveError> {
        let mut pos = self.find_tile(value)?;
        if pos == target {
            return Ok(());
        }
        let path = self
            .tile_route(pos, target)
            .ok_or(SolveError::GuardTripped("tile has no route to its target"))?;
        for step in path {
            self.move_blank_to(step, &[pos])?;
            self.slide(pos)?;
            pos = step;
        }
        Ok(())
    }

    fn row_matches_goal(&self, r: usize) -> bool {
        (self.left..=self.right).all(|c| self.board.get(r, c) == self.goal.get(r, c))
    }

    fn col_matches_goal(&self, c: usize) -> bool {
        (self.top..=self.bot).all(|r| self.board.get(r, c) == self.goal.get(r, c))
    }

    fn region_cells_free(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for r in self.top..=self.bot {
            for c in self.left..=self.right {
                if !self.locked.contains(&(r, c)) {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Solves one row at the top (or bottom, once the sweep has flipped)
    /// of the region and shrinks the region past it.
    fn solve_row(&mut self) -> Result<(), SolveError> {
        if self.row_top_down && self.top == self.goal.blank_pos().0 {
            self.row_top_down = false;
        }
        let from_top = self.row_top_down;
        let r = if from_top { self.top } else { self.bot };

        for c in self.left..self.right - 1 {
            let value = self.goal.get(r, c);
            self.place_tile(value, (r, c))?;
            self.locked.push((r, c));
        }

        let mut attempts = 0u32;
        while !self.row_matches_goal(r) {
            if attempts > ROW_RETRY_LIMIT {
                return Err(SolveError::GuardTripped("row placement did not converge"));
            }
            self.finish_row_pair(r, from_top)?;
            attempts += 1;
        }

        self.locked.clear();
        if from_top {
            self.top += 1;
        } else {
            self.bot -= 1;
        }
        Ok(())
    }

    /// Solves one column at the left (or right) edge of the region.
    fn solve_col(&mut self) -> Result<(), SolveError> {
        if self.col_left_right && self.left == self.goal.blank_pos().1 {
            self.col_left_right = false;
        }
        let from_left = self.col_left_right;
        let c = if from_left { self.left } else { self.right };

        for r in self.top..self.bot - 1 {
            let value = self.goal.get(r, c);
            self.place_tile(value, (r, c))?;
            self.locked.push((r, c));
        }

        let mut attempts = 0u32;
        while !self.col_matches_goal(c) {
            if attempts > ROW_RETRY_LIMIT {
                return Err(SolveError::GuardTripped(
                    "column placement did not converge",
                ));
            }
            self.finish_col_pair(c, from_left)?;
            attempts += 1;
        }

        self.locked.clear();
        if from_left {
            self.left += 1;
        } else {
            self.right -= 1;
        }
        Ok(())
    }

    /// Places the last two tiles of row `r` together. Small regions search
    /// directly over all free cells; large ones first corral the pair and
    /// the blank into a three-row window at the end of the row.
    fn finish_row_pair(&mut self, r: usize, from_top: bool) -> Result<(), SolveError> {
        let a = self.goal.get(r, self.right - 1);
        let b = self.goal.get(r, self.right);
        let a_target = (r, self.right - 1);
        let b_target = (r, self.right);

        if self.region_rows() * self.region_cols() <= PAIR_WINDOW_CELL_LIMIT {
            let window = self.region_cells_free();
            return self.rotate_pair_into_place(&window, a, b, a_target, b_target);
        }

        let dr: isize = if from_top { 1 } else { -1 };
        let stage = (r as isize + dr) as usize;
        let far = (r as isize + 2 * dr) as usize;
        let col_lo = self.right.saturating_sub(2).max(self.left);
        let mut window = Vec::new();
        for wr in [r, stage, far] {
            for wc in col_lo..=self.right {
                if !self.locked.contains(&(wr, wc)) {
                    window.push((wr, wc));
                }
            }
        }

        for _ in 0..4 {
            let a_pos = self.find_tile(a)?;
            if !window.contains(&a_pos) {
                self.place_tile(a, (stage, self.right - 1))?;
            }
            let b_pos = self.find_tile(b)?;
            if !window.contains(&b_pos) {
                self.place_tile(b, (stage, self.right))?;
            }

            let a_pos = self.find_tile(a)?;
            let b_pos = self.find_tile(b)?;
            if window.contains(&a_pos) && window.contains(&b_pos) {
                if !window.contains(&self.board.blank_pos()) {
                    self.move_blank_to((far, self.right), &[a_pos, b_pos])?;
                }
                return self.rotate_pair_into_place(&window, a, b, a_target, b_target);
            }
        }
        Err(SolveError::GuardTripped("could not corral the row end pair"))
    }

    /// Column counterpart of `finish_row_pair`: the pair lives at the
    /// bottom of column `c` and the corner window spans three columns.
    fn finish_col_pair(&mut self, c: usize, from_left: bool) -> Result<(), SolveError> {
        let a = self.goal.get(self.bot - 1, c);
        let b = self.goal.get(self.bot, c);
        let a_target = (self.bot - 1, c);
        let b_target = (self.bot, c);

        if self.region_rows() * self.region_cols() <= PAIR_WINDOW_CELL_LIMIT {
            let window = self.region_cells_free();
            return self.rotate_pair_into_place(&window, a, b, a_target, b_target);
        }

        let dc: isize = if from_left { 1 } else { -1 };
        let stage = (c as isize + dc) as usize;
        let far = (c as isize + 2 * dc) as usize;
        let row_lo = self.bot.saturating_sub(2).max(self.top);
        let mut window = Vec::new();
        for wr in row_lo..=self.bot {
            for wc in [c, stage, far] {
                if !self.locked.contains(&(wr, wc)) {
                    window.push((wr, wc));
                }
            }
        }

        for _ in 0..4 {
            let a_pos = self.find_tile(a)?;
            if !window.contains(&a_pos) {
                self.place_tile(a, (self.bot - 1, stage))?;
            }
            let b_pos = self.find_tile(b)?;
            if !window.contains(&b_pos) {
                self.place_tile(b, (self.bot, stage))?;
            }

            let a_pos = self.find_tile(a)?;
            let b_pos = self.find_tile(b)?;
            if window.contains(&a_pos) && window.contains(&b_pos) {
                if !window.contains(&self.board.blank_pos()) {
                    self.move_blank_to((self.bot, far), &[a_pos, b_pos])?;
                }
                return self.rotate_pair_into_place(&window, a, b, a_target, b_target);
            }
        }
        Err(SolveError::GuardTripped(
            "could not corral the column end pair",
        ))
    }

    /// Finds and applies the shortest blank-move sequence inside `window`
    /// that brings tiles `a` and `b` to their targets. Only the positions
    /// of `a`, `b` and the blank matter; the other window tiles are
    /// interchangeable, which keeps the state space to at most a few
    /// thousand entries.
    fn rotate_pair_into_place(
        &mut self,
        window: &[(usize, usize)],
        a: u16,
        b: u16,
        a_target: (usize, usize),
        b_target: (usize, usize),
    ) -> Result<(), SolveError> {
        let index_of = |cell: (usize, usize)| window.iter().position(|&w| w == cell);
        let outside = SolveError::GuardTripped("pair tile left its window");
        let a_i = index_of(self.find_tile(a)?).ok_or(outside.clone())?;
        let b_i = index_of(self.find_tile(b)?).ok_or(outside.clone())?;
        let e_i = index_of(self.board.blank_pos()).ok_or(outside)?;
        let a_t = index_of(a_target)
            .ok_or(SolveError::GuardTripped("pair target outside its window"))?;
        let b_t = index_of(b_target)
            .ok_or(SolveError::GuardTripped("pair target outside its window"))?;

        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); window.len()];
        for (i, &(r, c)) in window.iter().enumerate() {
            for (j, &(nr, nc)) in window.iter().enumerate() {
                if r.abs_diff(nr) + c.abs_diff(nc) == 1 {
                    adj[i].push(j);
                }
            }
        }

        // BFS over (a, b, blank) placements; each edge moves the blank to
        // an adjacent window cell and records which cell was slid.
        type State = (usize, usize, usize);
        let start: State = (a_i, b_i, e_i);
        let mut prev: HashMap<State, (State, usize)> = HashMap::new();
        let mut queue = VecDeque::new();
        prev.insert(start, (start, usize::MAX));
        queue.push_back(start);
        let mut goal_state = None;

        while let Some(state) = queue.pop_front() {
            let (sa, sb, se) = state;
            if sa == a_t && sb == b_t {
                goal_state = Some(state);
                break;
            }
            for &n in &adj[se] {
                let next = (
                    if n == sa { se } else { sa },
                    if n == sb { se } else { sb },
                    n,
                );
                if !prev.contains_key(&next) {
                    prev.insert(next, (state, n));
                    queue.push_back(next);
                }
            }
        }

        let goal_state =
            goal_state.ok_or(SolveError::GuardTripped("pair rotation has no solution"))?;
        let mut steps = Vec::new();
        let mut cur = goal_state;
        while cur != start {
            let (parent, slid) = prev[&cur];
            steps.push(slid);
            cur = parent;
        }
        steps.reverse();
        for w in steps {
            self.slide(window[w])?;
        }
        Ok(())
    }

    /// Rotates the blank clockwise around the final 2×2 region, checking
    /// for the goal after every slide.
    fn close_two_by_two(&mut self) -> Result<(), SolveError> {
        let (rt, rb, cl, cr) = (self.top, self.bot, self.left, self.right);
        for _ in 0..CLOSE_ROTATION_LIMIT {
            if self.board == self.goal {
                return Ok(());
            }
            let (br, bc) = self.board.blank_pos();
            let tile = match (br == rt, bc == cl) {
                (true, true) => (rt, cr),
                (true, false) => (rb, cr),
                (false, false) => (rb, cl),
                (false, true) => (rt, cl),
            };
            self.slide(tile)?;
        }
        if self.board == self.goal {
            Ok(())
        } else {
            Err(SolveError::GuardTripped("final rotation ceiling reached"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

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

    #[test]
    fn test_solved_board_returns_empty_list() {
        assert_eq!(solve_by_layers(&Board::goal(3, 3)).unwrap(), Vec::new());
        assert_eq!(solve_by_layers(&Board::goal(4, 6)).unwrap(), Vec::new());
    }

    #[test]
    fn test_solves_simple_scenario() {
        let board = board_from_str_array(&["1 2 3", "4 0 5", "7 8 6"]).unwrap();
        let moves = solve_by_layers(&board).unwrap();
        assert!(replay(&board, &moves).is_solved());
    }

    #[test]
    fn test_solves_shuffled_square_boards() {
        for (n, steps) in [(3, 60), (4, 150), (5, 300)] {
            for seed in 0..4 {
                let board = Board::shuffled(n, n, steps, seed);
                let moves = solve_by_layers(&board).unwrap();
                assert!(
                    replay(&board, &moves).is_solved(),
                    "failed on {}x{} seed {}",
                    n,
                    n,
                    seed
                );
            }
        }
    }

    #[test]
    fn test_solves_large_square_boards() {
        // Regions above PAIR_WINDOW_CELL_LIMIT take the corral path for the
        // end pairs instead of searching the whole region.
        for n in [7, 8, 9] {
            let board = Board::shuffled(n, n, 60 * n, n as u64);
            let moves = solve_by_layers(&board).unwrap();
            assert!(replay(&board, &moves).is_solved(), "failed on {}x{}", n, n);
        }
    }

    #[test]
    fn test_solves_fully_scrambled_large_board() {
        // A full random permutation, not a walk from the goal, so the end
        // pairs start far from their corner windows.
        let board = (0..)
            .map(|seed| Board::random(7, seed))
            .find(Board::is_solvable)
            .unwrap();
        let moves = solve_by_layers(&board).unwrap();
        assert!(replay(&board, &moves).is_solved());
    }

    #[test]
    fn test_solves_large_rectangular_boards() {
        for (rows, cols) in [(7, 10), (10, 7), (6, 9)] {
            for seed in 0..2 {
                let board = Board::shuffled(rows, cols, 400, seed);
                let moves = solve_by_layers(&board).unwrap();
                assert!(
                    replay(&board, &moves).is_solved(),
                    "failed on {}x{} seed {}",
                    rows,
                    cols,
                    seed
                );
            }
        }
    }

    #[test]
    fn test_solves_rectangular_boards() {
        for (rows, cols) in [(4, 5), (5, 4), (2, 5), (5, 2), (3, 6)] {
            for seed in 0..3 {
                let board = Board::shuffled(rows, cols, 200, seed);
                let moves = solve_by_layers(&board).unwrap();
                assert!(
                    replay(&board, &moves).is_solved(),
                    "failed on {}x{} seed {}",
                    rows,
                    cols,
                    seed
                );
            }
        }
    }

    #[test]
    fn test_intermediate_boards_stay_solvable() {
        // Legal slides preserve the parity invariant, so every prefix of a
        // solution leaves a solvable board.
        let board = Board::shuffled(4, 4, 120, 9);
        let moves = solve_by_layers(&board).unwrap();
        let mut current = board.clone();
        for &tile in &moves {
            assert!(current.slide(tile));
            assert!(current.is_solvable());
        }
    }

    #[test]
    fn test_solved_top_row_is_never_disturbed() {
        // Scramble only below the top row, then check the solution never
        // slides a top-row tile.
        let mut board = Board::goal(4, 4);
        for tile in [
            (2, 3),
            (2, 2),
            (1, 2),
            (1, 1),
            (1, 0),
            (2, 0),
            (2, 1),
            (3, 1),
            (3, 2),
            (2, 2),
        ] {
            assert!(board.slide(tile));
        }

        let moves = solve_by_layers(&board).unwrap();
        assert!(replay(&board, &moves).is_solved());
        assert!(moves.iter().all(|&(r, _)| r > 0));

        // Same check on a rectangular board, where column phases run too.
        let mut board = Board::goal(5, 4);
        for tile in [
            (3, 3),
            (3, 2),
            (2, 2),
            (2, 1),
            (1, 1),
            (1, 2),
            (2, 2),
            (3, 2),
            (3, 3),
            (4, 3),
        ] {
            assert!(board.slide(tile));
        }

        let moves = solve_by_layers(&board).unwrap();
        assert!(replay(&board, &moves).is_solved());
        assert!(moves.iter().all(|&(r, _)| r > 0));
    }

    #[test]
    fn test_unsolvable_board_trips_guard() {
        let board = board_from_str_array(&["2 1 3", "4 5 6", "7 8 0"]).unwrap();
        assert!(!board.is_solvable());
        assert!(matches!(
            solve_by_layers(&board),
            Err(SolveError::GuardTripped(_))
        ));
    }

    #[test]
    fn test_deterministic_move_lists() {
        let board = Board::shuffled(4, 4, 100, 21);
        assert_eq!(
            solve_by_layers(&board).unwrap(),
            solve_by_layers(&board).unwrap()
        );
    }
}
