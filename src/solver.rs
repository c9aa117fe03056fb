//! An agent to solve the game of Tic-Tac-Toe

use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::{
    board::*,
    error::{Error, Result},
    position_database::*,
    transposition_table::*,
};

/// The minimum possible value of a position (a forced win for O)
pub const MIN_VALUE: i32 = -1;
/// The maximum possible value of a position (a forced win for X)
pub const MAX_VALUE: i32 = 1;

/// The move played on the empty board when the opening shortcut is enabled
pub const OPENING_MOVE: Move = Move::new(0, 0);

/// An agent to solve Tic-Tac-Toe positions
///
/// # Notes
/// This agent runs a full-depth minimax search, so the move it picks is
/// optimal against any opponent. The tree is at most 9 plies deep, so no
/// heuristic cut-off is ever needed.
///
/// # Position Values
/// A position's value is the utility of the game under optimal play from both
/// sides: 1 if X can force a win, -1 if O can force a win and 0 for a draw.
///
/// # Opening Shortcut
/// On the empty board the solver plays [`OPENING_MOVE`] without searching
/// (every opening move draws under optimal play). This only saves time and
/// can be switched off with [`Solver::with_opening_shortcut`].
#[derive(Clone)]
pub struct Solver {
    board: Board,

    /// The number of nodes searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
    transposition_table: Option<TranspositionTable>,
    position_database: Option<PositionDatabase>,
    opening_shortcut: bool,
}

impl Solver {
    /// Creates a new `Solver` for a board
    pub fn new(board: Board) -> Self {
        Self {
            board,
            node_count: 0,
            transposition_table: None,
            position_database: None,
            opening_shortcut: true,
        }
    }

    /// Creates a new `Solver` for a board which caches values in the given
    /// transposition table
    pub fn new_with_transposition_table(
        board: Board,
        transposition_table: TranspositionTable,
    ) -> Self {
        Self {
            transposition_table: Some(transposition_table),
            ..Self::new(board)
        }
    }

    /// Adds a position database to an existing `Solver`
    pub fn with_position_database(mut self, position_database: PositionDatabase) -> Self {
        self.position_database = Some(position_database);
        self
    }

    /// Enables or disables the empty-board shortcut (enabled by default)
    pub fn with_opening_shortcut(mut self, enabled: bool) -> Self {
        self.opening_shortcut = enabled;
        self
    }

    // a fresh solver for a subtree, sharing this one's caches
    fn branch(&self) -> Self {
        Self {
            node_count: 0,
            ..self.clone()
        }
    }

    // cached values are minimax values for the player to move, so they only
    // answer `max_value` for X-to-move boards and `min_value` for O-to-move ones
    fn lookup(&self, board: &Board, role: Mark) -> Option<i32> {
        if board.current_player() != Some(role) {
            return None;
        }
        let key = board.key();
        if let Some(value) = self
            .position_database
            .as_ref()
            .and_then(|database| database.get(key))
        {
            return Some(value);
        }
        self.transposition_table
            .as_ref()
            .and_then(|table| table.get(key))
    }

    fn store(&self, board: &Board, role: Mark, value: i32) {
        if board.current_player() != Some(role) {
            return;
        }
        if let Some(table) = &self.transposition_table {
            table.set(board.key(), value);
        }
    }

    /// Value of `board` with X, the maximising player, choosing the next move
    ///
    /// Cached values are only read or written when X really is to move.
    pub fn max_value(&mut self, board: &Board) -> i32 {
        self.node_count += 1;

        if board.is_terminal() {
            return board.outcome_value();
        }
        if let Some(value) = self.lookup(board, Mark::X) {
            return value;
        }

        let mut value = i32::MIN;
        for (_, next) in board.successors() {
            value = value.max(self.min_value(&next));
            // nothing beats a win
            if value == MAX_VALUE {
                break;
            }
        }

        self.store(board, Mark::X, value);
        value
    }

    /// Value of `board` with O, the minimising player, choosing the next move
    pub fn min_value(&mut self, board: &Board) -> i32 {
        self.node_count += 1;

        if board.is_terminal() {
            return board.outcome_value();
        }
        if let Some(value) = self.lookup(board, Mark::O) {
            return value;
        }

        let mut value = i32::MAX;
        for (_, next) in board.successors() {
            value = value.min(self.max_value(&next));
            if value == MIN_VALUE {
                break;
            }
        }

        self.store(board, Mark::O, value);
        value
    }

    /// The minimax value of the solver's position, terminal or not
    pub fn value(&mut self) -> i32 {
        let board = self.board;
        match board.current_player() {
            Some(Mark::X) => self.max_value(&board),
            Some(Mark::O) => self.min_value(&board),
            None => board.outcome_value(),
        }
    }

    // value of the position after `mover` has played
    fn reply_value(&mut self, mover: Mark, next: &Board) -> i32 {
        match mover {
            Mark::X => self.min_value(next),
            Mark::O => self.max_value(next),
        }
    }

    fn is_better(mover: Mark, value: i32, best: i32) -> bool {
        match mover {
            Mark::X => value > best,
            Mark::O => value < best,
        }
    }

    fn opening_shortcut_applies(&self) -> bool {
        self.opening_shortcut && self.board.num_moves() == 0
    }

    /// Calculates the value and best move of the current position
    ///
    /// Moves are tried in row-major order and the first one reaching the best
    /// value is kept. Fails with [`Error::GameOver`] on a terminal board.
    #[instrument(level = "debug", skip(self), fields(board = %self.board))]
    pub fn solve(&mut self) -> Result<(i32, Move)> {
        let mover = self.board.current_player().ok_or(Error::GameOver)?;

        if self.opening_shortcut_applies() {
            debug!(best_move = %OPENING_MOVE, "empty board, skipping search");
            return Ok((0, OPENING_MOVE));
        }

        let mut best: Option<(i32, Move)> = None;
        for (next_move, next) in self.board.successors() {
            let value = self.reply_value(mover, &next);
            trace!(%next_move, value, "evaluated candidate move");

            if best.map_or(true, |(best_value, _)| Self::is_better(mover, value, best_value)) {
                best = Some((value, next_move));
            }
            // a forced win for the mover cannot be improved on
            if value == mover.utility() {
                break;
            }
        }

        // a non-terminal board always has at least one empty cell
        let (value, best_move) = best.ok_or(Error::GameOver)?;
        debug!(value, %best_move, nodes = self.node_count, "search complete");
        Ok((value, best_move))
    }

    /// Calculates the value and best move of the current position, searching
    /// each candidate move on its own rayon worker
    ///
    /// The branch values are reduced in row-major order once every branch has
    /// finished, so the result is identical to [`Solver::solve`].
    #[instrument(level = "debug", skip(self), fields(board = %self.board))]
    pub fn solve_parallel(&mut self) -> Result<(i32, Move)> {
        let mover = self.board.current_player().ok_or(Error::GameOver)?;

        if self.opening_shortcut_applies() {
            debug!(best_move = %OPENING_MOVE, "empty board, skipping search");
            return Ok((0, OPENING_MOVE));
        }

        let candidates: Vec<(Move, Board)> = self.board.successors().collect();
        let template = self.branch();
        let evaluated: Vec<(Move, i32, usize)> = candidates
            .par_iter()
            .map(|(next_move, next)| {
                let mut branch = template.branch();
                let value = branch.reply_value(mover, next);
                (*next_move, value, branch.node_count)
            })
            .collect();

        let mut best: Option<(i32, Move)> = None;
        for (next_move, value, node_count) in evaluated {
            self.node_count += node_count;
            trace!(%next_move, value, "evaluated candidate move");

            if best.map_or(true, |(best_value, _)| Self::is_better(mover, value, best_value)) {
                best = Some((value, next_move));
            }
        }

        let (value, best_move) = best.ok_or(Error::GameOver)?;
        debug!(value, %best_move, nodes = self.node_count, "parallel search complete");
        Ok((value, best_move))
    }

    /// The optimal move for the player to act
    pub fn best_move(&mut self) -> Result<Move> {
        self.solve().map(|(_, best_move)| best_move)
    }
}

impl std::ops::Deref for Solver {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

/// The optimal move for the player to act on `board`, using a plain solver
pub fn best_move(board: &Board) -> Result<Move> {
    Solver::new(*board).best_move()
}
