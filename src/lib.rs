//! A perfect agent for playing or analysing the board game 'Tic-Tac-Toe'
//!
//! This agent runs an exhaustive minimax search over the game tree to find
//! the game-theoretically optimal move for any reachable position.
//!
//! # Basic Usage
//!
//! ```
//! use tictactoe_ai::{board::{Board, Move}, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // X: 1 3 4, O: 2 5 6 (keypad cells, row-major)
//! let mut solver = Solver::new(Board::from_moves("123546")?);
//! let (value, best_move) = solver.solve()?;
//!
//! assert!((value, best_move) == (1, Move::new(2, 0)));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod board;

pub mod transposition_table;

pub mod position_database;

pub mod solver;


pub use board::{Board, Cell, Mark, Move};
pub use error::{Error, Result};
pub use position_database::PositionDatabase;
pub use solver::Solver;
pub use transposition_table::TranspositionTable;

/// The width and height of the game board in tiles
pub const SIZE: usize = 3;

/// The number of cells on the board
pub const CELLS: usize = SIZE * SIZE;

/// The number of distinct base-3 board keys
pub const NUM_KEYS: usize = 3usize.pow(CELLS as u32);

// ensure that one bit per cell fits in a u16 mask
const_assert!(CELLS <= 16);
// ensure that every base-3 board key fits in a u16
const_assert!(NUM_KEYS <= u16::MAX as usize + 1);
