use std::fmt;
use std::str::FromStr;

use crate::{
    error::{Error, Result},
    CELLS, SIZE,
};

mod static_masks {
    use crate::{CELLS, SIZE};

    pub const fn full_board_mask() -> u16 {
        (1 << CELLS) - 1
    }
    pub const fn row_mask(row: usize) -> u16 {
        ((1 << SIZE) - 1) << (row * SIZE)
    }
    pub const fn column_mask(column: usize) -> u16 {
        let mut mask = 0;
        let mut row = 0;
        while row < SIZE {
            mask |= 1 << (row * SIZE + column);
            row += 1;
        }
        mask
    }
    pub const fn diagonal_mask() -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < SIZE {
            mask |= 1 << (i * SIZE + i);
            i += 1;
        }
        mask
    }
    pub const fn anti_diagonal_mask() -> u16 {
        let mut mask = 0;
        let mut i = 0;
        while i < SIZE {
            mask |= 1 << (i * SIZE + (SIZE - 1 - i));
            i += 1;
        }
        mask
    }

    /// All 8 winning lines: rows, then columns, then both diagonals
    pub const fn lines() -> [u16; 2 * SIZE + 2] {
        let mut lines = [0; 2 * SIZE + 2];
        let mut i = 0;
        while i < SIZE {
            lines[i] = row_mask(i);
            lines[SIZE + i] = column_mask(i);
            i += 1;
        }
        lines[2 * SIZE] = diagonal_mask();
        lines[2 * SIZE + 1] = anti_diagonal_mask();
        lines
    }
}

const LINES: [u16; 2 * SIZE + 2] = static_masks::lines();

/// One of the two marks a player places; X always moves first
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// The utility of a game won by this mark
    pub fn utility(self) -> i32 {
        match self {
            Mark::X => 1,
            Mark::O => -1,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Cell {
    X,
    O,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn mark(&self) -> Option<Mark> {
        match self {
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
            Cell::Empty => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::X => 'X',
            Cell::O => 'O',
            Cell::Empty => '.',
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

/// A `(row, column)` pair naming a cell
///
/// A move carries no validity of its own, it is only legal relative to a
/// board on which the named cell is empty.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
pub struct Move {
    pub row: usize,
    pub column: usize,
}

impl Move {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Creates a move from a row-major cell index in `0..9`
    pub const fn from_index(index: usize) -> Self {
        Self {
            row: index / SIZE,
            column: index % SIZE,
        }
    }

    /// Creates a move from a 1-indexed keypad cell number in `1..=9`
    pub fn from_cell_number(number: usize) -> Result<Self> {
        match number {
            1..=CELLS => Ok(Self::from_index(number - 1)),
            _ => Err(Error::InvalidCellNumber(number)),
        }
    }

    pub fn index(&self) -> usize {
        self.row * SIZE + self.column
    }

    pub fn cell_number(&self) -> usize {
        self.index() + 1
    }

    pub fn in_bounds(&self) -> bool {
        self.row < SIZE && self.column < SIZE
    }

    fn mask(&self) -> u16 {
        1 << self.index()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// An immutable 3x3 tic-tac-toe position
///
/// Cells are stored as one bit per cell, row-major, in a mask per mark.
/// Every transform returns a fresh `Board`, none mutate in place.
///
/// Queries assume the board is reachable by legal play from the empty board
/// (in particular, at most one mark owns a complete line).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Board {
    x_mask: u16,
    o_mask: u16,
}

impl Board {
    /// The all-empty starting position
    pub fn new() -> Self {
        Self {
            x_mask: 0,
            o_mask: 0,
        }
    }

    /// Builds a board from rows of cells, rejecting piece counts that cannot
    /// arise from alternating play starting with X
    pub fn from_cells(cells: [[Cell; SIZE]; SIZE]) -> Result<Self> {
        let mut board = Self::new();
        for (row, row_cells) in cells.iter().enumerate() {
            for (column, cell) in row_cells.iter().enumerate() {
                let bit = Move::new(row, column).mask();
                match cell {
                    Cell::X => board.x_mask |= bit,
                    Cell::O => board.o_mask |= bit,
                    Cell::Empty => {}
                }
            }
        }

        let (x_count, o_count) = (board.x_count(), board.o_count());
        if x_count < o_count || x_count > o_count + 1 {
            return Err(Error::InvalidPieceCounts { x_count, o_count });
        }
        Ok(board)
    }

    /// Plays a sequence of 1-indexed keypad cells (`1`..`9`, row-major)
    /// from the empty board, e.g. `"5193"`
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();

        for cell_char in moves.as_ref().chars() {
            match cell_char.to_digit(10) {
                Some(number @ 1..=9) => {
                    let next_move = Move::from_cell_number(number as usize)?;
                    board = board.apply(next_move)?;
                }
                _ => return Err(Error::InvalidCharacter(cell_char)),
            }
        }
        Ok(board)
    }

    pub fn cell(&self, row: usize, column: usize) -> Cell {
        let bit = Move::new(row, column).mask();
        if self.x_mask & bit != 0 {
            Cell::X
        } else if self.o_mask & bit != 0 {
            Cell::O
        } else {
            Cell::Empty
        }
    }

    pub fn cells(&self) -> [[Cell; SIZE]; SIZE] {
        let mut cells = [[Cell::Empty; SIZE]; SIZE];
        for (row, row_cells) in cells.iter_mut().enumerate() {
            for (column, cell) in row_cells.iter_mut().enumerate() {
                *cell = self.cell(row, column);
            }
        }
        cells
    }

    pub fn x_count(&self) -> usize {
        self.x_mask.count_ones() as usize
    }

    pub fn o_count(&self) -> usize {
        self.o_mask.count_ones() as usize
    }

    pub fn num_moves(&self) -> usize {
        self.x_count() + self.o_count()
    }

    pub fn empty_count(&self) -> usize {
        CELLS - self.num_moves()
    }

    fn board_mask(&self) -> u16 {
        self.x_mask | self.o_mask
    }

    /// The mark due to move, or `None` once the game is over
    pub fn current_player(&self) -> Option<Mark> {
        if self.is_terminal() {
            return None;
        }
        if self.x_count() == self.o_count() {
            Some(Mark::X)
        } else {
            Some(Mark::O)
        }
    }

    /// Every empty cell, in row-major order
    pub fn legal_moves(&self) -> Vec<Move> {
        let board_mask = self.board_mask();
        (0..CELLS)
            .filter(|&index| board_mask & (1 << index) == 0)
            .map(Move::from_index)
            .collect()
    }

    /// Returns the board after the current player marks the cell named by
    /// `next_move`
    ///
    /// The mark placed is always the one `current_player` reports for this
    /// board. Fails with [`Error::InvalidMove`] if the cell is occupied and
    /// with [`Error::GameOver`] if the game has already ended.
    pub fn apply(&self, next_move: Move) -> Result<Self> {
        if !next_move.in_bounds() {
            return Err(Error::OutOfBounds {
                row: next_move.row,
                column: next_move.column,
            });
        }
        if self.board_mask() & next_move.mask() != 0 {
            return Err(Error::InvalidMove {
                row: next_move.row,
                column: next_move.column,
            });
        }
        match self.current_player() {
            Some(mark) => Ok(self.with_mark(next_move, mark)),
            None => Err(Error::GameOver),
        }
    }

    fn with_mark(&self, next_move: Move, mark: Mark) -> Self {
        let mut next = *self;
        match mark {
            Mark::X => next.x_mask |= next_move.mask(),
            Mark::O => next.o_mask |= next_move.mask(),
        }
        next
    }

    /// Every legal move paired with the board it leads to, in row-major
    /// order. Empty on a terminal board.
    pub fn successors(&self) -> impl Iterator<Item = (Move, Board)> {
        let board = *self;
        self.current_player().into_iter().flat_map(move |mover| {
            board
                .legal_moves()
                .into_iter()
                .map(move |next_move| (next_move, board.with_mark(next_move, mover)))
        })
    }

    fn has_line(mask: u16) -> bool {
        LINES.iter().any(|&line| mask & line == line)
    }

    /// The mark owning a complete row, column or diagonal, if any
    pub fn winner(&self) -> Option<Mark> {
        if Self::has_line(self.x_mask) {
            Some(Mark::X)
        } else if Self::has_line(self.o_mask) {
            Some(Mark::O)
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        self.board_mask() == static_masks::full_board_mask()
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// `+1` if X has won, `-1` if O has won, `0` for a draw
    ///
    /// Fails with [`Error::GameInProgress`] on a board that is not terminal.
    pub fn utility(&self) -> Result<i32> {
        if !self.is_terminal() {
            return Err(Error::GameInProgress);
        }
        Ok(self.outcome_value())
    }

    // utility without the terminal check, for callers that already made it
    pub(crate) fn outcome_value(&self) -> i32 {
        self.winner().map_or(0, Mark::utility)
    }

    /// Perfect base-3 key of the position, in `0..3^9`
    pub fn key(&self) -> u16 {
        let mut key = 0;
        for index in (0..CELLS).rev() {
            let digit = if self.x_mask & (1 << index) != 0 {
                1
            } else if self.o_mask & (1 << index) != 0 {
                2
            } else {
                0
            };
            key = key * 3 + digit;
        }
        key
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parses 9 cells in row-major order: `X`, `O`, and `.`, `-` or `_` for
    /// empty. Whitespace, `/` and `|` are ignored, so `"XO./.X./..O"` works.
    fn from_str(s: &str) -> Result<Self> {
        let mut cells = Vec::with_capacity(CELLS);
        for c in s.chars() {
            match c {
                'X' | 'x' => cells.push(Cell::X),
                'O' | 'o' => cells.push(Cell::O),
                '.' | '-' | '_' => cells.push(Cell::Empty),
                '/' | '|' => {}
                c if c.is_whitespace() => {}
                c => return Err(Error::InvalidCharacter(c)),
            }
        }
        if cells.len() != CELLS {
            return Err(Error::InvalidLength(cells.len()));
        }

        let mut rows = [[Cell::Empty; SIZE]; SIZE];
        for (index, cell) in cells.into_iter().enumerate() {
            rows[index / SIZE][index % SIZE] = cell;
        }
        Self::from_cells(rows)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells().iter().enumerate() {
            if row > 0 {
                write!(f, "/")?;
            }
            for cell in cells.iter() {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self)
    }
}
