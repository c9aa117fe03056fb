use anyhow::{anyhow, Result};
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, BufRead, Write};

use tictactoe_ai::{Board, Cell, Mark, Move, SIZE};

#[derive(Copy, Clone, Debug)]
pub enum GameState {
    Playing,
    XWin,
    OWin,
    Draw,
}

/// Reads one line of user input, failing once the input is closed
pub fn read_input<R: BufRead>(input: &mut R) -> Result<String> {
    let mut buffer = String::new();
    if input.read_line(&mut buffer)? == 0 {
        return Err(anyhow!("input closed"));
    }
    Ok(buffer)
}

/// A game in progress, as seen by the console
#[derive(Clone)]
pub struct Game {
    pub board: Board,
    // keypad cells played so far
    pub game: String,
    pub state: GameState,
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            game: String::new(),
            state: GameState::Playing,
        }
    }

    /// The mark due to move, `None` once the game is over
    pub fn player(&self) -> Option<Mark> {
        self.board.current_player()
    }

    pub fn play_checked(&mut self, cell_one_indexed: usize) -> Result<GameState> {
        let next_move = Move::from_cell_number(cell_one_indexed)?;
        self.board = self.board.apply(next_move)?;
        self.game.push_str(&cell_one_indexed.to_string());

        self.state = match self.board.winner() {
            Some(Mark::X) => GameState::XWin,
            Some(Mark::O) => GameState::OWin,
            None if self.board.is_terminal() => GameState::Draw,
            None => GameState::Playing,
        };
        Ok(self.state)
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        stdout.queue(PrintStyledContent(style(format!("Moves: {}\n", self.game))))?;
        for _ in 0..SIZE {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (row, cells) in self.board.cells().iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let (pos_x, pos_y) = (
                    origin_x + (2 * column) as u16,
                    origin_y - (SIZE - row) as u16,
                );
                // empty cells show the keypad number that plays them
                let symbol = match cell {
                    Cell::X => 'X',
                    Cell::O => 'O',
                    Cell::Empty => std::char::from_digit(
                        Move::new(row, column).cell_number() as u32,
                        10,
                    )
                    .unwrap_or('.'),
                };

                stdout
                    .queue(MoveTo(pos_x, pos_y))?
                    .queue(PrintStyledContent(
                        style(symbol)
                            .attribute(Attribute::Bold)
                            .on(Color::DarkBlue)
                            .with(match cell {
                                Cell::X => Color::Red,
                                Cell::O => Color::Yellow,
                                Cell::Empty => Color::Grey,
                            }),
                    ))?;
            }
        }
        stdout
            .queue(MoveTo(origin_x, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tictactoe_ai::Error;

    #[test]
    fn play_checked_reports_board_errors() -> Result<()> {
        let mut game = Game::new();
        assert!(matches!(game.play_checked(5)?, GameState::Playing));

        let err = game.play_checked(5).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::InvalidMove { row: 1, column: 1 })
        );
        let err = game.play_checked(10).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::InvalidCellNumber(10)));

        // rejected moves leave the game untouched
        assert_eq!(game.game, "5");
        assert_eq!(game.board, Board::from_moves("5")?);

        for &cell in [1, 7, 2].iter() {
            game.play_checked(cell)?;
        }
        assert!(matches!(game.play_checked(3)?, GameState::XWin));
        let err = game.play_checked(9).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::GameOver));
        Ok(())
    }

    #[test]
    fn read_input_stops_at_end_of_input() -> Result<()> {
        let mut input: &[u8] = b"y\n";
        assert_eq!(read_input(&mut input)?, "y\n");
        assert!(read_input(&mut input).is_err());
        Ok(())
    }
}
