use anyhow::Result;
use tracing_subscriber::EnvFilter;

use std::cmp::Ordering;
use std::io::{stdin, stdout, Stdin, Write};

use tictactoe_ai::*;

mod console;
use console::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut game = Game::new();
    // keep the transposition table out here so we can re-use it
    let transposition_table = TranspositionTable::new();

    let stdin = stdin();

    println!("Welcome to Tic-Tac-Toe\n");

    // check for position database
    let mut position_database: Option<PositionDatabase> = None;
    match PositionDatabase::load() {
        Ok(database) => {
            position_database = Some(database);
        }
        Err(err) => match err.root_cause().downcast_ref::<std::io::Error>() {
            Some(io_error) if io_error.kind() == std::io::ErrorKind::NotFound => {
                if ask(&stdin, "Position database not found, would you like to generate one?")? {
                    let database = PositionDatabase::generate_verbose();
                    database.save()?;
                    position_database = Some(database);
                } else {
                    println!("Skipping database generation, the AI will search every move");
                }
            }
            _ => println!("Error reading position database: {}", err.root_cause()),
        },
    }

    let ai_players = (
        ask(&stdin, "Is player X AI controlled?")?,
        ask(&stdin, "Is player O AI controlled?")?,
    );

    // game loop
    loop {
        game.display()?;

        match game.state {
            GameState::Playing => {
                let player = match game.player() {
                    Some(player) => player,
                    None => break,
                };
                let ai_to_move = match player {
                    Mark::X => ai_players.0,
                    Mark::O => ai_players.1,
                };

                let next_move = if ai_to_move {
                    println!("AI is thinking...");
                    stdout().flush()?;

                    // slow down play if both players are AI
                    if ai_players == (true, true) {
                        std::thread::sleep(std::time::Duration::new(1, 0));
                    }

                    let mut solver =
                        Solver::new_with_transposition_table(game.board, transposition_table.clone());
                    if let Some(database) = position_database.clone() {
                        solver = solver.with_position_database(database);
                    }

                    let (value, best_move) = solver.solve()?;

                    match value.cmp(&0) {
                        Ordering::Greater => println!("Player X can force a win."),
                        Ordering::Less => println!("Player O can force a win."),
                        Ordering::Equal => {
                            println!("Player {} can at best force a draw.", player)
                        }
                    }

                    println!("Best move: {}", best_move.cell_number());
                    best_move.cell_number()
                } else {
                    print!("Player {}, cell (1-9) > ", player);
                    stdout().flush()?;
                    let input_str = read_input(&mut stdin.lock())?;

                    match input_str.trim().parse::<usize>() {
                        Err(_) => {
                            println!("Invalid number: {}", input_str.trim());
                            continue;
                        }
                        Ok(cell) => cell,
                    }
                };

                if let Err(err) = game.play_checked(next_move) {
                    println!("{}", err);
                    // try the move again
                    continue;
                }
            }

            // end states
            GameState::XWin => {
                println!("Player X wins!");
                break;
            }
            GameState::OWin => {
                println!("Player O wins!");
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}

/// Asks a yes/no question until a recognisable answer is given
fn ask(stdin: &Stdin, question: &str) -> Result<bool> {
    loop {
        print!("{} y/n: ", question);
        stdout().flush()?;

        let buffer = read_input(&mut stdin.lock())?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}
