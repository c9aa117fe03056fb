use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use indicatif::*;
use rayon::prelude::*;
use tracing::info;

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::*;

pub const DATABASE_PATH: &str = "position_database.bin";
/// The number of distinct positions reachable by legal play, empty board included
pub const DATABASE_NUM_POSITIONS: usize = 5478;

/// Solved values for every position reachable from the empty board
#[derive(Clone)]
pub struct PositionDatabase(Arc<PositionDatabaseStorage>);

impl PositionDatabase {
    pub fn load() -> Result<Self> {
        Self::load_from(DATABASE_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = PositionDatabaseStorage::load(path.as_ref())?;
        info!(path = %path.as_ref().display(), "loaded position database");
        Ok(Self(Arc::new(storage)))
    }

    /// Solves every reachable position
    pub fn generate() -> Self {
        Self::_generate(true)
    }

    /// Solves every reachable position, drawing a progress bar
    pub fn generate_verbose() -> Self {
        Self::_generate(false)
    }

    fn _generate(silent: bool) -> Self {
        let start = Instant::now();
        let positions = reachable_positions();

        let progress = if silent {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(positions.len() as u64)
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("Solving positions: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
                .progress_chars("█▓▒░  "),
        );

        // positions share most of their subtrees, so share one table between workers
        let transposition_table = TranspositionTable::new();
        let mut entries: Vec<(u16, i8)> = positions
            .par_iter()
            .map(|board| {
                let mut solver =
                    Solver::new_with_transposition_table(*board, transposition_table.clone());
                let value = solver.value();
                progress.inc(1);
                (board.key(), value as i8)
            })
            .collect();
        progress.finish();

        entries.sort_unstable();
        info!(
            positions = entries.len(),
            elapsed = %HumanDuration(start.elapsed()),
            "position database generated"
        );

        Self(Arc::new(PositionDatabaseStorage::from_entries(entries)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(DATABASE_PATH)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path.as_ref())?,
        );

        for (&key, &value) in self.keys.iter().zip(self.values.iter()) {
            file.write_u16::<BigEndian>(key)?;
            file.write_i8(value)?;
        }
        file.flush()?;

        info!(path = %path.as_ref().display(), "saved position database");
        Ok(())
    }

    /// The value reached by each of the nine opening moves
    pub fn opening_values(&self) -> Result<Vec<(Move, i32)>> {
        let board = Board::new();
        board
            .legal_moves()
            .into_iter()
            .map(|opening| {
                let key = board.apply(opening)?.key();
                let value = self
                    .get(key)
                    .ok_or_else(|| anyhow!("opening {} missing from the database", opening))?;
                Ok((opening, value))
            })
            .collect()
    }
}

/// Every position reachable by legal play from the empty board, stopping at
/// finished games
pub fn reachable_positions() -> Vec<Board> {
    let mut seen = HashSet::new();
    let mut positions = Vec::new();
    let mut to_explore = vec![Board::new()];

    while let Some(board) = to_explore.pop() {
        if !seen.insert(board.key()) {
            continue;
        }
        positions.push(board);
        to_explore.extend(board.successors().map(|(_, next)| next));
    }
    positions
}

#[derive(Clone)]
pub struct PositionDatabaseStorage {
    // sorted ascending
    keys: Vec<u16>,
    values: Vec<i8>,
}

impl PositionDatabaseStorage {
    fn from_entries(entries: Vec<(u16, i8)>) -> Self {
        let (keys, values) = entries.into_iter().unzip();
        Self { keys, values }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut file = BufReader::new(File::open(path)?);
        let mut keys = Vec::with_capacity(DATABASE_NUM_POSITIONS);
        let mut values = Vec::with_capacity(DATABASE_NUM_POSITIONS);

        for i in 0..DATABASE_NUM_POSITIONS {
            let key = file.read_u16::<BigEndian>()?;
            let value = file.read_i8()?;

            if keys.last().map_or(false, |&last| last >= key) {
                return Err(anyhow!("corrupt position database: entry {} out of order", i));
            }
            if !(-1..=1).contains(&value) {
                return Err(anyhow!(
                    "corrupt position database: entry {} has value {}",
                    i,
                    value
                ));
            }
            keys.push(key);
            values.push(value);
        }

        // the file must end exactly after the last entry
        if !file.fill_buf()?.is_empty() {
            return Err(anyhow!(
                "corrupt position database: data after entry {}",
                DATABASE_NUM_POSITIONS - 1
            ));
        }
        Ok(Self { keys, values })
    }

    pub fn get(&self, key: u16) -> Option<i32> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|i| self.values[i] as i32)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::ops::Deref for PositionDatabase {
    type Target = PositionDatabaseStorage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
