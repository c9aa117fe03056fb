use std::sync::{atomic::*, Arc};

use crate::NUM_KEYS;

/// A cache of exact minimax values, indexed by the perfect board key
///
/// Every position has its own slot, so entries never collide and no key
/// needs to be stored alongside the value. Cloning is cheap and every clone
/// shares the same slots, which makes the table safe to hand to parallel
/// searches.
#[derive(Clone)]
pub struct TranspositionTable {
    entries: Arc<Vec<AtomicU8>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(NUM_KEYS);
        for _ in 0..NUM_KEYS {
            entries.push(AtomicU8::new(0));
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn set(&self, key: u16, value: i32) {
        // offset of two to prevent putting a 0, which represents an empty entry
        self.entries[key as usize].store((value + 2) as u8, Ordering::Relaxed);
    }

    pub fn get(&self, key: u16) -> Option<i32> {
        match self.entries[key as usize].load(Ordering::Relaxed) {
            0 => None,
            value => Some(value as i32 - 2),
        }
    }

    /// The number of positions stored so far
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.load(Ordering::Relaxed) != 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
