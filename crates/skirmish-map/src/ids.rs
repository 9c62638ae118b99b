//! Fixture identifier allocation.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{FixtureId, MapError};

/// Hands out unique, non-negative fixture IDs for one game.
///
/// IDs are never reused: once registered or allocated, an ID stays
/// taken for the allocator's lifetime. Allocation always returns the
/// smallest free ID. Negative IDs belong to clients and are treated as
/// permanently "used" without being recorded.
///
/// All methods take `&self`; share the allocator through an `Arc`.
#[derive(Debug)]
pub struct IdAllocator {
    used: Mutex<UsedIds>,
}

/// Bitset of used IDs. Bit `n` of word `n / 64` is ID `n`.
#[derive(Debug, Clone)]
struct UsedIds {
    words: Vec<u64>,
    limit: u32,
}

impl UsedIds {
    fn contains(&self, id: u32) -> bool {
        let (word, bit) = (id as usize / 64, id % 64);
        self.words
            .get(word)
            .is_some_and(|w| w & (1u64 << bit) != 0)
    }

    fn insert(&mut self, id: u32) {
        let (word, bit) = (id as usize / 64, id % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    fn first_free(&self) -> u64 {
        self.words
            .iter()
            .position(|w| *w != u64::MAX)
            .map(|i| i as u64 * 64 + u64::from(self.words[i].trailing_ones()))
            .unwrap_or(self.words.len() as u64 * 64)
    }
}

impl IdAllocator {
    /// An allocator for IDs `0..i32::MAX`.
    pub fn new() -> Self {
        Self::with_limit(i32::MAX as u32)
    }

    /// An allocator that only hands out IDs below `limit`.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            used: Mutex::new(UsedIds {
                words: Vec::new(),
                limit,
            }),
        }
    }

    // A panic while holding the lock can't leave the bitset half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, UsedIds> {
        self.used.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `id` as used.
    ///
    /// # Errors
    /// `MapError::DuplicateId` if it was already used.
    pub fn register(&self, id: FixtureId) -> Result<FixtureId, MapError> {
        if !id.is_confirmed() {
            return Ok(id);
        }
        let mut used = self.lock();
        let raw = id.0 as u32;
        if used.contains(raw) {
            return Err(MapError::DuplicateId(id));
        }
        used.insert(raw);
        Ok(id)
    }

    /// Returns the smallest unused ID and marks it used.
    ///
    /// # Errors
    /// `MapError::IdsExhausted` when every ID below the limit is taken.
    pub fn allocate(&self) -> Result<FixtureId, MapError> {
        let mut used = self.lock();
        let candidate = used.first_free();
        if candidate >= u64::from(used.limit) {
            return Err(MapError::IdsExhausted);
        }
        let raw = candidate as u32;
        used.insert(raw);
        Ok(FixtureId(raw as i32))
    }

    pub fn is_used(&self, id: FixtureId) -> bool {
        !id.is_confirmed() || self.lock().contains(id.0 as u32)
    }

    /// An independent copy; later changes to either side don't affect
    /// the other.
    pub fn snapshot(&self) -> IdAllocator {
        IdAllocator {
            used: Mutex::new(self.lock().clone()),
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
