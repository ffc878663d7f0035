//! Fixed-size, set-associative cache of search results keyed by packed board.
//!
//! The table is split into buckets of `BUCKET_SIZE` slots. A key always maps
//! to the same bucket (through `mix64`), and within a bucket the newest
//! insertion sits in slot 0. Inserting a new key into a full bucket drops the
//! key in the last slot, regardless of how often it was read.
//!
//! Entries carry no freshness guarantee: callers validate depth (and bound
//! kind) on every hit.

use common::hash::mix64;

use crate::board::key::BoardKey;
use crate::board::Board;

pub const ENTRY_COUNT: usize = 1 << 15;
pub const BUCKET_SIZE: usize = 8;
pub const BUCKET_COUNT: usize = ENTRY_COUNT / BUCKET_SIZE;
const BUCKET_INDEX_MASK: u64 = (BUCKET_COUNT as u64) - 1;

/// Which side of the true score a cached value bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoundType {
    Exact,
    Lower,
    Upper,
}

impl Default for BoundType {
    fn default() -> Self {
        BoundType::Exact
    }
}

/// Handle for the bucket a key lives in, returned by `locate` so that a
/// lookup and the following insert hash the key only once.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BucketIndex(usize);

impl BucketIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
struct Bucket<T: Copy + Default> {
    keys: [BoardKey; BUCKET_SIZE],
    values: [T; BUCKET_SIZE],
}

pub struct BoardCache<T: Copy + Default> {
    buckets: Box<[Bucket<T>]>,
}

impl<T: Copy + Default> Default for BoardCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> BoardCache<T> {
    pub fn new() -> Self {
        Self {
            buckets: vec![Bucket::default(); BUCKET_COUNT].into_boxed_slice(),
        }
    }

    /// Empties every slot. A zero key marks an unused slot, which is why key 0
    /// (the empty board) can never be stored.
    pub fn reset(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = Bucket::default();
        }
    }

    pub fn locate(&self, key: BoardKey) -> BucketIndex {
        BucketIndex((mix64(key) & BUCKET_INDEX_MASK) as usize)
    }

    pub fn get(&self, key: BoardKey, at: BucketIndex) -> Option<&T> {
        assert!(key != 0, "the empty board cannot be cached");
        let bucket = &self.buckets[at.0];
        bucket
            .keys
            .iter()
            .position(|&k| k == key)
            .map(|slot| &bucket.values[slot])
    }

    /// Overwrites the value if `key` is already in the bucket; otherwise shifts
    /// every slot down by one, dropping the last, and inserts at slot 0.
    pub fn put(&mut self, key: BoardKey, at: BucketIndex, value: T) {
        assert!(key != 0, "the empty board cannot be cached");
        let bucket = &mut self.buckets[at.0];

        if let Some(slot) = bucket.keys.iter().position(|&k| k == key) {
            bucket.values[slot] = value;
            return;
        }

        bucket.keys.copy_within(0..BUCKET_SIZE - 1, 1);
        bucket.values.copy_within(0..BUCKET_SIZE - 1, 1);
        bucket.keys[0] = key;
        bucket.values[0] = value;
    }

    pub fn get_board(&self, board: &Board) -> Option<&T> {
        let key = board.key();
        self.get(key, self.locate(key))
    }

    pub fn put_board(&mut self, board: &Board, value: T) {
        let key = board.key();
        let at = self.locate(key);
        self.put(key, at, value);
    }

    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.keys.iter().filter(|&&k| k != 0).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
