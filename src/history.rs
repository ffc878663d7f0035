//! Bounded undo/redo log of game states.
//!
//! Every successful move writes a new `(board, rng, score)` entry one slot
//! after the current one in a fixed ring of `CAPACITY` entries. Writing after
//! an undo drops every redo entry. Once the ring is full the oldest entry is
//! overwritten and can no longer be reached by undo.

use common::XorShift128;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use crate::board::trace::TraceSink;
use crate::board::{Board, Direction};

pub const CAPACITY: usize = 4096;

/// Tiles on the board at the start of a game.
const STARTING_TILES: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HistoryEntry {
    pub board: Board,
    pub rng: XorShift128,
    pub score: u32,
}

pub struct History {
    entries: Box<[HistoryEntry]>,
    current: usize,
    undo_available: usize,
    redo_available: usize,
}

impl History {
    /// An empty board with the generator seeded from `seed`. No tiles are
    /// placed until `new_game`.
    pub fn new(seed: u32) -> Self {
        Self::with_capacity(seed, CAPACITY)
    }

    /// Like `new`, with a ring of `capacity` entries. At most `capacity - 1`
    /// moves can be undone.
    pub fn with_capacity(seed: u32, capacity: usize) -> Self {
        assert!(capacity >= 2, "history needs room for at least one undo");
        let mut history = Self {
            entries: vec![HistoryEntry::default(); capacity].into_boxed_slice(),
            current: 0,
            undo_available: 0,
            redo_available: 0,
        };
        history.reset(seed);
        history
    }

    pub fn reset(&mut self, seed: u32) {
        self.reset_to(Board::new(), XorShift128::new(seed));
    }

    /// Starts over from an arbitrary position with a zero score.
    pub fn reset_to(&mut self, board: Board, rng: XorShift128) {
        self.current = 0;
        self.undo_available = 0;
        self.redo_available = 0;
        self.entries[0] = HistoryEntry {
            board,
            rng,
            score: 0,
        };
    }

    /// Empties the board and forgets every entry, keeping the generator where
    /// it currently is so consecutive games do not repeat.
    pub fn clear_history(&mut self) {
        let rng = *self.rng();
        self.reset_to(Board::new(), rng);
    }

    pub fn new_game(&mut self) {
        self.new_game_traced(&mut ());
    }

    pub fn new_game_traced<T: TraceSink>(&mut self, trace: &mut T) {
        self.clear_history();
        let entry = &mut self.entries[0];
        entry.board.place_traced(STARTING_TILES, &mut entry.rng, trace);
    }

    pub fn make_move(&mut self, direction: Direction) -> bool {
        self.make_move_traced(direction, &mut ())
    }

    /// Plays `direction` from the current entry. A move that changes nothing
    /// leaves the history untouched, so it cannot be undone.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn make_move_traced<T: TraceSink>(&mut self, direction: Direction, trace: &mut T) -> bool {
        let mut next = self.entries[self.current];
        if !next
            .board
            .make_move_traced(direction, &mut next.rng, trace, &mut next.score)
        {
            return false;
        }

        self.current = (self.current + 1) % self.capacity();
        self.entries[self.current] = next;
        self.undo_available = (self.undo_available + 1).min(self.capacity() - 1);
        self.redo_available = 0;
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.undo_available == 0 {
            return false;
        }
        self.undo_available -= 1;
        self.redo_available += 1;
        self.current = (self.current + self.capacity() - 1) % self.capacity();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.redo_available == 0 {
            return false;
        }
        self.redo_available -= 1;
        self.undo_available += 1;
        self.current = (self.current + 1) % self.capacity();
        true
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    pub fn board(&self) -> &Board {
        &self.current().board
    }

    pub fn rng(&self) -> &XorShift128 {
        &self.current().rng
    }

    pub fn score(&self) -> u32 {
        self.current().score
    }

    pub fn undo_available(&self) -> usize {
        self.undo_available
    }

    pub fn redo_available(&self) -> usize {
        self.redo_available
    }
}
