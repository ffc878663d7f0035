pub mod direction;
pub mod error;
pub mod key;
pub mod trace;

mod display;


use common::XorShift128;
use smallvec::SmallVec;

pub use direction::Direction;
use error::BoardError;
use trace::{TraceEvent, TraceSink};

pub const TILES_X: usize = 4;
pub const TILES_Y: usize = 4;
pub const NUM_TILES: usize = TILES_X * TILES_Y;

/// Largest tile exponent that fits in a packed 4-bit cell (2^15 = 32768).
pub const MAX_POWER: u8 = 15;

/// Indices of the empty cells, in ascending order.
pub type FreeCells = SmallVec<[u8; NUM_TILES]>;

/// A 4x4 grid of tile exponents, stored row-major. `0` is an empty cell and
/// any other value `v` is displayed as `2^v`.
///
/// Cells are only changed through `tilt`, `place` and `make_move` (and the
/// adversarial placement used by search), so every cell stays within
/// `0..=MAX_POWER`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [u8; NUM_TILES],
}

impl Board {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a board from exponents. Panics if any exponent exceeds `MAX_POWER`.
    pub fn from_cells(cells: [u8; NUM_TILES]) -> Self {
        for &value in cells.iter() {
            assert!(value <= MAX_POWER, "tile exponent {} out of range", value);
        }
        Self { cells }
    }

    /// Builds a board from displayed values (`0`, `2`, `4`, ...). Panics on
    /// anything that is not a representable tile.
    pub fn from_displayed(values: [u32; NUM_TILES]) -> Self {
        let mut cells = [0u8; NUM_TILES];
        for (cell, &value) in cells.iter_mut().zip(values.iter()) {
            *cell = match displayed_to_power(value) {
                Ok(power) => power,
                Err(error) => panic!("{}", error),
            };
        }
        Self { cells }
    }

    pub fn cells(&self) -> &[u8; NUM_TILES] {
        &self.cells
    }

    pub fn get(&self, cell: usize) -> u8 {
        self.cells[cell]
    }

    /// Displayed value of a cell (`0` when empty).
    pub fn displayed(&self, cell: usize) -> u32 {
        match self.cells[cell] {
            0 => 0,
            power => 1 << power,
        }
    }

    pub fn max_tile(&self) -> u8 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&value| value == 0)
    }

    pub fn count_free(&self) -> usize {
        self.cells.iter().filter(|&&value| value == 0).count()
    }

    pub fn free_cells(&self) -> FreeCells {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == 0)
            .map(|(cell, _)| cell as u8)
            .collect()
    }

    /// True if two horizontally or vertically adjacent cells hold the same tile.
    pub fn has_direct_matches(&self) -> bool {
        for y in 0..TILES_Y {
            for x in 1..TILES_X {
                let at = y * TILES_X + x;
                if self.cells[at] != 0 && self.cells[at] == self.cells[at - 1] {
                    return true;
                }
            }
        }

        for x in 0..TILES_X {
            for y in 1..TILES_Y {
                let at = y * TILES_X + x;
                if self.cells[at] != 0 && self.cells[at] == self.cells[at - TILES_X] {
                    return true;
                }
            }
        }

        false
    }

    /// No free cells and no equal neighbours: no direction can change the board.
    pub fn finished(&self) -> bool {
        self.count_free() == 0 && !self.has_direct_matches()
    }

    pub fn place(&mut self, count: usize, rng: &mut XorShift128) {
        self.place_traced(count, rng, &mut ());
    }

    /// Spawns up to `count` tiles on free cells: a `2` nine times in ten,
    /// otherwise a `4`.
    ///
    /// The tile value is drawn before the cell. Taken cells are removed from
    /// the free list without reordering it, so `place(2)` and two calls to
    /// `place(1)` consume the generator identically.
    pub fn place_traced<T: TraceSink>(&mut self, count: usize, rng: &mut XorShift128, trace: &mut T) {
        assert!(count > 0, "place requires a positive count");
        let mut free = self.free_cells();
        let mut remaining = count;

        while remaining > 0 && !free.is_empty() {
            let value = if rng.next_n(10) < 9 { 1 } else { 2 };
            let which = rng.next_n(free.len() as u32) as usize;
            let cell = free.remove(which) as usize;

            self.cells[cell] = value;
            trace.record(TraceEvent::Appeared { cell, value });
            remaining -= 1;
        }
    }

    /// Puts a specific tile on an empty cell. Used by the adversarial searchers,
    /// which enumerate placements instead of drawing them.
    pub fn set_empty_cell(&mut self, cell: usize, value: u8) {
        assert!(self.cells[cell] == 0, "cell {} is occupied", cell);
        assert!(value > 0 && value <= MAX_POWER);
        self.cells[cell] = value;
    }

    pub fn tilt(&mut self, direction: Direction) -> bool {
        let mut score = 0;
        self.tilt_traced(direction, &mut (), &mut score)
    }

    /// Slides every tile towards `direction`, merging equal pairs once.
    ///
    /// Each line is scanned once from the edge being tilted towards, carrying
    /// at most one pending tile. Merged values are added to `score` as their
    /// displayed value. Returns true if any tile changed cell or merged.
    pub fn tilt_traced<T: TraceSink>(
        &mut self,
        direction: Direction,
        trace: &mut T,
        score: &mut u32,
    ) -> bool {
        let mut moved = false;
        for line in 0..line_count(direction) {
            let cells = line_cells(direction, line);
            moved |= self.tilt_line(&cells, trace, score);
        }
        moved
    }

    fn tilt_line<T: TraceSink>(
        &mut self,
        cells: &[usize; TILES_X],
        trace: &mut T,
        score: &mut u32,
    ) -> bool {
        let mut moved = false;
        let mut to = 0;
        let mut carried = 0u8;
        let mut carried_from = cells[0];

        for &from in cells.iter() {
            let value = self.cells[from];
            if value == 0 {
                continue;
            }

            if carried == 0 {
                carried = value;
                carried_from = from;
                continue;
            }

            let destination = cells[to];
            if carried == value {
                let merged = carried + 1;
                assert!(merged <= MAX_POWER, "merge would overflow a 4-bit cell");
                trace.record(TraceEvent::Merged {
                    from0: carried_from,
                    from1: from,
                    to: destination,
                    value: carried,
                });
                *score += 1 << merged;
                self.cells[destination] = merged;
                moved = true;
                carried = 0;
            } else {
                trace.record(TraceEvent::Slid {
                    from: carried_from,
                    to: destination,
                    value: carried,
                });
                moved |= carried_from != destination;
                self.cells[destination] = carried;
                carried = value;
                carried_from = from;
            }
            to += 1;
        }

        if carried != 0 {
            let destination = cells[to];
            trace.record(TraceEvent::Slid {
                from: carried_from,
                to: destination,
                value: carried,
            });
            moved |= carried_from != destination;
            self.cells[destination] = carried;
            to += 1;
        }

        for &cell in cells[to..].iter() {
            trace.record(TraceEvent::Cleared { cell });
            self.cells[cell] = 0;
        }

        moved
    }

    pub fn make_move(&mut self, direction: Direction, rng: &mut XorShift128) -> bool {
        let mut score = 0;
        self.make_move_traced(direction, rng, &mut (), &mut score)
    }

    /// A full player turn: tilt, then spawn one tile if anything moved. A move
    /// that changes nothing leaves both the board and `rng` untouched.
    pub fn make_move_traced<T: TraceSink>(
        &mut self,
        direction: Direction,
        rng: &mut XorShift128,
        trace: &mut T,
        score: &mut u32,
    ) -> bool {
        let moved = self.tilt_traced(direction, trace, score);
        if moved {
            self.place_traced(1, rng, trace);
        }
        moved
    }
}

fn line_count(direction: Direction) -> usize {
    match direction {
        Direction::Left | Direction::Right => TILES_Y,
        Direction::Up | Direction::Down => TILES_X,
    }
}

/// Cells of one line, ordered from the edge the tiles slide towards.
fn line_cells(direction: Direction, line: usize) -> [usize; TILES_X] {
    let (dx, dy) = direction.delta();
    let width = TILES_X as isize;
    let begin: isize = if (dx | dy) > 0 {
        NUM_TILES as isize - 1
    } else {
        0
    };
    let step_major = -(dx * width + dy);
    let step_minor = -(dy * width + dx);

    let start = begin + step_major * line as isize;
    let mut cells = [0usize; TILES_X];
    for (i, cell) in cells.iter_mut().enumerate() {
        *cell = (start + step_minor * i as isize) as usize;
    }
    cells
}

pub(crate) fn displayed_to_power(value: u32) -> Result<u8, BoardError> {
    if value == 0 {
        return Ok(0);
    }
    if !value.is_power_of_two() || value == 1 {
        return Err(BoardError::InvalidTileValue {
            input: value.to_string(),
        });
    }
    let power = value.trailing_zeros() as u8;
    if power > MAX_POWER {
        return Err(BoardError::PowerTooLarge { power });
    }
    Ok(power)
}
