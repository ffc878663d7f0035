//! Static evaluation of a board for the searchers. Higher is better for the
//! player.

use crate::board::{Board, TILES_X, TILES_Y};

pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board) -> i32;
}

impl<F> Evaluator for F
where
    F: Fn(&Board) -> i32 + Send + Sync,
{
    fn evaluate(&self, board: &Board) -> i32 {
        self(board)
    }
}

/// Rewards rows and columns whose tiles keep increasing (or decreasing) in
/// one direction. Each line of four cells starts at 2 and loses a point every
/// time the direction between consecutive non-empty tiles reverses.
#[derive(Clone, Copy, Default, Debug)]
pub struct Monotonicity;

impl Evaluator for Monotonicity {
    fn evaluate(&self, board: &Board) -> i32 {
        let cells = board.cells();
        let mut total = 0;

        for y in 0..TILES_Y {
            total += line_monotonicity((0..TILES_X).map(|x| cells[y * TILES_X + x]), TILES_X);
        }
        for x in 0..TILES_X {
            total += line_monotonicity((0..TILES_Y).map(|y| cells[y * TILES_X + x]), TILES_Y);
        }

        total
    }
}

fn line_monotonicity<I: Iterator<Item = u8>>(line: I, len: usize) -> i32 {
    let mut total = len as i32 - 2;
    let mut tiles = line.filter(|&value| value != 0);

    let mut last_value = match tiles.next() {
        Some(value) => value as i32,
        None => return total,
    };
    let mut last_sign = 0;

    for value in tiles {
        let sign = (value as i32 - last_value).signum();
        if sign != 0 {
            if last_sign != 0 && last_sign != sign {
                total -= 1;
            }
            last_sign = sign;
        }
        last_value = value as i32;
    }

    total
}

/// Number of empty cells.
#[derive(Clone, Copy, Default, Debug)]
pub struct FreeCells;

impl Evaluator for FreeCells {
    fn evaluate(&self, board: &Board) -> i32 {
        board.count_free() as i32
    }
}
