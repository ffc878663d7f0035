//! Search along the real random number generator.
//!
//! Each branch forks the generator and plays a full move, so the tile that
//! spawns is the one that would really spawn. Useful as ground truth when
//! testing, but it never considers placements the generator would not make.

use common::XorShift128;

use super::{SearchContext, CANCELLED};
use crate::board::{Board, Direction};
use crate::evaluate::Evaluator;

pub(super) fn search<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    board: &Board,
    rng: &XorShift128,
    moves: u32,
) -> (i32, Option<Direction>) {
    if context.cancelled() {
        return (CANCELLED, None);
    }
    if moves == 0 {
        return (context.evaluate(board), None);
    }

    let mut best_score = i32::MIN;
    let mut best_move = None;
    for &direction in Direction::ALL.iter() {
        let mut next = *board;
        let mut next_rng = *rng;
        if !next.make_move(direction, &mut next_rng) {
            continue;
        }
        context.tally_move();

        let (score, _) = search(context, &next, &next_rng, moves - 1);
        if context.cancelled() {
            return (CANCELLED, None);
        }
        if score > best_score {
            best_score = score;
            best_move = Some(direction);
        }
    }

    (best_score, best_move)
}
