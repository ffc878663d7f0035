//! Full-width search against the worst-case tile placement.

use super::{adversary_placements, SearchContext, CANCELLED};
use crate::board::{Board, Direction};
use crate::evaluate::Evaluator;

/// Player ply: best score over the directions that move something.
pub(super) fn maximize<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    board: &Board,
    plies: u32,
) -> (i32, Option<Direction>) {
    if context.cancelled() {
        return (CANCELLED, None);
    }
    if plies == 0 {
        return (context.evaluate(board), None);
    }

    let mut best_score = i32::MIN;
    let mut best_move = None;
    for &direction in Direction::ALL.iter() {
        let mut next = *board;
        if !next.tilt(direction) {
            continue;
        }
        context.tally_move();

        let score = minimize(context, &next, plies - 1);
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

/// Adversary ply: lowest score over every placement on a free cell.
fn minimize<E: Evaluator + ?Sized>(context: &mut SearchContext<E>, board: &Board, plies: u32) -> i32 {
    if context.cancelled() {
        return CANCELLED;
    }

    let mut best_score = i32::MAX;
    for next in adversary_placements(board) {
        let (score, _) = maximize(context, &next, plies - 1);
        if context.cancelled() {
            return CANCELLED;
        }
        best_score = best_score.min(score);
    }
    best_score
}
