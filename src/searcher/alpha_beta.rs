//! The adversarial tree of `minimax`, pruned with an `[alpha, beta]` window.
//!
//! A node stops expanding children as soon as `alpha >= beta` and returns the
//! bound that caused the cutoff. The root is searched with the full `i32`
//! range, so its score and first move match the unpruned search.

use super::{adversary_placements, SearchContext, CANCELLED};
use crate::board::{Board, Direction};
use crate::evaluate::Evaluator;

pub(super) fn maximize<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    board: &Board,
    mut alpha: i32,
    beta: i32,
    plies: u32,
) -> (i32, Option<Direction>) {
    if context.cancelled() {
        return (CANCELLED, None);
    }
    if plies == 0 {
        return (context.evaluate(board), None);
    }

    let mut best_move = None;
    for &direction in Direction::ALL.iter() {
        let mut next = *board;
        if !next.tilt(direction) {
            continue;
        }
        context.tally_move();

        let score = minimize(context, &next, alpha, beta, plies - 1);
        if context.cancelled() {
            return (CANCELLED, None);
        }
        if score > alpha {
            alpha = score;
            best_move = Some(direction);
        }
        if alpha >= beta {
            context.tally_prune();
            return (alpha, best_move);
        }
    }

    (alpha, best_move)
}

fn minimize<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    board: &Board,
    alpha: i32,
    mut beta: i32,
    plies: u32,
) -> i32 {
    if context.cancelled() {
        return CANCELLED;
    }

    for next in adversary_placements(board) {
        let (score, _) = maximize(context, &next, alpha, beta, plies - 1);
        if context.cancelled() {
            return CANCELLED;
        }
        beta = beta.min(score);
        if alpha >= beta {
            context.tally_prune();
            return beta;
        }
    }
    beta
}
