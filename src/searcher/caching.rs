//! The adversarial searches with a transposition cache.
//!
//! Different tilt and placement orders often reach the same board, so each
//! node first looks its board up in a `BoardCache`. An entry is only reused
//! when it was computed with exactly the same number of remaining plies. The
//! empty board packs to key 0, which the cache cannot hold, so it is always
//! searched directly.

use super::transposition_table::{BoardCache, BoundType, BucketIndex};
use super::{adversary_placements, SearchContext, CANCELLED};
use crate::board::key::BoardKey;
use crate::board::{Board, Direction};
use crate::evaluate::Evaluator;

#[derive(Clone, Copy, Default, Debug)]
pub(super) struct DepthScore {
    plies: u32,
    score: i32,
}

#[derive(Clone, Copy, Default, Debug)]
pub(super) struct BoundedScore {
    plies: u32,
    bound: BoundType,
    score: i32,
}

impl BoundedScore {
    /// Whether the entry decides this node for the window `(alpha, beta)`.
    fn usable(&self, alpha: i32, beta: i32, plies: u32) -> bool {
        if self.plies != plies {
            return false;
        }
        match self.bound {
            BoundType::Exact => true,
            BoundType::Upper => self.score <= alpha,
            BoundType::Lower => self.score >= beta,
        }
    }
}

fn cache_slot<T: Copy + Default>(cache: &BoardCache<T>, board: &Board) -> Option<(BoardKey, BucketIndex)> {
    let key = board.key();
    if key == 0 {
        None
    } else {
        Some((key, cache.locate(key)))
    }
}

/// Full-width minimax, caching the exact value of every finished node.
pub(super) fn minimax<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    cache: &mut BoardCache<DepthScore>,
    board: &Board,
    plies: u32,
) -> (i32, Option<Direction>) {
    if context.cancelled() {
        return (CANCELLED, None);
    }

    let slot = cache_slot(cache, board);
    if let Some((key, at)) = slot {
        if let Some(cached) = cache.get(key, at) {
            if cached.plies == plies {
                context.tally_cache_hit(plies);
                return (cached.score, None);
            }
        }
    }

    let mut best_move = None;
    let best_score = if plies == 0 {
        context.evaluate(board)
    } else if plies % 2 == 1 {
        let mut best_score = i32::MAX;
        for next in adversary_placements(board) {
            let (score, _) = minimax(context, cache, &next, plies - 1);
            if context.cancelled() {
                return (CANCELLED, None);
            }
            best_score = best_score.min(score);
        }
        best_score
    } else {
        let mut best_score = i32::MIN;
        for &direction in Direction::ALL.iter() {
            let mut next = *board;
            if !next.tilt(direction) {
                continue;
            }
            context.tally_move();

            let (score, _) = minimax(context, cache, &next, plies - 1);
            if context.cancelled() {
                return (CANCELLED, None);
            }
            if score > best_score {
                best_score = score;
                best_move = Some(direction);
            }
        }
        best_score
    };

    if let Some((key, at)) = slot {
        cache.put(key, at, DepthScore { plies, score: best_score });
    }
    (best_score, best_move)
}

fn probe<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    cache: &BoardCache<BoundedScore>,
    slot: Option<(BoardKey, BucketIndex)>,
    alpha: i32,
    beta: i32,
    plies: u32,
) -> Option<i32> {
    let (key, at) = slot?;
    let cached = cache.get(key, at)?;
    if cached.usable(alpha, beta, plies) {
        context.tally_cache_hit(plies);
        Some(cached.score)
    } else {
        None
    }
}

fn store(
    cache: &mut BoardCache<BoundedScore>,
    slot: Option<(BoardKey, BucketIndex)>,
    plies: u32,
    bound: BoundType,
    score: i32,
) {
    if let Some((key, at)) = slot {
        cache.put(key, at, BoundedScore { plies, bound, score });
    }
}

/// Player ply of the cached alpha-beta search.
///
/// The stored bound is `Upper` while no child raised alpha, `Exact` once one
/// did and `Lower` after a cutoff.
pub(super) fn maximize<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    cache: &mut BoardCache<BoundedScore>,
    board: &Board,
    mut alpha: i32,
    beta: i32,
    plies: u32,
) -> (i32, Option<Direction>) {
    debug_assert!(alpha < beta);
    if context.cancelled() {
        return (CANCELLED, None);
    }

    let slot = cache_slot(cache, board);
    if let Some(score) = probe(context, cache, slot, alpha, beta, plies) {
        return (score, None);
    }

    if plies == 0 {
        let score = context.evaluate(board);
        store(cache, slot, 0, BoundType::Exact, score);
        return (score, None);
    }

    let mut bound = BoundType::Upper;
    let mut best_move = None;
    for &direction in Direction::ALL.iter() {
        let mut next = *board;
        if !next.tilt(direction) {
            continue;
        }
        context.tally_move();

        let score = minimize(context, cache, &next, alpha, beta, plies - 1);
        if context.cancelled() {
            return (CANCELLED, None);
        }
        if score > alpha {
            alpha = score;
            bound = BoundType::Exact;
            best_move = Some(direction);
        }
        if alpha >= beta {
            context.tally_prune();
            bound = BoundType::Lower;
            break;
        }
    }

    store(cache, slot, plies, bound, alpha);
    (alpha, best_move)
}

/// Adversary ply of the cached alpha-beta search.
///
/// Mirrors `maximize`: `Lower` while no placement lowered beta, `Exact` once
/// one did and `Upper` after a cutoff.
fn minimize<E: Evaluator + ?Sized>(
    context: &mut SearchContext<E>,
    cache: &mut BoardCache<BoundedScore>,
    board: &Board,
    alpha: i32,
    mut beta: i32,
    plies: u32,
) -> i32 {
    debug_assert!(alpha < beta);
    if context.cancelled() {
        return CANCELLED;
    }

    let slot = cache_slot(cache, board);
    if let Some(score) = probe(context, cache, slot, alpha, beta, plies) {
        return score;
    }

    let mut bound = BoundType::Lower;
    for next in adversary_placements(board) {
        let (score, _) = maximize(context, cache, &next, alpha, beta, plies - 1);
        if context.cancelled() {
            return CANCELLED;
        }
        if score < beta {
            beta = score;
            bound = BoundType::Exact;
        }
        if alpha >= beta {
            context.tally_prune();
            bound = BoundType::Upper;
            break;
        }
    }

    store(cache, slot, plies, bound, beta);
    beta
}
