//! Game-tree search over tilt moves.
//!
//! Every strategy maximises over the four tilt directions, in `Direction::ALL`
//! order, and reports the first direction that reached the best score. The
//! adversarial strategies alternate each player ply with a tile-placement ply
//! in which the opponent may put a `2` or a `4` on any free cell and always
//! picks the placement that hurts the player most. One unit of lookahead is
//! one such pair of plies.
//!
//! Searches can be interrupted from another thread through a `CancelToken`.
//! The flag is polled on entry to every node; once it is observed the
//! recursion unwinds with `CANCELLED` and the whole search reports
//! `SearchError::Cancelled`.

mod alpha_beta;
mod caching;
mod minimax;
mod reference;
pub mod transposition_table;


use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::XorShift128;
use log::debug;
use thiserror::Error;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use crate::board::{Board, Direction};
use crate::evaluate::Evaluator;
use transposition_table::BoardCache;

/// Cache hits are tallied per remaining ply count, with deeper hits folded
/// into the last bucket.
pub const STAT_DEPTH: usize = 20;

/// Score that unwinds the recursion after a cancel request. Never trusted as
/// a result: whether a search was cancelled is decided by the token alone.
const CANCELLED: i32 = i32::MIN;

/// Values the adversary may drop on a free cell (exponents, so `2` and `4`).
static ADVERSARY_TILES: [u8; 2] = [1, 2];

#[derive(Error, Debug, PartialEq)]
pub enum SearchError {
    #[error("search was cancelled")]
    Cancelled,
    #[error("no available moves")]
    NoAvailableMoves,
    #[error("unknown search strategy `{0}`")]
    UnknownStrategy(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    /// Follows the real random number generator instead of an adversary, so
    /// it only sees the tiles that will actually spawn.
    Reference,
    Minimax,
    AlphaBeta,
    CachingMinimax,
    CachingAlphaBeta,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Reference,
        Strategy::Minimax,
        Strategy::AlphaBeta,
        Strategy::CachingMinimax,
        Strategy::CachingAlphaBeta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Reference => "reference",
            Strategy::Minimax => "minimax",
            Strategy::AlphaBeta => "alpha-beta",
            Strategy::CachingMinimax => "caching-minimax",
            Strategy::CachingAlphaBeta => "caching-alpha-beta",
        }
    }

    /// True for the strategies that search against a worst-case opponent.
    pub fn is_adversarial(self) -> bool {
        self != Strategy::Reference
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::CachingAlphaBeta
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| SearchError::UnknownStrategy(s.to_string()))
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Default, Debug)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears the flag, returning whether it was set.
    pub fn clear(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub moves_tried: u64,
    pub evaluations: u64,
    pub pruned: u64,
    pub cache_hits: [u64; STAT_DEPTH],
    pub last_score: Option<i32>,
    pub last_duration: Option<Duration>,
}

impl SearchStats {
    fn reset(&mut self) {
        *self = Default::default();
    }

    pub fn total_cache_hits(&self) -> u64 {
        self.cache_hits.iter().sum()
    }
}

/// Per-search state threaded through the recursion.
struct SearchContext<'a, E: Evaluator + ?Sized> {
    evaluator: &'a E,
    cancel: &'a CancelToken,
    stats: &'a mut SearchStats,
}

impl<'a, E: Evaluator + ?Sized> SearchContext<'a, E> {
    fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn evaluate(&mut self, board: &Board) -> i32 {
        self.stats.evaluations += 1;
        self.evaluator.evaluate(board)
    }

    fn tally_move(&mut self) {
        self.stats.moves_tried += 1;
    }

    fn tally_prune(&mut self) {
        self.stats.pruned += 1;
    }

    fn tally_cache_hit(&mut self, plies: u32) {
        let bucket = (plies as usize).min(STAT_DEPTH - 1);
        self.stats.cache_hits[bucket] += 1;
    }
}

/// Every board the adversary can produce from `board`: each free cell in
/// ascending order, each with a `2` then a `4`.
fn adversary_placements(board: &Board) -> impl Iterator<Item = Board> + '_ {
    board.free_cells().into_iter().flat_map(move |cell| {
        ADVERSARY_TILES.iter().map(move |&value| {
            let mut next = *board;
            next.set_empty_cell(cell as usize, value);
            next
        })
    })
}

enum Body {
    Reference,
    Minimax,
    AlphaBeta,
    CachingMinimax(BoardCache<caching::DepthScore>),
    CachingAlphaBeta(BoardCache<caching::BoundedScore>),
}

impl Body {
    fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Reference => Body::Reference,
            Strategy::Minimax => Body::Minimax,
            Strategy::AlphaBeta => Body::AlphaBeta,
            Strategy::CachingMinimax => Body::CachingMinimax(BoardCache::new()),
            Strategy::CachingAlphaBeta => Body::CachingAlphaBeta(BoardCache::new()),
        }
    }
}

pub struct Searcher {
    strategy: Strategy,
    body: Body,
    cancel: CancelToken,
    stats: SearchStats,
    best_first_move: Option<Direction>,
}

impl Searcher {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_cancel_token(strategy, CancelToken::new())
    }

    /// Builds a searcher that polls an existing token, so the owner can cancel
    /// it without holding the searcher.
    pub fn with_cancel_token(strategy: Strategy, cancel: CancelToken) -> Self {
        Self {
            strategy,
            body: Body::new(strategy),
            cancel,
            stats: SearchStats::default(),
            best_first_move: None,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Requests cancellation of the running search, or of the next one if
    /// none is running.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn best_first_move(&self) -> Option<Direction> {
        self.best_first_move
    }

    pub fn moves_tried(&self) -> u64 {
        self.stats.moves_tried
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Searches `lookahead` moves ahead of `board` and returns the score of the
    /// best line. `rng` is only read by the reference strategy, which forks it
    /// for every branch; neither argument is modified.
    ///
    /// The transposition cache of the caching strategies is cleared first, so
    /// results never depend on earlier searches.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn search<E: Evaluator + ?Sized>(
        &mut self,
        evaluator: &E,
        board: &Board,
        rng: &XorShift128,
        lookahead: u8,
    ) -> Result<i32, SearchError> {
        self.stats.reset();
        self.best_first_move = None;
        let start = Instant::now();
        let plies = lookahead as u32 * 2;

        let mut context = SearchContext {
            evaluator,
            cancel: &self.cancel,
            stats: &mut self.stats,
        };
        let (score, first_move) = match &mut self.body {
            Body::Reference => reference::search(&mut context, board, rng, lookahead as u32),
            Body::Minimax => minimax::maximize(&mut context, board, plies),
            Body::AlphaBeta => alpha_beta::maximize(&mut context, board, i32::MIN, i32::MAX, plies),
            Body::CachingMinimax(cache) => {
                cache.reset();
                caching::minimax(&mut context, cache, board, plies)
            }
            Body::CachingAlphaBeta(cache) => {
                cache.reset();
                caching::maximize(&mut context, cache, board, i32::MIN, i32::MAX, plies)
            }
        };

        if self.cancel.clear() {
            debug!(
                "{} search cancelled after {} moves",
                self.strategy, self.stats.moves_tried
            );
            return Err(SearchError::Cancelled);
        }

        let duration = start.elapsed();
        self.best_first_move = first_move;
        self.stats.last_score = Some(score);
        self.stats.last_duration = Some(duration);
        debug!(
            "{} search (lookahead {}): score {} move {:?}, {} moves tried, {} evaluations, {} pruned, cache hits {:?} in {:?}",
            self.strategy,
            lookahead,
            score,
            first_move,
            self.stats.moves_tried,
            self.stats.evaluations,
            self.stats.pruned,
            &self.stats.cache_hits[..(plies as usize).min(STAT_DEPTH)],
            duration
        );

        Ok(score)
    }

    /// Runs a search and returns the recommended direction.
    pub fn best_move<E: Evaluator + ?Sized>(
        &mut self,
        evaluator: &E,
        board: &Board,
        rng: &XorShift128,
        lookahead: u8,
    ) -> Result<Direction, SearchError> {
        self.search(evaluator, board, rng, lookahead)?;
        self.best_first_move.ok_or(SearchError::NoAvailableMoves)
    }
}
