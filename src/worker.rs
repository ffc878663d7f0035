//! Background search thread.
//!
//! The worker owns one `Searcher` on a dedicated thread and runs at most one
//! job at a time. The owner submits a copy of the position, then polls for the
//! recommended direction. All shared state sits behind a single mutex and
//! condition variable: the pending job, whether a search is running, and the
//! uncollected result.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use common::XorShift128;
use log::{debug, info, warn};
use thiserror::Error;

use crate::board::{Board, Direction};
use crate::evaluate::{Evaluator, Monotonicity};
use crate::searcher::{CancelToken, SearchError, Searcher, Strategy};

pub const DEFAULT_LOOKAHEAD: u8 = 2;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("worker is busy with another search")]
    Busy,
    #[error("failed to start the search thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("the search thread has stopped after a panic")]
    Stopped,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorkerStatus {
    Idle,
    Working,
    /// Finished and not yet collected. `None` when no move was found or the
    /// search was cancelled.
    Done(Option<Direction>),
}

struct Job {
    board: Board,
    rng: XorShift128,
    lookahead: u8,
}

#[derive(Default)]
struct State {
    job: Option<Job>,
    working: bool,
    done: bool,
    result: Option<Direction>,
    shutdown: bool,
    /// Set when the search thread died; no job will ever run again.
    stopped: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_while<'a, F>(&self, guard: MutexGuard<'a, State>, condition: F) -> MutexGuard<'a, State>
    where
        F: FnMut(&mut State) -> bool,
    {
        self.changed
            .wait_while(guard, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Worker {
    shared: Arc<Shared>,
    cancel: CancelToken,
    lookahead_default: u8,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// A worker running the caching alpha-beta search with the monotonicity
    /// heuristic.
    pub fn new(lookahead_default: u8) -> Result<Self, WorkerError> {
        Self::with_evaluator(Strategy::CachingAlphaBeta, Monotonicity, lookahead_default)
    }

    pub fn with_evaluator<E: Evaluator + 'static>(
        strategy: Strategy,
        evaluator: E,
        lookahead_default: u8,
    ) -> Result<Self, WorkerError> {
        let shared = Arc::new(Shared::default());
        let cancel = CancelToken::new();
        let searcher = Searcher::with_cancel_token(strategy, cancel.clone());

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("search-worker".to_string())
            .spawn(move || run(&thread_shared, searcher, &evaluator))?;

        Ok(Self {
            shared,
            cancel,
            lookahead_default,
            handle: Some(handle),
        })
    }

    pub fn lookahead_default(&self) -> u8 {
        self.lookahead_default
    }

    /// Queues a search of a copy of `board` and `rng`. Rejected while another
    /// search is running; an uncollected earlier result is discarded.
    pub fn submit(&self, board: &Board, rng: &XorShift128, lookahead: u8) -> Result<(), WorkerError> {
        let mut state = self.shared.lock();
        if state.stopped {
            return Err(WorkerError::Stopped);
        }
        if state.working {
            warn!("search requested while the worker is busy, ignoring it");
            return Err(WorkerError::Busy);
        }

        self.cancel.clear();
        state.job = Some(Job {
            board: *board,
            rng: *rng,
            lookahead,
        });
        state.working = true;
        state.done = false;
        state.result = None;
        self.shared.changed.notify_all();
        Ok(())
    }

    pub fn is_working(&self) -> bool {
        self.shared.lock().working
    }

    pub fn status(&self) -> WorkerStatus {
        let state = self.shared.lock();
        if state.working {
            WorkerStatus::Working
        } else if state.done {
            WorkerStatus::Done(state.result)
        } else {
            WorkerStatus::Idle
        }
    }

    /// Collects a finished result without blocking. The worker is idle again
    /// afterwards.
    pub fn try_take_result(&self) -> Option<Option<Direction>> {
        let mut state = self.shared.lock();
        if state.working || !state.done {
            return None;
        }
        state.done = false;
        Some(state.result.take())
    }

    /// Blocks until the current search finishes and returns its move. The
    /// result stays available to `try_take_result`.
    pub fn wait_for_result(&self) -> Option<Direction> {
        let state = self.shared.lock();
        let state = self.shared.wait_while(state, |state| state.working);
        if state.done {
            state.result
        } else {
            None
        }
    }

    /// Waits for any running search, then drops its result.
    pub fn reset(&self) {
        let state = self.shared.lock();
        let mut state = self.shared.wait_while(state, |state| state.working);
        state.done = false;
        state.result = None;
    }

    /// Stops the running search and waits until the worker is idle.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.reset();
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            self.cancel.cancel();
            self.shared.changed.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }
}

/// Marks the running job done if the search panics, so nobody waits on it
/// forever.
struct UnwindGuard<'a>(&'a Shared);

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        let mut state = self.0.lock();
        state.working = false;
        state.done = true;
        state.result = None;
        state.stopped = true;
        self.0.changed.notify_all();
    }
}

fn run<E: Evaluator>(shared: &Shared, mut searcher: Searcher, evaluator: &E) {
    let _guard = UnwindGuard(shared);
    loop {
        let job = {
            let state = shared.lock();
            let mut state = shared.wait_while(state, |state| state.job.is_none() && !state.shutdown);
            if state.shutdown {
                return;
            }
            state.job.take()
        };
        let job = match job {
            Some(job) => job,
            None => continue,
        };

        let result = match searcher.best_move(evaluator, &job.board, &job.rng, job.lookahead) {
            Ok(direction) => Some(direction),
            Err(SearchError::Cancelled) => {
                debug!("search cancelled");
                None
            }
            Err(error) => {
                debug!("search found nothing: {}", error);
                None
            }
        };
        info!("tried {} moves", searcher.moves_tried());

        let mut state = shared.lock();
        state.working = false;
        state.done = true;
        state.result = result;
        shared.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::tile_position;

    fn mid_game() -> Board {
        tile_position![
            2, 4, 0, 0,
            0, 8, 2, 0,
            0, 0, 16, 0,
            4, 0, 0, 2,
        ]
    }

    /// Evaluator that blocks until the returned flag is raised.
    fn gated() -> (Arc<AtomicBool>, impl Evaluator) {
        let open = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&open);
        let evaluator = move |board: &Board| {
            while !gate.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            board.count_free() as i32
        };
        (open, evaluator)
    }

    fn slow(board: &Board) -> i32 {
        thread::sleep(Duration::from_millis(1));
        board.count_free() as i32
    }

    #[test]
    fn test_submit_and_wait_matches_direct_search() {
        let worker = Worker::new(DEFAULT_LOOKAHEAD).unwrap();
        let board = mid_game();
        let rng = XorShift128::new(4);

        worker.submit(&board, &rng, 2).unwrap();
        let result = worker.wait_for_result();

        let mut searcher = Searcher::new(Strategy::CachingAlphaBeta);
        let expected = searcher.best_move(&Monotonicity, &board, &rng, 2).ok();
        assert_eq!(result, expected);
        assert!(result.is_some());

        assert_eq!(worker.status(), WorkerStatus::Done(result));
        assert_eq!(worker.try_take_result(), Some(result));
        assert_eq!(worker.status(), WorkerStatus::Idle);
        assert_eq!(worker.try_take_result(), None);
    }

    #[test]
    fn test_busy_worker_rejects_second_job() {
        let (open, evaluator) = gated();
        let worker = Worker::with_evaluator(Strategy::AlphaBeta, evaluator, 1).unwrap();
        let board = mid_game();
        let rng = XorShift128::new(1);

        worker.submit(&board, &rng, 1).unwrap();
        assert!(worker.is_working());
        assert!(matches!(worker.submit(&board, &rng, 1), Err(WorkerError::Busy)));
        assert_eq!(worker.try_take_result(), None);

        open.store(true, Ordering::SeqCst);
        assert!(worker.wait_for_result().is_some());
        assert!(!worker.is_working());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let worker = Worker::with_evaluator(Strategy::CachingAlphaBeta, slow, 3).unwrap();

        worker.submit(&mid_game(), &XorShift128::new(1), 3).unwrap();
        worker.cancel();

        assert_eq!(worker.status(), WorkerStatus::Idle);
        assert_eq!(worker.try_take_result(), None);
    }

    #[test]
    fn test_worker_accepts_jobs_after_cancel() {
        let worker = Worker::new(1).unwrap();
        worker.cancel();

        worker.submit(&mid_game(), &XorShift128::new(2), 1).unwrap();
        assert!(worker.wait_for_result().is_some());
    }

    #[test]
    fn test_finished_board_yields_no_move() {
        let worker = Worker::new(DEFAULT_LOOKAHEAD).unwrap();
        let board = tile_position![
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 2,
        ];
        worker.submit(&board, &XorShift128::new(1), 2).unwrap();
        assert_eq!(worker.wait_for_result(), None);
        assert_eq!(worker.status(), WorkerStatus::Done(None));
    }

    #[test]
    fn test_reset_discards_result() {
        let worker = Worker::new(1).unwrap();
        worker.submit(&mid_game(), &XorShift128::new(3), 1).unwrap();
        worker.reset();
        assert_eq!(worker.status(), WorkerStatus::Idle);
        assert_eq!(worker.try_take_result(), None);
    }

    #[test]
    fn test_panicking_search_does_not_hang_waiters() {
        // two 32768 tiles side by side overflow the 4-bit cell when merged
        let mut cells = [0u8; 16];
        cells[0] = 15;
        cells[1] = 15;
        cells[15] = 1;
        let board = Board::from_cells(cells);
        let worker = Worker::new(1).unwrap();

        worker.submit(&board, &XorShift128::new(1), 1).unwrap();
        assert_eq!(worker.wait_for_result(), None);
        assert!(!worker.is_working());
        assert_eq!(worker.status(), WorkerStatus::Done(None));

        assert!(matches!(
            worker.submit(&mid_game(), &XorShift128::new(1), 1),
            Err(WorkerError::Stopped)
        ));
        worker.cancel();
        assert_eq!(worker.status(), WorkerStatus::Idle);
    }

    #[test]
    fn test_drop_stops_running_search() {
        let worker = Worker::with_evaluator(Strategy::Minimax, slow, 4).unwrap();
        worker.submit(&mid_game(), &XorShift128::new(1), 4).unwrap();
        drop(worker);
    }
}
