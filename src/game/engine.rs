use common::random_number_generator::random_seed;
use log::{debug, info};
use thiserror::Error;

use crate::board::trace::TraceEvent;
use crate::board::{Board, Direction};
use crate::history::History;
use crate::input_handler::{InputError, PlayerInput};
use crate::worker::{Worker, WorkerError, WorkerStatus};

/// Core engine configuration
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Moves the computer looks ahead for hints and autoplay.
    pub lookahead: u8,
    /// Seed for tile placement. A random seed is drawn when unset.
    pub seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead: 5,
            seed: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("the computer is still thinking")]
    Busy,
    #[error("worker error: {error}")]
    Worker { error: WorkerError },
    #[error("input error: {error}")]
    Input { error: InputError },
}

impl From<WorkerError> for EngineError {
    fn from(error: WorkerError) -> Self {
        match error {
            WorkerError::Busy => EngineError::Busy,
            error => EngineError::Worker { error },
        }
    }
}

impl From<InputError> for EngineError {
    fn from(error: InputError) -> Self {
        EngineError::Input { error }
    }
}

/// Owns one game: the move history, the background search and the
/// autoplay switch. Player commands are ignored with `EngineError::Busy`
/// while the computer is thinking or its move is waiting to be played.
pub struct Engine {
    history: History,
    worker: Worker,
    autoplay: bool,
    last_trace: Vec<TraceEvent>,
    last_move: Option<Direction>,
}

impl Engine {
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        let worker = Worker::new(config.lookahead)?;
        Ok(Self::with_worker(config, worker))
    }

    /// Uses an existing worker; its default lookahead is the one used for
    /// hints and autoplay.
    pub fn with_worker(config: EngineConfig, worker: Worker) -> Self {
        let seed = config.seed.unwrap_or_else(random_seed);
        info!("starting game with seed {}", seed);

        let mut engine = Self {
            history: History::new(seed),
            worker,
            autoplay: false,
            last_trace: Vec::new(),
            last_move: None,
        };
        engine.history.new_game_traced(&mut engine.last_trace);
        engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn board(&self) -> &Board {
        self.history.board()
    }

    pub fn score(&self) -> u32 {
        self.history.score()
    }

    /// Events of the last change to the board, for animation.
    pub fn last_trace(&self) -> &[TraceEvent] {
        &self.last_trace
    }

    pub fn last_move(&self) -> Option<Direction> {
        self.last_move
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay
    }

    pub fn is_thinking(&self) -> bool {
        self.worker.is_working()
    }

    /// Thinking, or holding a computer move that `poll` has not played yet.
    pub fn is_busy(&self) -> bool {
        self.worker.status() != WorkerStatus::Idle
    }

    pub fn finished(&self) -> bool {
        self.board().finished()
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        Ok(())
    }

    /// Returns whether the move changed the board.
    pub fn human_move(&mut self, direction: Direction) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        Ok(self.play(direction))
    }

    fn play(&mut self, direction: Direction) -> bool {
        self.last_trace.clear();
        let moved = self
            .history
            .make_move_traced(direction, &mut self.last_trace);
        if moved {
            self.last_move = Some(direction);
        }
        moved
    }

    pub fn undo(&mut self) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        self.last_trace.clear();
        self.last_move = None;
        Ok(self.history.undo())
    }

    pub fn redo(&mut self) -> Result<bool, EngineError> {
        self.ensure_idle()?;
        self.last_trace.clear();
        self.last_move = None;
        Ok(self.history.redo())
    }

    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.worker.reset();
        self.autoplay = false;
        self.last_move = None;
        self.last_trace.clear();
        self.history.new_game_traced(&mut self.last_trace);
        Ok(())
    }

    /// Asks the worker for the next move. The move is played by `poll` once
    /// the search finishes.
    pub fn request_hint(&mut self) -> Result<(), EngineError> {
        let lookahead = self.worker.lookahead_default();
        self.worker
            .submit(self.history.board(), self.history.rng(), lookahead)?;
        Ok(())
    }

    /// Returns the new autoplay state. Turning autoplay on starts thinking
    /// right away; turning it off cancels the running search.
    pub fn toggle_autoplay(&mut self) -> Result<bool, EngineError> {
        if self.autoplay {
            self.stop();
            return Ok(false);
        }
        self.autoplay = true;
        if !self.is_busy() && !self.finished() {
            self.request_hint()?;
        }
        Ok(true)
    }

    /// Stops thinking and switches autoplay off.
    pub fn stop(&mut self) {
        self.autoplay = false;
        self.worker.cancel();
    }

    /// Plays a finished search result, if any, and keeps autoplay going.
    /// Autoplay stops when the computer finds no move or the game ends.
    pub fn poll(&mut self) -> Result<Option<Direction>, EngineError> {
        let result = match self.worker.try_take_result() {
            Some(result) => result,
            None => return Ok(None),
        };

        let direction = match result {
            Some(direction) => direction,
            None => {
                debug!("computer found no move, autoplay off");
                self.autoplay = false;
                return Ok(None);
            }
        };

        self.play(direction);
        if self.finished() {
            self.autoplay = false;
        } else if self.autoplay {
            self.request_hint()?;
        }
        Ok(Some(direction))
    }

    /// Blocks until the running search finishes, then behaves like `poll`.
    pub fn wait_for_computer(&mut self) -> Result<Option<Direction>, EngineError> {
        self.worker.wait_for_result();
        self.poll()
    }

    /// Applies one player command. `Quit` is left to the caller.
    pub fn handle(&mut self, input: PlayerInput) -> Result<(), EngineError> {
        match input {
            PlayerInput::Move(direction) => {
                self.human_move(direction)?;
            }
            PlayerInput::Undo => {
                self.undo()?;
            }
            PlayerInput::Redo => {
                self.redo()?;
            }
            PlayerInput::NewGame => self.new_game()?,
            PlayerInput::Hint => self.request_hint()?,
            PlayerInput::ToggleAutoplay => {
                self.toggle_autoplay()?;
            }
            PlayerInput::Quit => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::evaluate::{Evaluator, Monotonicity};
    use crate::searcher::Strategy;

    fn engine(lookahead: u8) -> Engine {
        Engine::with_config(EngineConfig {
            lookahead,
            seed: Some(1234),
        })
        .unwrap()
    }

    fn first_legal(board: &Board) -> Direction {
        Direction::ALL
            .iter()
            .copied()
            .find(|&direction| {
                let mut tilted = *board;
                tilted.tilt(direction)
            })
            .unwrap()
    }

    #[test]
    fn test_new_engine_starts_a_game() {
        let engine = engine(1);
        assert_eq!(engine.board().count_free(), 14);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.last_trace().len(), 2);
        assert!(!engine.is_thinking());
        assert!(!engine.is_autoplaying());
    }

    #[test]
    fn test_same_seed_same_game() {
        let a = engine(1);
        let b = engine(1);
        assert_eq!(a.board(), b.board());
    }

    #[test]
    fn test_human_move_and_undo() {
        let mut engine = engine(1);
        let start = *engine.board();
        let direction = first_legal(&start);

        assert!(engine.human_move(direction).unwrap());
        assert_eq!(engine.last_move(), Some(direction));
        assert!(engine
            .last_trace()
            .iter()
            .any(|event| matches!(event, TraceEvent::Appeared { .. })));

        assert!(engine.undo().unwrap());
        assert_eq!(engine.board(), &start);
        assert!(engine.redo().unwrap());
        assert_ne!(engine.board(), &start);
    }

    #[test]
    fn test_hint_plays_the_computer_move() {
        let mut engine = engine(2);
        let start = *engine.board();
        engine.request_hint().unwrap();
        let played = engine.wait_for_computer().unwrap();

        assert!(played.is_some());
        assert_eq!(engine.last_move(), played);
        assert_ne!(engine.board(), &start);
        assert_eq!(engine.history().undo_available(), 1);
        assert!(!engine.is_autoplaying());
    }

    #[test]
    fn test_autoplay_keeps_playing_until_toggled_off() {
        let mut engine = engine(1);
        assert!(engine.toggle_autoplay().unwrap());

        for _ in 0..5 {
            assert!(engine.wait_for_computer().unwrap().is_some());
        }
        assert!(engine.history().undo_available() >= 5);

        let played = engine.history().undo_available();
        assert!(!engine.toggle_autoplay().unwrap());
        assert!(!engine.is_busy());
        assert_eq!(engine.wait_for_computer().unwrap(), None);
        assert_eq!(engine.history().undo_available(), played);
    }

    #[test]
    fn test_finished_hint_blocks_commands_until_played() {
        let mut engine = engine(1);
        let direction = first_legal(engine.board());
        engine.human_move(direction).unwrap();
        let board = *engine.board();

        engine.request_hint().unwrap();
        while engine.is_thinking() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(engine.is_busy());
        assert!(matches!(engine.undo(), Err(EngineError::Busy)));
        assert!(matches!(engine.redo(), Err(EngineError::Busy)));
        assert!(matches!(
            engine.human_move(direction),
            Err(EngineError::Busy)
        ));
        assert_eq!(engine.board(), &board);

        let hint = engine.poll().unwrap().unwrap();
        let mut expected = board;
        assert!(expected.tilt(hint));
        assert_eq!(engine.history().undo_available(), 2);
        assert!(!engine.is_busy());
        assert!(engine.undo().unwrap());
        assert_eq!(engine.board(), &board);
    }

    #[test]
    fn test_commands_are_rejected_while_thinking() {
        let open = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&open);
        let evaluator = move |board: &Board| {
            while !gate.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            Monotonicity.evaluate(board)
        };
        let worker = Worker::with_evaluator(Strategy::CachingAlphaBeta, evaluator, 1).unwrap();
        let mut engine = Engine::with_worker(
            EngineConfig {
                lookahead: 1,
                seed: Some(5),
            },
            worker,
        );

        engine.request_hint().unwrap();
        assert!(engine.is_thinking());
        assert!(matches!(
            engine.human_move(Direction::Left),
            Err(EngineError::Busy)
        ));
        assert!(matches!(engine.request_hint(), Err(EngineError::Busy)));
        assert!(matches!(engine.undo(), Err(EngineError::Busy)));

        open.store(true, Ordering::SeqCst);
        assert!(engine.wait_for_computer().unwrap().is_some());
    }

    #[test]
    fn test_new_game_resets_history() {
        let mut engine = engine(1);
        let direction = first_legal(engine.board());
        engine.human_move(direction).unwrap();
        engine.new_game().unwrap();
        assert_eq!(engine.history().undo_available(), 0);
        assert_eq!(engine.board().count_free(), 14);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_handle_dispatches_commands() {
        let mut engine = engine(1);
        let direction = first_legal(engine.board());
        engine.handle(PlayerInput::Move(direction)).unwrap();
        assert_eq!(engine.history().undo_available(), 1);
        engine.handle(PlayerInput::Undo).unwrap();
        assert_eq!(engine.history().redo_available(), 1);
        engine.handle(PlayerInput::Redo).unwrap();
        assert_eq!(engine.history().undo_available(), 1);
    }
}
