use std::thread;
use std::time::Duration;

use log::debug;

use crate::game::display::GameDisplay;
use crate::game::engine::{Engine, EngineConfig, EngineError};
use crate::input_handler::{InputError, InputSource, PlayerInput};

/// How long to sleep when no input is pending.
const IDLE_DELAY: Duration = Duration::from_millis(16);

pub struct GameLoop<I: InputSource> {
    engine: Engine,
    ui: GameDisplay,
    input: I,
}

impl<I: InputSource> GameLoop<I> {
    pub fn new(input: I, ui: GameDisplay, config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            engine: Engine::with_config(config)?,
            ui,
            input,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Runs until the player quits or input ends.
    pub fn run(&mut self) -> Result<(), EngineError> {
        let mut dirty = true;
        loop {
            if self.engine.poll()?.is_some() {
                dirty = true;
            }
            if dirty {
                self.ui.render(&self.engine).map_err(InputError::from)?;
                dirty = false;
            }

            // a blocking reader would stall the computer's moves on screen
            if self.input.blocks() && self.engine.is_busy() {
                self.engine.wait_for_computer()?;
                dirty = true;
                continue;
            }

            match self.input.next_input() {
                Ok(Some(PlayerInput::Quit)) => break,
                Ok(Some(input)) => match self.engine.handle(input) {
                    Ok(()) => dirty = true,
                    Err(EngineError::Busy) => debug!("ignoring {:?} while thinking", input),
                    Err(error) => return Err(error),
                },
                Ok(None) => thread::sleep(IDLE_DELAY),
                Err(InputError::InvalidInput { input }) => {
                    debug!("ignoring invalid input {:?}", input);
                }
                Err(error) => return Err(error.into()),
            }
        }

        self.engine.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::input_handler::LineInput;

    fn game(script: &str) -> GameLoop<LineInput<Cursor<Vec<u8>>>> {
        let input = LineInput::new(Cursor::new(script.as_bytes().to_vec()));
        GameLoop::new(
            input,
            GameDisplay::new(false),
            EngineConfig {
                lookahead: 1,
                seed: Some(77),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_scripted_moves_and_undo() {
        let mut game = game("left\nright\nup\ndown\nz\nnonsense\nq\n");
        game.run().unwrap();
        let history = game.engine().history();
        assert!(history.undo_available() + history.redo_available() <= 4);
        assert!(!game.engine().is_thinking());
    }

    #[test]
    fn test_hint_is_played_before_next_input() {
        let mut game = game("h\nh\n");
        game.run().unwrap();
        assert_eq!(game.engine().history().undo_available(), 2);
    }
}
