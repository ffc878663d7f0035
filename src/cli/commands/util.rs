//! Shared utilities for CLI commands.

use std::io;

use termion::raw::{IntoRawMode, RawTerminal};
use tiles::game::display::GameDisplay;
use tiles::game::engine::EngineConfig;
use tiles::game::r#loop::GameLoop;
use tiles::input_handler::InputSource;

pub(crate) fn run_game_loop<I: InputSource>(input: I, raw: bool, config: EngineConfig) {
    let result = GameLoop::new(input, GameDisplay::new(raw), config).and_then(|mut game| game.run());
    if let Err(error) = result {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

pub(crate) fn create_config(lookahead: u8, seed: Option<u32>) -> EngineConfig {
    EngineConfig { lookahead, seed }
}

/// Puts the terminal in raw mode while the guard is alive, if stdin is one.
pub(crate) fn raw_mode() -> Option<RawTerminal<io::Stdout>> {
    if !termion::is_tty(&io::stdin()) {
        return None;
    }
    match io::stdout().into_raw_mode() {
        Ok(terminal) => Some(terminal),
        Err(error) => {
            log::warn!("could not switch the terminal to raw mode: {}", error);
            None
        }
    }
}
