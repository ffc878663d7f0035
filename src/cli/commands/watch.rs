//! Watch command - watch the computer play a whole game.

use std::thread;
use std::time::Duration;

use structopt::StructOpt;
use tiles::game::display::GameDisplay;
use tiles::game::engine::{Engine, EngineError};
use tiles::input_handler::InputError;

use super::util::create_config;
use super::Command;

#[derive(StructOpt)]
pub struct WatchArgs {
    #[structopt(short, long, default_value = "3")]
    pub lookahead: u8,
    #[structopt(short, long, help = "Seed for tile placement (default: random)")]
    pub seed: Option<u32>,
    #[structopt(
        long = "delay",
        default_value = "100",
        help = "Delay between moves in milliseconds"
    )]
    pub delay_ms: u64,
}

impl WatchArgs {
    fn run(&self) -> Result<(), EngineError> {
        let mut engine = Engine::with_config(create_config(self.lookahead, self.seed))?;
        let mut ui = GameDisplay::new(false);
        let delay = Duration::from_millis(self.delay_ms);
        let mut moves = 0u32;

        engine.toggle_autoplay()?;
        ui.render(&engine).map_err(InputError::from)?;
        while engine.is_autoplaying() {
            if engine.wait_for_computer()?.is_some() {
                moves += 1;
            }
            ui.render(&engine).map_err(InputError::from)?;
            thread::sleep(delay);
        }

        println!(
            "Final score {} with a largest tile of {} after {} moves",
            engine.score(),
            1u32 << engine.board().max_tile(),
            moves
        );
        Ok(())
    }
}

impl Command for WatchArgs {
    fn execute(self) {
        if let Err(error) = self.run() {
            eprintln!("error: {}", error);
            std::process::exit(1);
        }
    }
}
