//! Play command - play a game, with the computer on call for hints.

use structopt::StructOpt;
use tiles::input_handler::{KeyboardInput, LineInput};

use super::util::{create_config, raw_mode, run_game_loop};
use super::Command;

#[derive(StructOpt)]
pub struct PlayArgs {
    #[structopt(short, long, default_value = "5")]
    pub lookahead: u8,
    #[structopt(short, long, help = "Seed for tile placement (default: random)")]
    pub seed: Option<u32>,
}

impl Command for PlayArgs {
    fn execute(self) {
        let config = create_config(self.lookahead, self.seed);

        match raw_mode() {
            Some(_terminal) => run_game_loop(KeyboardInput::new(), true, config),
            None => run_game_loop(LineInput::stdin(), false, config),
        }
    }
}
