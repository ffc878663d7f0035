//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{
    calculate_best_move::CalculateBestMoveArgs, compare_searchers::CompareSearchersArgs,
    play::PlayArgs, watch::WatchArgs,
};

#[derive(StructOpt)]
#[structopt(
    name = "tiles",
    about = "A sliding-tile puzzle with an adversarial search engine"
)]
pub enum Tiles {
    #[structopt(
        name = "play",
        about = "Play a game. Press `h` to let the computer make the next move, or `p` to let it play until you press `p` again. The computer looks `--lookahead` moves ahead (default: 5). Tile placement is random unless you fix it with `--seed`."
    )]
    Play(PlayArgs),
    #[structopt(
        name = "watch",
        about = "Watch the computer play a whole game at the given `--lookahead` (default: 3), waiting `--delay` milliseconds between moves."
    )]
    Watch(WatchArgs),
    #[structopt(
        name = "calculate-best-move",
        about = "Search once from the position given with `--board` (required) and print the recommended direction. The tile generator is seeded with `--seed` (default: 1) and the search runs at `--lookahead` (default: 5) with `--strategy` (default: caching-alpha-beta)."
    )]
    CalculateBestMove(CalculateBestMoveArgs),
    #[structopt(
        name = "compare-searchers",
        about = "Play random games from `--seed` to collect `--positions` distinct boards (default: 200), then check in parallel that every adversarial strategy finds the same score and move at `--lookahead` (default: 2)."
    )]
    CompareSearchers(CompareSearchersArgs),
}

impl crate::cli::commands::Command for Tiles {
    fn execute(self) {
        macro_rules! execute_command {
            ($($variant:ident($cmd:ident)),+ $(,)?) => {
                match self {
                    $(Self::$variant($cmd) => $cmd.execute(),)+
                }
            };
        }

        execute_command! {
            Play(cmd),
            Watch(cmd),
            CalculateBestMove(cmd),
            CompareSearchers(cmd),
        }
    }
}
