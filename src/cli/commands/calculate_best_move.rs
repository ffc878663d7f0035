//! Calculate best move command - run one search from a given board.

use common::XorShift128;
use structopt::StructOpt;
use tiles::board::Board;
use tiles::evaluate::Monotonicity;
use tiles::searcher::{Searcher, Strategy};

use super::Command;

#[derive(StructOpt)]
pub struct CalculateBestMoveArgs {
    #[structopt(short, long, default_value = "5")]
    pub lookahead: u8,
    #[structopt(
        long = "board",
        help = "16 tile values row by row (e.g. \"2 0 0 4 / ...\") or a packed hex key"
    )]
    pub board: Board,
    #[structopt(short, long, default_value = "1")]
    pub seed: u32,
    #[structopt(long, default_value = "caching-alpha-beta")]
    pub strategy: Strategy,
}

impl Command for CalculateBestMoveArgs {
    fn execute(self) {
        let rng = XorShift128::new(self.seed);
        let mut searcher = Searcher::new(self.strategy);

        println!("{}", self.board);
        match searcher.search(&Monotonicity, &self.board, &rng, self.lookahead) {
            Ok(score) => match searcher.best_first_move() {
                Some(direction) => {
                    let stats = searcher.stats();
                    println!("{} (score {})", direction, score);
                    println!(
                        "tried {} moves, {} evaluations, {} cutoffs, {} cache hits in {:?}",
                        stats.moves_tried,
                        stats.evaluations,
                        stats.pruned,
                        stats.total_cache_hits(),
                        stats.last_duration.unwrap_or_default()
                    );
                }
                None => eprintln!("There are no valid moves in the given position."),
            },
            Err(err) => eprintln!("Failed to calculate best move: {}", err),
        }
    }
}
