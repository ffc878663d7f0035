//! Compare searchers command - check that every adversarial strategy agrees
//! on positions reached by real play.

use std::time::Instant;

use common::XorShift128;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use structopt::StructOpt;
use tiles::board::{Board, Direction};
use tiles::evaluate::Monotonicity;
use tiles::searcher::{Searcher, Strategy};

use super::Command;

#[derive(StructOpt)]
pub struct CompareSearchersArgs {
    #[structopt(short, long, default_value = "2")]
    pub lookahead: u8,
    #[structopt(short, long, default_value = "1")]
    pub seed: u32,
    #[structopt(short, long, default_value = "200", help = "Number of distinct positions")]
    pub positions: usize,
}

/// Distinct boards visited by games played with pseudo-random directions,
/// starting a new game whenever one ends.
fn corpus(seed: u32, count: usize) -> Vec<Board> {
    let mut rng = XorShift128::new(seed);
    let mut steer = XorShift128::new(seed ^ 0x9e37_79b9);
    let mut seen = FxHashSet::default();
    let mut boards = Vec::with_capacity(count);

    let mut board = Board::new();
    board.place(2, &mut rng);
    while boards.len() < count {
        if board.finished() {
            board = Board::new();
            board.place(2, &mut rng);
        }
        let direction = Direction::from_index(steer.next_n(4) as usize);
        if board.make_move(direction, &mut rng) && seen.insert(board.key()) {
            boards.push(board);
        }
    }
    boards
}

/// Score and move of every adversarial strategy, in `Strategy::ALL` order.
fn search_all(
    searchers: &mut [Searcher],
    board: &Board,
    rng: &XorShift128,
    lookahead: u8,
) -> Vec<(Strategy, Option<i32>, Option<Direction>)> {
    searchers
        .iter_mut()
        .map(|searcher| {
            let score = searcher.search(&Monotonicity, board, rng, lookahead).ok();
            (searcher.strategy(), score, searcher.best_first_move())
        })
        .collect()
}

impl Command for CompareSearchersArgs {
    fn execute(self) {
        let start = Instant::now();
        let boards = corpus(self.seed, self.positions);
        let rng = XorShift128::new(self.seed);
        let lookahead = self.lookahead;

        let mismatches: Vec<_> = boards
            .par_iter()
            .map_init(
                || {
                    Strategy::ALL
                        .iter()
                        .filter(|strategy| strategy.is_adversarial())
                        .map(|&strategy| Searcher::new(strategy))
                        .collect::<Vec<_>>()
                },
                |searchers, board| {
                    let results = search_all(searchers, board, &rng, lookahead);
                    let (_, score, direction) = results[0];
                    let agree = results
                        .iter()
                        .all(|&(_, other_score, other_direction)| {
                            other_score == score && other_direction == direction
                        });
                    (board, results, agree)
                },
            )
            .filter(|(_, _, agree)| !agree)
            .collect();

        for (board, results, _) in &mismatches {
            println!("{:?}\n{}", board, board);
            for (strategy, score, direction) in results {
                println!("  {:<20} {:?} {:?}", strategy.name(), score, direction);
            }
        }

        println!(
            "{} of {} positions disagree at lookahead {} ({:?})",
            mismatches.len(),
            boards.len(),
            lookahead,
            start.elapsed()
        );
        if !mismatches.is_empty() {
            std::process::exit(1);
        }
    }
}
