mod cli;

use cli::commands::Command;
use structopt::StructOpt;

fn main() {
    env_logger::init();

    #[cfg(feature = "instrumentation")]
    tiles::instrumentation::init_tracing();

    cli::Tiles::from_args().execute();

    #[cfg(feature = "instrumentation")]
    tiles::instrumentation::print_timing_statistics();
}
