pub mod board;
pub mod evaluate;
pub mod game;
pub mod history;
pub mod input_handler;
#[cfg(feature = "instrumentation")]
pub mod instrumentation;
pub mod prelude;
pub mod searcher;
pub mod worker;
