//! Common types re-exported for convenience.

pub use crate::board::trace::{TraceEvent, TraceSink};
pub use crate::board::{Board, Direction};
pub use crate::evaluate::{Evaluator, FreeCells, Monotonicity};
pub use crate::game::engine::{Engine, EngineConfig};
pub use crate::history::History;
pub use crate::searcher::{Searcher, Strategy};
pub use crate::worker::Worker;
pub use common::XorShift128;
