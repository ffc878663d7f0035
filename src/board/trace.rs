//! Per-move event log consumed by the presentation layer.
//!
//! Recording is optional and never changes the outcome of a move: every board
//! operation is generic over a `TraceSink`, and `()` is the sink that drops
//! everything.

/// A single visual event. Cell indices are row-major, values are exponents.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TraceEvent {
    /// A tile moved (or stayed put, when `from == to`).
    Slid { from: usize, to: usize, value: u8 },
    /// Two tiles of `value` combined into one tile of `value + 1` at `to`.
    Merged {
        from0: usize,
        from1: usize,
        to: usize,
        value: u8,
    },
    Appeared { cell: usize, value: u8 },
    Cleared { cell: usize },
}

impl TraceEvent {
    /// True if the event changed where a tile is drawn.
    pub fn is_visible_change(&self) -> bool {
        match *self {
            TraceEvent::Slid { from, to, .. } => from != to,
            TraceEvent::Merged { .. } | TraceEvent::Appeared { .. } => true,
            TraceEvent::Cleared { .. } => false,
        }
    }
}

pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

impl TraceSink for () {
    #[inline(always)]
    fn record(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn record(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
