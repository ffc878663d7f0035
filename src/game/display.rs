use std::io::{self, Write};

use termion::{clear, cursor};

use crate::board::trace::TraceEvent;
use crate::board::{TILES_X, TILES_Y};
use crate::game::engine::Engine;

const TOP: &str = "┌──────┬──────┬──────┬──────┐\n";
const MIDDLE: &str = "├──────┼──────┼──────┼──────┤\n";
const BOTTOM: &str = "└──────┴──────┴──────┴──────┘\n";

const KEY_HELP: &str = "arrows/wasd move  z undo  x redo  h hint  p autoplay  n new  q quit";

/// How a cell changed in the last move.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Merged,
    Appeared,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::None => ' ',
            Mark::Merged => '*',
            Mark::Appeared => '+',
        }
    }
}

pub struct GameDisplay {
    buffer: String,
    /// Terminals in raw mode do not return the carriage on `\n`.
    raw: bool,
}

impl GameDisplay {
    pub fn new(raw: bool) -> Self {
        Self {
            buffer: String::with_capacity(2048),
            raw,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.buffer
            .push_str(&format!("{}{}", cursor::Goto(1, 1), clear::All));
    }

    /// Builds a complete frame for the current game state without printing it.
    pub fn compose(&mut self, engine: &Engine) {
        let board = engine.board();
        let mut marks = [Mark::None; TILES_X * TILES_Y];
        for event in engine.last_trace() {
            match *event {
                TraceEvent::Merged { to, .. } => marks[to] = Mark::Merged,
                TraceEvent::Appeared { cell, .. } => marks[cell] = Mark::Appeared,
                _ => {}
            }
        }

        self.buffer.push_str(TOP);
        for y in 0..TILES_Y {
            self.buffer.push('│');
            for x in 0..TILES_X {
                let cell = y * TILES_X + x;
                let tile = match board.displayed(cell) {
                    0 => String::new(),
                    value => value.to_string(),
                };
                self.buffer
                    .push_str(&format!("{:^5}{}│", tile, marks[cell].symbol()));
            }
            self.buffer.push('\n');
            if y + 1 < TILES_Y {
                self.buffer.push_str(MIDDLE);
            }
        }
        self.buffer.push_str(BOTTOM);

        self.buffer.push_str(&format!(
            "Score: {}   Undo: {}   Redo: {}\n",
            engine.score(),
            engine.history().undo_available(),
            engine.history().redo_available()
        ));

        if let Some(direction) = engine.last_move() {
            self.buffer.push_str(&format!(
                "Last move: {} {}\n",
                direction.to_arrow(),
                direction
            ));
        }

        if engine.finished() {
            self.buffer.push_str("Game over!\n");
        } else if engine.is_thinking() {
            self.buffer.push_str("Thinking...\n");
        }
        if engine.is_autoplaying() {
            self.buffer.push_str("Autoplay on\n");
        }

        self.buffer.push('\n');
        self.buffer.push_str(KEY_HELP);
        self.buffer.push('\n');
    }

    pub fn render(&mut self, engine: &Engine) -> io::Result<()> {
        self.clear();
        self.compose(engine);
        self.flush()
    }

    /// Appends a one-line message to the next frame.
    pub fn message(&mut self, message: &str) {
        self.buffer.push_str(message);
        self.buffer.push('\n');
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.raw {
            out.write_all(self.buffer.replace('\n', "\r\n").as_bytes())?;
        } else {
            out.write_all(self.buffer.as_bytes())?;
        }
        out.flush()
    }

    pub fn buffer(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::engine::EngineConfig;

    #[test]
    fn test_compose_shows_tiles_and_score() {
        let engine = Engine::with_config(EngineConfig {
            lookahead: 1,
            seed: Some(21),
        })
        .unwrap();
        let mut display = GameDisplay::new(false);
        display.compose(&engine);
        let frame = display.buffer();

        assert!(frame.starts_with(TOP));
        assert!(frame.contains("Score: 0"));
        assert!(frame.contains(KEY_HELP));
        // both starting tiles are marked as new
        assert_eq!(frame.matches('+').count(), 2);
        assert!(!frame.contains("Game over"));
    }
}
