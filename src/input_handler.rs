//! Player command parsing, from typed lines or from raw key presses.

use std::io::{self, BufRead};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use termion::event::Key;
use termion::input::{Keys, TermRead};
use thiserror::Error;

use crate::board::Direction;

static UNDO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:z|undo)$").expect("UNDO_RE regex should be valid"));
static REDO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:x|redo)$").expect("REDO_RE regex should be valid"));
static NEW_GAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:n|new(?: game)?)$").expect("NEW_GAME_RE regex should be valid"));
static HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:h|hint)$").expect("HINT_RE regex should be valid"));
static AUTOPLAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:p|auto(?:play)?)$").expect("AUTOPLAY_RE regex should be valid"));
static QUIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:q|quit|exit)$").expect("QUIT_RE regex should be valid"));
/// Arrow keys typed into a line-buffered terminal arrive as ANSI escapes.
static ARROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\x1b\[([ABCD])$").expect("ARROW_RE regex should be valid"));

#[derive(Error, Debug)]
pub enum InputError {
    #[error("io error: {error:?}")]
    IOError { error: String },
    #[error("invalid input: {input:?}")]
    InvalidInput { input: String },
}

impl From<io::Error> for InputError {
    fn from(error: io::Error) -> Self {
        InputError::IOError {
            error: error.to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerInput {
    Move(Direction),
    Undo,
    Redo,
    NewGame,
    /// Let the computer make the next move.
    Hint,
    ToggleAutoplay,
    Quit,
}

impl PlayerInput {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Left => Some(PlayerInput::Move(Direction::Left)),
            Key::Right => Some(PlayerInput::Move(Direction::Right)),
            Key::Up => Some(PlayerInput::Move(Direction::Up)),
            Key::Down => Some(PlayerInput::Move(Direction::Down)),
            Key::Esc | Key::Ctrl('c') => Some(PlayerInput::Quit),
            Key::Char(c) => c.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for PlayerInput {
    type Err = InputError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Some(caps) = ARROW_RE.captures(trimmed) {
            let direction = match &caps[1] {
                "A" => Direction::Up,
                "B" => Direction::Down,
                "C" => Direction::Right,
                _ => Direction::Left,
            };
            return Ok(PlayerInput::Move(direction));
        }

        let command = trimmed.to_lowercase();
        let commands: [(&Lazy<Regex>, PlayerInput); 6] = [
            (&UNDO_RE, PlayerInput::Undo),
            (&REDO_RE, PlayerInput::Redo),
            (&NEW_GAME_RE, PlayerInput::NewGame),
            (&HINT_RE, PlayerInput::Hint),
            (&AUTOPLAY_RE, PlayerInput::ToggleAutoplay),
            (&QUIT_RE, PlayerInput::Quit),
        ];
        for (re, parsed) in commands.iter() {
            if re.is_match(&command) {
                return Ok(*parsed);
            }
        }

        command
            .parse::<Direction>()
            .map(PlayerInput::Move)
            .map_err(|_| InputError::InvalidInput {
                input: trimmed.to_string(),
            })
    }
}

/// Where the game loop gets player commands from.
pub trait InputSource {
    /// The next command, or `None` if nothing is pending.
    fn next_input(&mut self) -> Result<Option<PlayerInput>, InputError>;

    /// True if `next_input` blocks until the player types something, in which
    /// case the loop must not wait on it while the computer is playing.
    fn blocks(&self) -> bool;
}

/// Non-blocking key presses from a terminal in raw mode.
pub struct KeyboardInput {
    keys: Keys<termion::AsyncReader>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self {
            keys: termion::async_stdin().keys(),
        }
    }
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for KeyboardInput {
    fn next_input(&mut self) -> Result<Option<PlayerInput>, InputError> {
        for key in &mut self.keys {
            if let Some(input) = PlayerInput::from_key(key?) {
                return Ok(Some(input));
            }
        }
        Ok(None)
    }

    fn blocks(&self) -> bool {
        false
    }
}

/// One command per line, for piped or scripted play. End of input quits.
pub struct LineInput<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineInput<io::BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn next_input(&mut self) -> Result<Option<PlayerInput>, InputError> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(Some(PlayerInput::Quit));
            }
            if !line.trim().is_empty() {
                return line.parse().map(Some);
            }
        }
    }

    fn blocks(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("z".parse::<PlayerInput>().unwrap(), PlayerInput::Undo);
        assert_eq!("Redo".parse::<PlayerInput>().unwrap(), PlayerInput::Redo);
        assert_eq!("new game".parse::<PlayerInput>().unwrap(), PlayerInput::NewGame);
        assert_eq!(" h ".parse::<PlayerInput>().unwrap(), PlayerInput::Hint);
        assert_eq!("auto".parse::<PlayerInput>().unwrap(), PlayerInput::ToggleAutoplay);
        assert_eq!("q".parse::<PlayerInput>().unwrap(), PlayerInput::Quit);
    }

    #[test]
    fn test_parse_directions() {
        assert_eq!(
            "left".parse::<PlayerInput>().unwrap(),
            PlayerInput::Move(Direction::Left)
        );
        assert_eq!(
            "w".parse::<PlayerInput>().unwrap(),
            PlayerInput::Move(Direction::Up)
        );
        assert_eq!(
            "\x1b[B".parse::<PlayerInput>().unwrap(),
            PlayerInput::Move(Direction::Down)
        );
        assert_eq!(
            "\x1b[C".parse::<PlayerInput>().unwrap(),
            PlayerInput::Move(Direction::Right)
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            "diagonal".parse::<PlayerInput>(),
            Err(InputError::InvalidInput { .. })
        ));
        assert!(matches!(
            "zz".parse::<PlayerInput>(),
            Err(InputError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_keys() {
        assert_eq!(
            PlayerInput::from_key(Key::Up),
            Some(PlayerInput::Move(Direction::Up))
        );
        assert_eq!(PlayerInput::from_key(Key::Char('p')), Some(PlayerInput::ToggleAutoplay));
        assert_eq!(PlayerInput::from_key(Key::Esc), Some(PlayerInput::Quit));
        assert_eq!(PlayerInput::from_key(Key::Char('?')), None);
    }

    #[test]
    fn test_line_input_skips_blank_lines_and_quits_at_end() {
        let mut input = LineInput::new("\nleft\n\n  x\n".as_bytes());
        assert_eq!(
            input.next_input().unwrap(),
            Some(PlayerInput::Move(Direction::Left))
        );
        assert_eq!(input.next_input().unwrap(), Some(PlayerInput::Redo));
        assert_eq!(input.next_input().unwrap(), Some(PlayerInput::Quit));
    }
}
