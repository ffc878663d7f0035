use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::BoardError;
use super::{displayed_to_power, key, Board, NUM_TILES, TILES_X, TILES_Y};

static PACKED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:0[xX])?([0-9a-fA-F]{16})$").expect("valid regex"));
static TILE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,/|]+").expect("valid regex"));

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "┌──────┬──────┬──────┬──────┐")?;
        for y in 0..TILES_Y {
            write!(f, "│")?;
            for x in 0..TILES_X {
                match self.displayed(y * TILES_X + x) {
                    0 => write!(f, "      │")?,
                    value => write!(f, "{:^6}│", value)?,
                }
            }
            writeln!(f)?;
            if y + 1 < TILES_Y {
                writeln!(f, "├──────┼──────┼──────┼──────┤")?;
            }
        }
        write!(f, "└──────┴──────┴──────┴──────┘")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Board({:#018x})", self.key())
    }
}

/// Accepts either a packed key (`0x7100630035102200`) or 16 displayed values
/// separated by whitespace, commas or slashes, with `.` or `0` for empty cells.
impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(caps) = PACKED_KEY.captures(trimmed) {
            let packed = u64::from_str_radix(&caps[1], 16).map_err(|_| {
                BoardError::InvalidTileValue {
                    input: trimmed.to_string(),
                }
            })?;
            return Ok(key::unpack(packed));
        }

        let tokens: Vec<&str> = TILE_SEPARATOR
            .split(trimmed)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() != NUM_TILES {
            return Err(BoardError::WrongTileCount {
                count: tokens.len(),
            });
        }

        let mut cells = [0u8; NUM_TILES];
        for (cell, token) in cells.iter_mut().zip(tokens) {
            let value = match token {
                "." | "_" => 0,
                _ => token.parse::<u32>().map_err(|_| BoardError::InvalidTileValue {
                    input: token.to_string(),
                })?,
            };
            *cell = displayed_to_power(value)?;
        }
        Ok(Board { cells })
    }
}

/// Builds a board from 16 displayed tile values, row by row, `0` for empty.
///
/// ```
/// use tiles::tile_position;
/// let board = tile_position![
///     2, 0, 0, 0,
///     0, 4, 0, 0,
///     0, 0, 8, 0,
///     0, 0, 0, 16,
/// ];
/// assert_eq!(board.count_free(), 12);
/// ```
#[macro_export]
macro_rules! tile_position {
    ($($value:expr),* $(,)?) => {
        $crate::board::Board::from_displayed([$($value),*])
    };
}
