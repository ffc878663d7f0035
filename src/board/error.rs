use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("expected 16 tiles, found {count}")]
    WrongTileCount { count: usize },
    #[error("`{input}` is not a tile value (expected 0, . or a power of two up to 32768)")]
    InvalidTileValue { input: String },
    #[error("tile exponent {power} exceeds the 4-bit limit")]
    PowerTooLarge { power: u8 },
    #[error("`{input}` is not a direction")]
    InvalidDirection { input: String },
}
