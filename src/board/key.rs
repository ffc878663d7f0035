//! Packing a board into the 64-bit key used by the transposition cache.
//!
//! Cell 0 occupies the most significant nibble and cell 15 the least
//! significant one, so the hex form of a key reads like the board row by row.

use super::{Board, MAX_POWER, NUM_TILES};

pub type BoardKey = u64;

pub fn pack(board: &Board) -> BoardKey {
    board.cells().iter().fold(0u64, |key, &value| {
        assert!(value <= MAX_POWER, "tile exponent {} does not fit in 4 bits", value);
        (key << 4) | value as u64
    })
}

pub fn unpack(key: BoardKey) -> Board {
    let mut cells = [0u8; NUM_TILES];
    let mut k = key;
    for cell in cells.iter_mut().rev() {
        *cell = (k & 0x0F) as u8;
        k >>= 4;
    }
    Board::from_cells(cells)
}

impl Board {
    pub fn key(&self) -> BoardKey {
        pack(self)
    }

    pub fn from_key(key: BoardKey) -> Self {
        unpack(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile_position;
    use common::XorShift128;
    use rand::Rng;

    #[test]
    fn test_pack_orders_cells_most_significant_first() {
        let board = tile_position![
            2, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 4,
        ];
        assert_eq!(pack(&board), 0x1000_0000_0000_0002);
    }

    #[test]
    fn test_empty_board_packs_to_zero() {
        assert_eq!(pack(&Board::new()), 0);
    }

    #[test]
    fn test_known_key_round_trip() {
        let board = unpack(0x7100_6300_3510_2200);
        assert_eq!(board.get(0), 7);
        assert_eq!(board.get(1), 1);
        assert_eq!(board.get(4), 6);
        assert_eq!(board.get(15), 0);
        assert_eq!(pack(&board), 0x7100_6300_3510_2200);
    }

    #[test]
    fn test_random_boards_round_trip() {
        let mut rng = XorShift128::new(2048);
        for _ in 0..200 {
            let mut cells = [0u8; NUM_TILES];
            for cell in cells.iter_mut() {
                *cell = rng.gen_range(0..=MAX_POWER);
            }
            let board = Board::from_cells(cells);
            assert_eq!(unpack(pack(&board)), board);
        }
    }
}
