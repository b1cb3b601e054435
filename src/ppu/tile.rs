/* each tile is 16 bytes: eight rows of the low bitplane, then eight rows of the high one */
pub const TILE_BYTES: u16 = 16;

/**
 * One 8-pixel row of a tile, both bitplanes. Bit 7 of each plane is the leftmost pixel.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRow {
    low: u8,
    high: u8,
}

impl TileRow {
    /* `pattern_table` is the 8KB at 0x0000-0x1fff of the video bus; `table` is 0x0000 or 0x1000 */
    pub fn fetch(pattern_table: &[u8], table: u16, tile_index: u16, row: u16) -> TileRow {
        let address = (table + tile_index * TILE_BYTES + row) as usize;
        let mask = pattern_table.len() - 1;
        TileRow {
            low: pattern_table[address & mask],
            high: pattern_table[(address + 8) & mask],
        }
    }

    /* mirror the row left-to-right */
    pub fn flipped(self) -> TileRow {
        TileRow {
            low: self.low.reverse_bits(),
            high: self.high.reverse_bits(),
        }
    }

    /* 0-3 for column 0 (left) through 7; 0 is transparent */
    pub fn pixel(&self, column: u8) -> u8 {
        let shift = 7 - column;
        ((self.low >> shift) & 1) | (((self.high >> shift) & 1) << 1)
    }
}

pub fn pixel_to_index(width: usize, x: usize, y: usize) -> usize {
    4 * (width * y + x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_row() {
        let mut chr = vec![0u8; 0x2000];
        /* tile 1, row 2 of the second table */
        chr[0x1000 + 16 + 2] = 0b1000_0001;
        chr[0x1000 + 16 + 2 + 8] = 0b1100_0000;

        let row = TileRow::fetch(&chr, 0x1000, 1, 2);
        assert_eq!(row.pixel(0), 3);
        assert_eq!(row.pixel(1), 2);
        assert_eq!(row.pixel(2), 0);
        assert_eq!(row.pixel(7), 1);

        let flipped = row.flipped();
        assert_eq!(flipped.pixel(0), 1);
        assert_eq!(flipped.pixel(6), 2);
        assert_eq!(flipped.pixel(7), 3);
    }
}
