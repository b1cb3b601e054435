use crate::ppu::tile::TileRow;

/* one OAM entry: Y, tile, attributes, X */
#[derive(Debug, Clone)]
pub struct SpriteInfo {
    /* NB: this is one less than the top of the sprite! see top() */
    y: u8,
    tile_index: u8,
    attrs: u8,
    pub(super) x: u8,
}

impl SpriteInfo {
    /* create a SpriteInfo from memory */
    pub(super) fn from_memory(src_slice: &[u8]) -> SpriteInfo {
        SpriteInfo {
            y: src_slice[0],
            tile_index: src_slice[1],
            attrs: src_slice[2],
            x: src_slice[3],
        }
    }

    pub(super) fn top(&self) -> u16 {
        self.y as u16 + 1
    }

    pub(super) fn covers_line(&self, line: u16, sprite_height: u16) -> bool {
        line >= self.top() && line - self.top() < sprite_height
    }

    /* palette entries 0x10-0x1f belong to sprites */
    pub(super) fn palette_base(&self) -> usize {
        0x10 + ((self.attrs & 0x3) as usize) * 4
    }

    pub(super) fn is_behind_background(&self) -> bool {
        self.attrs & 0x20 != 0
    }

    fn flip_horizontal(&self) -> bool {
        self.attrs & 0x40 != 0
    }

    fn flip_vertical(&self) -> bool {
        self.attrs & 0x80 != 0
    }

    /**
     * The pixels this sprite contributes to `line`, already flipped. 8x16 sprites take their
     * pattern table from bit 0 of the tile index and are drawn as an even/odd tile pair;
     * 8x8 sprites use the table selected by PPUCTRL bit 3.
     */
    pub(super) fn row_for_line(&self, pattern_table: &[u8], line: u16, ppu_ctrl: u8) -> TileRow {
        let tall = ppu_ctrl & 0x20 != 0;
        let height = if tall { 16 } else { 8 };
        let mut row = line - self.top();
        if self.flip_vertical() {
            row = height - 1 - row;
        }

        let (table, tile) = if tall {
            (
                (self.tile_index as u16 & 1) * 0x1000,
                (self.tile_index as u16 & 0xfe) + row / 8,
            )
        } else {
            (((ppu_ctrl as u16 >> 3) & 1) * 0x1000, self.tile_index as u16)
        };

        let tile_row = TileRow::fetch(pattern_table, table, tile, row % 8);
        if self.flip_horizontal() {
            tile_row.flipped()
        } else {
            tile_row
        }
    }
}
