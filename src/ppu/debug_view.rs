use crate::ppu::palette::hue_lookup;
use crate::ppu::tile::{pixel_to_index, TileRow};
use crate::ppu::PPU;

pub const PATTERN_VIEW_WIDTH: usize = 256;
pub const PATTERN_VIEW_HEIGHT: usize = 128;
pub const NAMETABLE_VIEW_WIDTH: usize = 512;
pub const NAMETABLE_VIEW_HEIGHT: usize = 480;

impl PPU {
    /**
     * Both pattern tables side by side, 16x16 tiles each, colored with background palette
     * `palette_select`. RGBA, PATTERN_VIEW_WIDTH x PATTERN_VIEW_HEIGHT.
     */
    pub fn pattern_table_view(&self, palette_select: usize) -> Vec<u8> {
        let mut out = vec![0; PATTERN_VIEW_WIDTH * PATTERN_VIEW_HEIGHT * 4];
        let pattern_table = self.pattern_table();
        let palette = self.palette();

        for table in 0..2u16 {
            for tile in 0..256u16 {
                let origin_x = table as usize * 128 + (tile as usize % 16) * 8;
                let origin_y = (tile as usize / 16) * 8;
                for row in 0..8u16 {
                    let tile_row = TileRow::fetch(pattern_table.bytes(), table * 0x1000, tile, row);
                    for column in 0..8u8 {
                        let value = tile_row.pixel(column) as usize;
                        let color = palette.entry(if value == 0 { 0 } else { palette_select * 4 + value });
                        let index = pixel_to_index(PATTERN_VIEW_WIDTH, origin_x + column as usize, origin_y + row as usize);
                        out[index..index + 4].copy_from_slice(&hue_lookup(color));
                    }
                }
            }
        }
        out
    }

    /**
     * The four logical nametables laid out as the 512x480 plane the background scrolls over,
     * without scrolling or sprites. Mirrored quadrants show the same data.
     */
    pub fn nametable_view(&self) -> Vec<u8> {
        let mut out = vec![0; NAMETABLE_VIEW_WIDTH * NAMETABLE_VIEW_HEIGHT * 4];
        let pattern_table = self.pattern_table();
        let nametable = self.nametable();
        let palette = self.palette();
        let bg_table = if self.ppu_ctrl & 0x10 != 0 { 0x1000 } else { 0 };

        for quadrant in 0..4u16 {
            let base = 0x2000 + quadrant * 0x400;
            let (origin_x, origin_y) = ((quadrant as usize % 2) * 256, (quadrant as usize / 2) * 240);
            for tile_row in 0..30u16 {
                for tile_column in 0..32u16 {
                    let name_address = self.fold_address(base + tile_row * 32 + tile_column);
                    let tile_index = nametable.bytes()[(name_address - 0x2000) as usize];
                    let attr_address = self.fold_address(base + 0x3c0 + (tile_row / 4) * 8 + tile_column / 4);
                    let attribute = nametable.bytes()[(attr_address - 0x2000) as usize];
                    let shift = ((tile_row / 2) % 2) * 4 + ((tile_column / 2) % 2) * 2;
                    let palette_select = ((attribute >> shift) & 0x3) as usize;

                    for row in 0..8u16 {
                        let tile_row_bits = TileRow::fetch(pattern_table.bytes(), bg_table, tile_index as u16, row);
                        for column in 0..8u8 {
                            let value = tile_row_bits.pixel(column) as usize;
                            let color = palette.entry(if value == 0 { 0 } else { palette_select * 4 + value });
                            let x = origin_x + tile_column as usize * 8 + column as usize;
                            let y = origin_y + tile_row as usize * 8 + row as usize;
                            let index = pixel_to_index(NAMETABLE_VIEW_WIDTH, x, y);
                            out[index..index + 4].copy_from_slice(&hue_lookup(color));
                        }
                    }
                }
            }
        }
        out
    }
}
