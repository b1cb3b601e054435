use crate::ppu::palette::hue_lookup;
use crate::ppu::sprite_info::SpriteInfo;
use crate::ppu::tile::{pixel_to_index, TileRow};
use crate::ppu::{PPU, SCREEN_HEIGHT, SCREEN_WIDTH};

/* one full screen of tiles plus the one scrolled in on the right */
const TILE_COLUMNS: usize = 33;

impl PPU {
    /**
     * Composes the whole frame from the nametables, attributes, pattern table and OAM, honoring
     * the control and horizontal-scroll value each scanline was drawn with.
     */
    pub fn update_image(&mut self) {
        self.fill_shadows();

        let mut frame = std::mem::take(&mut self.frame);
        for line in 0..SCREEN_HEIGHT {
            self.render_line(line, &mut frame);
        }
        self.frame = frame;
    }

    fn render_line(&self, line: usize, frame: &mut [u8]) {
        let ctrl = self.ctrl_shadow[line];
        let mask = self.ppu_mask;
        let pattern_table = self.pattern_table();
        let palette = self.palette();

        let backdrop = palette.entry(0);
        let mut colors = [backdrop; SCREEN_WIDTH];
        let mut bg_opaque = [false; SCREEN_WIDTH];

        if mask & 0x08 != 0 {
            let nametable = self.nametable();
            let names = nametable.bytes();

            /* scroll over the 512x480 plane of four nametables */
            let scroll_x = self.scroll_x_shadow[line] as usize + if ctrl & 0x01 != 0 { 256 } else { 0 };
            let scroll_y = self.scroll_y() as usize + if ctrl & 0x02 != 0 { 240 } else { 0 };
            let plane_y = (line + scroll_y) % 480;
            let (nametable_y, y) = (plane_y / 240, plane_y % 240);
            let (tile_row, fine_y) = (y / 8, y % 8);
            let fine_x = scroll_x % 8;
            let bg_table = if ctrl & 0x10 != 0 { 0x1000 } else { 0 };

            for column in 0..TILE_COLUMNS {
                let tile_x = (scroll_x / 8 + column) % 64;
                let (nametable_x, tile_column) = (tile_x / 32, tile_x % 32);
                let base = 0x2000 + (nametable_y * 0x800 + nametable_x * 0x400) as u16;

                let name_address = self.fold_address(base + (tile_row * 32 + tile_column) as u16);
                let tile_index = names[(name_address - 0x2000) as usize];

                /* one attribute byte per 4x4 tiles, two bits per 2x2 */
                let attr_address = self.fold_address(base + 0x3c0 + ((tile_row / 4) * 8 + tile_column / 4) as u16);
                let attribute = names[(attr_address - 0x2000) as usize];
                let shift = ((tile_row / 2) % 2) * 4 + ((tile_column / 2) % 2) * 2;
                let palette_select = ((attribute >> shift) & 0x3) as usize;

                let row = TileRow::fetch(pattern_table.bytes(), bg_table, tile_index as u16, fine_y as u16);
                for pixel in 0..8u8 {
                    /* columns partly scrolled off either edge are clipped */
                    let screen_x = (column * 8 + pixel as usize) as isize - fine_x as isize;
                    if !(0..SCREEN_WIDTH as isize).contains(&screen_x) {
                        continue;
                    }
                    let screen_x = screen_x as usize;
                    if screen_x < 8 && mask & 0x02 == 0 {
                        continue;
                    }
                    let value = row.pixel(pixel);
                    if value != 0 {
                        colors[screen_x] = palette.entry(palette_select * 4 + value as usize);
                        bg_opaque[screen_x] = true;
                    }
                }
            }
        }

        if mask & 0x10 != 0 {
            let height = if ctrl & 0x20 != 0 { 16 } else { 8 };
            /* highest index first, so sprite 0 ends up on top */
            for sprite_data in self.oam.chunks_exact(4).rev() {
                let sprite = SpriteInfo::from_memory(sprite_data);
                if !sprite.covers_line(line as u16, height) {
                    continue;
                }
                let row = sprite.row_for_line(pattern_table.bytes(), line as u16, ctrl);
                for pixel in 0..8u8 {
                    let screen_x = sprite.x as usize + pixel as usize;
                    if screen_x >= SCREEN_WIDTH {
                        break;
                    }
                    let value = row.pixel(pixel);
                    if value == 0
                        || (screen_x < 8 && mask & 0x04 == 0)
                        || (sprite.is_behind_background() && bg_opaque[screen_x])
                    {
                        continue;
                    }
                    colors[screen_x] = palette.entry(sprite.palette_base() + value as usize);
                }
            }
        }

        for (x, color) in colors.iter().enumerate() {
            let color = if mask & 0x01 != 0 { color & 0x30 } else { *color };
            let index = pixel_to_index(SCREEN_WIDTH, x, line);
            frame[index..index + 4].copy_from_slice(&hue_lookup(color));
        }
    }
}
