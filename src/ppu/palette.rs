use crate::bus::Peripheral;
use crate::ppu::PALETTE_SIZE;

/* the 64 colors the video chip can produce, as RGB */
#[rustfmt::skip]
const MASTER_PALETTE: [(u8, u8, u8); 64] = [
    (84, 84, 84), (0, 30, 116), (8, 16, 144), (48, 0, 136),
    (68, 0, 100), (92, 0, 48), (84, 4, 0), (60, 24, 0),
    (32, 42, 0), (8, 58, 0), (0, 64, 0), (0, 60, 0),
    (0, 50, 60), (0, 0, 0), (0, 0, 0), (0, 0, 0),
    (152, 150, 152), (8, 76, 196), (48, 50, 236), (92, 30, 228),
    (136, 20, 176), (160, 20, 100), (152, 34, 32), (120, 60, 0),
    (84, 90, 0), (40, 114, 0), (8, 124, 0), (0, 118, 40),
    (0, 102, 120), (0, 0, 0), (0, 0, 0), (0, 0, 0),
    (236, 238, 236), (76, 154, 236), (120, 124, 236), (176, 98, 236),
    (228, 84, 236), (236, 88, 180), (236, 106, 100), (212, 136, 32),
    (160, 170, 0), (116, 196, 0), (76, 208, 32), (56, 204, 108),
    (56, 180, 204), (60, 60, 60), (0, 0, 0), (0, 0, 0),
    (236, 238, 236), (168, 204, 236), (188, 188, 236), (212, 178, 236),
    (236, 174, 236), (236, 174, 212), (236, 180, 176), (228, 196, 144),
    (204, 210, 120), (180, 222, 120), (168, 226, 144), (152, 226, 180),
    (160, 214, 228), (160, 162, 160), (0, 0, 0), (0, 0, 0),
];

/* RGBA for a palette byte; only the low six bits select a color */
pub fn hue_lookup(index: u8) -> [u8; 4] {
    let (r, g, b) = MASTER_PALETTE[(index & 0x3f) as usize];
    [r, g, b, 0xff]
}

/**
 * The 32 bytes of palette memory at 0x3f00-0x3fff on the video bus, repeated every 32 bytes.
 * Entries 0x10/0x14/0x18/0x1c are the same cells as 0x00/0x04/0x08/0x0c: the "transparent"
 * slot of each sprite palette is the background color.
 */
pub struct PaletteRam {
    data: [u8; PALETTE_SIZE],
}

impl PaletteRam {
    pub fn new() -> PaletteRam {
        PaletteRam {
            data: [0; PALETTE_SIZE],
        }
    }

    fn index(address: u16) -> usize {
        let index = (address & 0x1f) as usize;
        if index & 0x13 == 0x10 {
            index - 0x10
        } else {
            index
        }
    }

    /* entry 0-31, aliasing applied */
    pub fn entry(&self, index: usize) -> u8 {
        self.data[Self::index(index as u16)]
    }

    pub fn bytes(&self) -> &[u8; PALETTE_SIZE] {
        &self.data
    }

    pub fn load(&mut self, data: &[u8; PALETTE_SIZE]) {
        self.data = *data;
    }
}

impl Peripheral for PaletteRam {
    fn read(&mut self, address: u16) -> u8 {
        self.data[Self::index(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.data[Self::index(address)] = value;
    }
}
