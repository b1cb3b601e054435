use crate::bus::{Bus, Peripheral};
use crate::cpu::InterruptSink;
use crate::memory::Memory;
use crate::ppu::palette::PaletteRam;
use crate::ppu::sprite_info::SpriteInfo;
use crate::ppu::{
    PPURegister, NAMETABLE_SIZE, OAM_SIZE, PALETTE_SIZE, PATTERN_TABLE_SIZE,
    PRERENDER_SCANLINE, SCANLINES, SCREEN_HEIGHT, VBLANK_SCANLINE, WRITE_BUFFER_SIZE,
};
use bincode::{Decode, Encode};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

/* most sprites the hardware shows on one line */
const SPRITES_PER_LINE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal, /* 0x2000 = 0x2400 and 0x2800 = 0x2c00 (vertical scrolling games) */
    Vertical,   /* 0x2000 = 0x2800 and 0x2400 = 0x2c00 (horizontal scrolling games) */
}

impl Mirroring {
    /* (vertical-mirror offset, horizontal-mirror offset) */
    pub fn offsets(&self) -> (u16, u16) {
        match self {
            Mirroring::Horizontal => (0x400, 0x400),
            Mirroring::Vertical => (0x800, 0),
        }
    }
}

pub struct PPU {
    bus: Bus, /* pattern table, nametables and palette */
    pattern_table: Rc<RefCell<Memory>>,
    nametable: Rc<RefCell<Memory>>,
    palette: Rc<RefCell<PaletteRam>>,
    interrupts: Box<dyn InterruptSink>,

    pub(super) ppu_ctrl: u8,
    pub(super) ppu_mask: u8,
    pub(super) ppu_status: u8,
    pub(super) oam: [u8; OAM_SIZE],
    pub(super) oam_addr: u8,

    vram_addr: u16,
    addr_latch_low: bool, /* next PPUADDR write is the low byte */
    read_buffer: u8,
    scroll_y: u8,
    scroll_latch_y: bool, /* next PPUSCROLL write is the vertical scroll */

    /* register values in effect at the start of each scanline, so mid-frame writes only affect
     * the lines after them. Entries past last_valid_* are filled in lazily. */
    pub(super) ctrl_shadow: [u8; SCANLINES],
    pub(super) scroll_x_shadow: [u8; SCANLINES],
    last_valid_ctrl_scanline: u16,
    last_valid_scroll_scanline: u16,

    scanline: u16,
    vertical_mirror_offset: u16,
    horizontal_mirror_offset: u16,

    pub(super) frame: Vec<u8>,
}

/* everything needed to resume video, in snapshot order */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct PpuState {
    pub nametable: [u8; NAMETABLE_SIZE],
    pub ctrl_shadow: [u8; SCANLINES],
    pub ppu_ctrl: u8,
    pub ppu_mask: u8,
    pub ppu_status: u8,
    pub vertical_mirror_offset: u16,
    pub horizontal_mirror_offset: u16,
    pub last_valid_ctrl_scanline: u16,
    pub last_valid_scroll_scanline: u16,
    pub addr_latch_low: bool,
    pub oam_addr: u8,
    pub oam: [u8; OAM_SIZE],
    pub palette: [u8; PALETTE_SIZE],
    pub read_buffer: u8,
    pub scanline: u16,
    pub scroll_x_shadow: [u8; SCANLINES],
    pub vram_addr: u16,
    pub scroll_latch_y: bool,
    pub scroll_y: u8,
    pub pattern_table: [u8; PATTERN_TABLE_SIZE],
}

impl PPU {
    /**
     * `pattern_table` is whatever answers 0x0000-0x1fff on the video bus: the cartridge's
     * graphics ROM, or 8KB of RAM when it has none.
     */
    pub fn new(pattern_table: Memory, mirroring: Mirroring, interrupts: Box<dyn InterruptSink>) -> PPU {
        let pattern_table = Rc::new(RefCell::new(pattern_table));
        let nametable = Rc::new(RefCell::new(Memory::new(0x2000, NAMETABLE_SIZE)));
        let palette = Rc::new(RefCell::new(PaletteRam::new()));

        let bus = Bus::new("video");
        bus.attach_peripheral(0x0000, 0x1fff, pattern_table.clone());
        bus.attach_peripheral(0x2000, 0x2fff, nametable.clone());
        bus.attach_peripheral(0x3f00, 0x3fff, palette.clone());

        let (vertical_mirror_offset, horizontal_mirror_offset) = mirroring.offsets();

        PPU {
            bus,
            pattern_table,
            nametable,
            palette,
            interrupts,
            ppu_ctrl: 0,
            ppu_mask: 0,
            ppu_status: 0,
            oam: [0; OAM_SIZE],
            oam_addr: 0,
            vram_addr: 0,
            addr_latch_low: false,
            read_buffer: 0,
            scroll_y: 0,
            scroll_latch_y: false,
            ctrl_shadow: [0; SCANLINES],
            scroll_x_shadow: [0; SCANLINES],
            last_valid_ctrl_scanline: 0,
            last_valid_scroll_scanline: 0,
            scanline: 0,
            vertical_mirror_offset,
            horizontal_mirror_offset,
            frame: vec![0; WRITE_BUFFER_SIZE],
        }
    }

    pub fn reset(&mut self) {
        self.ppu_ctrl = 0;
        self.ppu_mask = 0;
        self.addr_latch_low = false;
        self.scroll_latch_y = false;
        self.read_buffer = 0;
        self.ctrl_shadow[self.last_valid_ctrl_scanline as usize] = 0;
    }

    /* the last composed image, 256x240 RGBA */
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    #[cfg(test)]
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    #[cfg(test)]
    pub fn vram_addr(&self) -> u16 {
        self.vram_addr
    }

    /* reads through the video bus, after mirroring */
    pub fn read_vram(&self, address: u16) -> u8 {
        self.bus.read(self.fold_address(address))
    }

    pub fn write_vram(&self, address: u16, value: u8) {
        self.bus.write(self.fold_address(address), value);
    }

    /**
     * Maps a video bus address onto the memory that backs it: 14 bits, 0x3000-0x3eff onto
     * 0x2000-0x2eff, then the four logical nametables onto the two physical ones.
     */
    pub fn fold_address(&self, address: u16) -> u16 {
        let mut address = address & 0x3fff;
        if (0x3000..0x3f00).contains(&address) {
            address -= 0x1000;
        }
        if (0x2000..0x3000).contains(&address) {
            let mut folded = 0x2000 + (address & 0x3ff);
            if address & 0x800 != 0 {
                folded += 0x800 - self.vertical_mirror_offset;
            }
            if address & 0x400 != 0 {
                folded += 0x400 - self.horizontal_mirror_offset;
            }
            address = folded;
        }
        address
    }

    /* the OAM DMA lands here: 256 bytes starting at the OAM cursor */
    pub fn write_oam_block(&mut self, data: &[u8]) {
        for value in data {
            self.oam[self.oam_addr as usize] = *value;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }

    /**
     * Advances one scanline. Line 241 starts vblank, composes the frame and raises the NMI if
     * enabled; line 261 ends vblank; after 261 the counter wraps and the shadows start over.
     */
    pub fn step_scanline(&mut self) {
        self.scanline += 1;

        if self.scanline == VBLANK_SCANLINE {
            self.ppu_status |= 0x80;
            self.update_image();
            if self.ppu_ctrl & 0x80 != 0 {
                self.interrupts.request_nmi();
            }
        } else if self.scanline == PRERENDER_SCANLINE {
            /* vblank, sprite 0 hit, overflow */
            self.ppu_status &= !0xe0;
        } else if self.scanline as usize >= SCANLINES {
            self.scanline = 0;
            self.ctrl_shadow[0] = self.ctrl_shadow[self.last_valid_ctrl_scanline as usize];
            self.scroll_x_shadow[0] = self.scroll_x_shadow[self.last_valid_scroll_scanline as usize];
            self.last_valid_ctrl_scanline = 0;
            self.last_valid_scroll_scanline = 0;
        }

        if (self.scanline as usize) < SCREEN_HEIGHT {
            self.evaluate_sprites();
        }
    }

    /* sprite 0 hit (by Y only) and overflow for the current line */
    fn evaluate_sprites(&mut self) {
        if self.ppu_mask & 0x18 == 0 {
            return;
        }

        let sprite_zero = SpriteInfo::from_memory(&self.oam[0..4]);
        if self.scanline == sprite_zero.top() {
            self.ppu_status |= 0x40;
        }

        let height = self.sprite_height();
        let on_line = self
            .oam
            .chunks_exact(4)
            .map(SpriteInfo::from_memory)
            .filter(|sprite| sprite.covers_line(self.scanline, height))
            .count();
        if on_line > SPRITES_PER_LINE {
            self.ppu_status |= 0x20;
        }
    }

    pub(super) fn sprite_height(&self) -> u16 {
        if self.ppu_ctrl & 0x20 != 0 {
            16
        } else {
            8
        }
    }

    fn increment_vram_addr(&mut self) {
        let increment = if self.ppu_ctrl & 0x04 != 0 { 32 } else { 1 };
        self.vram_addr = self.fold_address(self.vram_addr.wrapping_add(increment) & 0x3fff);
    }

    /* copy the last known value up to (not including) `scanline`, then record the new one there */
    fn record_shadow(shadow: &mut [u8; SCANLINES], last_valid: &mut u16, scanline: u16, value: u8) {
        let start = *last_valid as usize;
        let end = (scanline as usize).min(SCANLINES - 1);
        if end > start {
            let carried = shadow[start];
            shadow[start..end].fill(carried);
        }
        shadow[end] = value;
        *last_valid = end as u16;
    }

    /* the rest of the frame keeps whatever was last written */
    pub(super) fn fill_shadows(&mut self) {
        let ctrl = self.ctrl_shadow[self.last_valid_ctrl_scanline as usize];
        self.ctrl_shadow[self.last_valid_ctrl_scanline as usize..].fill(ctrl);
        let scroll = self.scroll_x_shadow[self.last_valid_scroll_scanline as usize];
        self.scroll_x_shadow[self.last_valid_scroll_scanline as usize..].fill(scroll);
    }

    pub(super) fn scroll_y(&self) -> u8 {
        self.scroll_y
    }

    pub(super) fn pattern_table(&self) -> std::cell::Ref<'_, Memory> {
        self.pattern_table.borrow()
    }

    pub(super) fn nametable(&self) -> std::cell::Ref<'_, Memory> {
        self.nametable.borrow()
    }

    pub(super) fn palette(&self) -> std::cell::Ref<'_, PaletteRam> {
        self.palette.borrow()
    }

    pub fn state(&self) -> PpuState {
        let mut nametable = [0; NAMETABLE_SIZE];
        nametable.copy_from_slice(self.nametable.borrow().bytes());

        let mut pattern_table = [0; PATTERN_TABLE_SIZE];
        let pattern_bytes = self.pattern_table.borrow();
        let len = pattern_bytes.bytes().len().min(PATTERN_TABLE_SIZE);
        pattern_table[..len].copy_from_slice(&pattern_bytes.bytes()[..len]);

        PpuState {
            nametable,
            ctrl_shadow: self.ctrl_shadow,
            ppu_ctrl: self.ppu_ctrl,
            ppu_mask: self.ppu_mask,
            ppu_status: self.ppu_status,
            vertical_mirror_offset: self.vertical_mirror_offset,
            horizontal_mirror_offset: self.horizontal_mirror_offset,
            last_valid_ctrl_scanline: self.last_valid_ctrl_scanline,
            last_valid_scroll_scanline: self.last_valid_scroll_scanline,
            addr_latch_low: self.addr_latch_low,
            oam_addr: self.oam_addr,
            oam: self.oam,
            palette: *self.palette.borrow().bytes(),
            read_buffer: self.read_buffer,
            scanline: self.scanline,
            scroll_x_shadow: self.scroll_x_shadow,
            vram_addr: self.vram_addr,
            scroll_latch_y: self.scroll_latch_y,
            scroll_y: self.scroll_y,
            pattern_table,
        }
    }

    pub fn restore(&mut self, state: &PpuState) {
        self.nametable.borrow_mut().load(&state.nametable);
        self.ctrl_shadow = state.ctrl_shadow;
        self.ppu_ctrl = state.ppu_ctrl;
        self.ppu_mask = state.ppu_mask;
        self.ppu_status = state.ppu_status;
        self.vertical_mirror_offset = state.vertical_mirror_offset;
        self.horizontal_mirror_offset = state.horizontal_mirror_offset;
        /* indices are clamped so a hand-edited file can't index past the shadows */
        self.last_valid_ctrl_scanline = state.last_valid_ctrl_scanline.min(SCANLINES as u16 - 1);
        self.last_valid_scroll_scanline = state.last_valid_scroll_scanline.min(SCANLINES as u16 - 1);
        self.addr_latch_low = state.addr_latch_low;
        self.oam_addr = state.oam_addr;
        self.oam = state.oam;
        self.palette.borrow_mut().load(&state.palette);
        self.read_buffer = state.read_buffer;
        self.scanline = state.scanline.min(SCANLINES as u16 - 1);
        self.scroll_x_shadow = state.scroll_x_shadow;
        self.vram_addr = state.vram_addr & 0x3fff;
        self.scroll_latch_y = state.scroll_latch_y;
        self.scroll_y = state.scroll_y;
        /* graphics ROM is restored too; it came from the same image */
        self.pattern_table.borrow_mut().load(&state.pattern_table);
    }
}

impl Peripheral for PPU {
    fn read(&mut self, address: u16) -> u8 {
        match PPURegister::from_addr(address) {
            PPURegister::PPUSTATUS => {
                let status = self.ppu_status & 0xe0;
                self.ppu_status &= !0x80;
                self.addr_latch_low = false;
                self.scroll_latch_y = false;
                status
            }
            PPURegister::OAMDATA => self.oam[self.oam_addr as usize],
            PPURegister::PPUDATA => {
                let address = self.vram_addr;
                let value = if address >= 0x3f00 {
                    /* palette reads skip the buffer, which picks up the nametable underneath */
                    self.read_buffer = self.read_vram(address - 0x1000);
                    self.read_vram(address)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read_vram(address);
                    buffered
                };
                self.increment_vram_addr();
                value
            }
            register => {
                debug!("read from write-only {register:?}");
                0
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match PPURegister::from_addr(address) {
            PPURegister::PPUCTRL => {
                let old_ctrl = self.ppu_ctrl;
                Self::record_shadow(&mut self.ctrl_shadow, &mut self.last_valid_ctrl_scanline, self.scanline, value);
                self.ppu_ctrl = value;
                /* turning NMIs on during vblank fires one straight away */
                if self.ppu_status & 0x80 != 0 && old_ctrl & 0x80 == 0 && value & 0x80 != 0 {
                    self.interrupts.request_nmi();
                }
            }
            PPURegister::PPUMASK => self.ppu_mask = value,
            PPURegister::PPUSTATUS => warn!("write of 0x{value:02x} to PPUSTATUS ignored"),
            PPURegister::OAMADDR => self.oam_addr = value,
            PPURegister::OAMDATA => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            PPURegister::PPUSCROLL => {
                if self.scroll_latch_y {
                    self.scroll_y = value;
                } else {
                    Self::record_shadow(&mut self.scroll_x_shadow, &mut self.last_valid_scroll_scanline, self.scanline, value);
                }
                self.scroll_latch_y = !self.scroll_latch_y;
            }
            PPURegister::PPUADDR => {
                let address = if self.addr_latch_low {
                    self.vram_addr.wrapping_add(value as u16)
                } else {
                    ((value & 0x3f) as u16) << 8
                };
                self.vram_addr = self.fold_address(address);
                self.addr_latch_low = !self.addr_latch_low;
            }
            PPURegister::PPUDATA => {
                self.write_vram(self.vram_addr, value);
                self.increment_vram_addr();
            }
        }
    }
}
