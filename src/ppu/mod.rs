mod debug_view;
mod oam_dma;
mod palette;
#[allow(clippy::module_inception)]
mod ppu;
mod ppu_registers;
mod render;
mod sprite_info;
mod tile;

#[cfg(test)]
mod tests;

pub use debug_view::{NAMETABLE_VIEW_HEIGHT, NAMETABLE_VIEW_WIDTH, PATTERN_VIEW_HEIGHT, PATTERN_VIEW_WIDTH};
pub use oam_dma::{OamDma, DMA_STALL_CYCLES};
pub use palette::{hue_lookup, PaletteRam};
pub use ppu::{Mirroring, PpuState, PPU};
pub use ppu_registers::{PPURegister, OAMDMA_ADDRESS};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const WRITE_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

pub const SCANLINES: usize = 262;
pub const VBLANK_SCANLINE: u16 = 241;
pub const PRERENDER_SCANLINE: u16 = 261;
/* three dots per processor cycle */
pub const DOTS_PER_SCANLINE: u32 = 341;

pub const OAM_SIZE: usize = 256;
pub const PALETTE_SIZE: usize = 32;
pub const NAMETABLE_SIZE: usize = 0x800; /* two physical 1KB nametables */
pub const PATTERN_TABLE_SIZE: usize = 0x2000;

/* what the window shows: one 256x240 RGBA frame */
pub type WriteBuffer = [u8; WRITE_BUFFER_SIZE];
