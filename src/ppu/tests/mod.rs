use crate::bus::Peripheral;
use crate::cpu::NmiLine;
use crate::memory::Memory;
use crate::ppu::{Mirroring, PPURegister, PPU};

mod dma_tests;
mod palette_tests;
mod render_tests;

/* a PPU over 8KB of pattern RAM, with the NMI line handed back for inspection */
fn ppu_for_testing(mirroring: Mirroring) -> (PPU, NmiLine) {
    let nmi = NmiLine::new();
    let ppu = PPU::new(Memory::new(0x0000, 0x2000), mirroring, Box::new(nmi.clone()));
    (ppu, nmi)
}

/* PPUADDR takes the high byte first */
fn set_vram_address(ppu: &mut PPU, address: u16) {
    ppu.write(PPURegister::PPUADDR.address(), (address >> 8) as u8);
    ppu.write(PPURegister::PPUADDR.address(), (address & 0xff) as u8);
}

fn write_vram_block(ppu: &mut PPU, address: u16, data: &[u8]) {
    set_vram_address(ppu, address);
    for value in data {
        ppu.write(PPURegister::PPUDATA.address(), *value);
    }
}
