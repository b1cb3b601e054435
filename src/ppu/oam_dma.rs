use crate::bus::{Peripheral, WeakBus, OPEN_BUS};
use crate::cpu::addr;
use crate::ppu::{OAM_SIZE, PPU};
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

/* 512 cycles of copying plus one to line up */
pub const DMA_STALL_CYCLES: u16 = 513;

/**
 * The sprite DMA register at 0x4014 on the processor bus. Writing page `n` copies
 * 0xn00-0xnff into OAM through the processor bus, then leaves the stall for the driving loop
 * to collect.
 */
pub struct OamDma {
    cpu_bus: WeakBus,
    ppu: Rc<RefCell<PPU>>,
    stall_cycles: u16,
}

impl OamDma {
    pub fn new(cpu_bus: WeakBus, ppu: Rc<RefCell<PPU>>) -> OamDma {
        OamDma {
            cpu_bus,
            ppu,
            stall_cycles: 0,
        }
    }

    /* cycles the processor owes for transfers since the last call */
    pub fn take_stall_cycles(&mut self) -> u16 {
        std::mem::take(&mut self.stall_cycles)
    }
}

impl Peripheral for OamDma {
    fn read(&mut self, _address: u16) -> u8 {
        OPEN_BUS
    }

    fn write(&mut self, _address: u16, page: u8) {
        let mut data = [0u8; OAM_SIZE];
        for (offset, byte) in data.iter_mut().enumerate() {
            *byte = self.cpu_bus.read(addr(offset as u8, page));
        }

        match self.ppu.try_borrow_mut() {
            Ok(mut ppu) => ppu.write_oam_block(&data),
            Err(_) => warn!("sprite DMA from page 0x{page:02x} dropped, video busy"),
        }
        self.stall_cycles += DMA_STALL_CYCLES;
    }
}
