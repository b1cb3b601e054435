use crate::bus::Bus;
use crate::memory::Memory;
use crate::ppu::tests::ppu_for_testing;
use crate::ppu::{Mirroring, OamDma, DMA_STALL_CYCLES, OAMDMA_ADDRESS};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_sprite_dma() {
    let bus = Bus::new("test");
    let ram = Rc::new(RefCell::new(Memory::new(0x0000, 0x800)));
    bus.attach_peripheral(0x0000, 0x1fff, ram.clone());
    let (ppu, _) = ppu_for_testing(Mirroring::Horizontal);
    let ppu = Rc::new(RefCell::new(ppu));
    let dma = Rc::new(RefCell::new(OamDma::new(bus.downgrade(), ppu.clone())));
    bus.attach_peripheral(OAMDMA_ADDRESS, OAMDMA_ADDRESS, dma.clone());

    for (i, byte) in ram.borrow_mut().bytes_mut()[0x200..0x300].iter_mut().enumerate() {
        *byte = i as u8;
    }
    /* the copy starts at the OAM cursor */
    ppu.borrow_mut().oam_addr = 0x04;
    bus.write(OAMDMA_ADDRESS, 0x02);

    assert_eq!(ppu.borrow().oam[0x04], 0x00);
    assert_eq!(ppu.borrow().oam[0xff], 0xfb);
    assert_eq!(ppu.borrow().oam[0x00], 0xfc);
    assert_eq!(ppu.borrow().oam_addr, 0x04);

    assert_eq!(dma.borrow_mut().take_stall_cycles(), DMA_STALL_CYCLES);
    assert_eq!(dma.borrow_mut().take_stall_cycles(), 0);
}

#[test]
fn test_dma_reads_mirrors() {
    let bus = Bus::new("test");
    let ram = Rc::new(RefCell::new(Memory::new(0x0000, 0x800)));
    bus.attach_peripheral(0x0000, 0x1fff, ram.clone());
    let (ppu, _) = ppu_for_testing(Mirroring::Horizontal);
    let ppu = Rc::new(RefCell::new(ppu));
    let dma = Rc::new(RefCell::new(OamDma::new(bus.downgrade(), ppu.clone())));
    bus.attach_peripheral(OAMDMA_ADDRESS, OAMDMA_ADDRESS, dma);

    ram.borrow_mut().bytes_mut()[0x310] = 0xab;
    /* page 0x0b is 0x0300 seen through the RAM mirror */
    bus.write(OAMDMA_ADDRESS, 0x0b);
    assert_eq!(ppu.borrow().oam[0x10], 0xab);
}
