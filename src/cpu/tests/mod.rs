use crate::bus::Bus;
use crate::cpu::{NmiLine, CPU};
use crate::memory::Memory;
use std::cell::RefCell;
use std::rc::Rc;


/* a processor over 64KB of flat RAM, registers zeroed */
fn cpu_for_testing() -> CPU {
    let bus = Bus::new("test");
    bus.attach_peripheral(0x0000, 0xffff, Rc::new(RefCell::new(Memory::new(0x0000, 0x10000))));
    CPU::new(bus, NmiLine::new())
}

/* writes `program` at `start`, points the reset vector there and resets */
fn cpu_with_program(start: u16, program: &[u8]) -> CPU {
    let mut cpu = cpu_for_testing();
    for (offset, byte) in program.iter().enumerate() {
        cpu.write_mem(start.wrapping_add(offset as u16), *byte);
    }
    cpu.write_mem(0xfffc, (start & 0xff) as u8);
    cpu.write_mem(0xfffd, (start >> 8) as u8);
    cpu.reset();
    cpu
}
