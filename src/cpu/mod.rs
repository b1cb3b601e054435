/* the 6502 core: registers, decode table, and instruction semantics */
mod addressing_mode;
#[allow(clippy::module_inception)]
mod cpu;
mod instruction;
mod interrupt;
mod status_flag;

#[cfg(test)]
mod tests;

pub use addressing_mode::AddressingMode;
pub use cpu::{CpuState, CPU};
pub use instruction::{from_opcode, opcode_table, Instruction, RealizedInstruction};
pub use interrupt::{InterruptSink, NmiLine};
pub use status_flag::StatusFlag;

pub const NMI_HANDLER_LOCATION: u16 = 0xfffa;
pub const INITIAL_PC_LOCATION: u16 = 0xfffc;
pub const IRQ_HANDLER_LOCATION: u16 = 0xfffe;

pub const STACK_PAGE: u8 = 0x01;

/* flags right after reset: interrupts disabled, bits 4 and 5 set */
pub const RESET_STATUS: u8 = 0x34;
pub const RESET_STACK_POINTER: u8 = 0xff;

/* pushing three bytes and reading the vector */
pub const INTERRUPT_CYCLES: u16 = 7;

/* NTSC 2A03 */
pub const CLOCK_SPEED: u32 = 1_789_773;

/**
 * Conditions under which the core cannot keep executing. Both leave the processor where it
 * stopped, so the caller can report and decide what to do.
 */
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpuError {
    #[error("unhandled opcode 0x{opcode:02x} at 0x{address:04x}")]
    UnhandledOpcode { opcode: u8, address: u16 },
    #[error("BRK at 0x{address:04x} halted the processor")]
    Break { address: u16 },
}

/**
 * Converts a pair of bytes into a u16 to look up an address in memory.
 * The 6502 is little-endian, so this expects the low-order byte first.
 * addr(0xCD, 0xAB) returns 0xABCD.
 */
pub fn addr(lo_byte: u8, hi_byte: u8) -> u16 {
    ((hi_byte as u16) << 8) | (lo_byte as u16)
}

/**
 * Zero-page address operations take a single byte and result in an
 * address on the first page of memory. Indexing is done on the byte before
 * widening, so 0xff + 1 lands on 0x0000 rather than 0x0100.
 */
pub fn zero_page_addr(b1: u8, index: u8) -> u16 {
    b1.wrapping_add(index) as u16
}
