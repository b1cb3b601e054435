use crate::cpu::{addr, zero_page_addr, CPU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode
{
	Implicit,
	Accumulator,
	Immediate,
	ZeroPage,
	ZeroPageX,
	ZeroPageY,
	Relative,
	Absolute,
	AbsoluteX,
	AbsoluteY,
	Indirect,
	IndirectX,
	IndirectY,
}

fn crosses_page(base: u16, effective: u16) -> bool {
	(base & 0xff00) != (effective & 0xff00)
}

impl AddressingMode
{
	/* how many bytes follow the opcode */
	pub fn operand_bytes(&self) -> u16 {
		match self {
			AddressingMode::Implicit | AddressingMode::Accumulator => 0,
			AddressingMode::Immediate
			| AddressingMode::ZeroPage
			| AddressingMode::ZeroPageX
			| AddressingMode::ZeroPageY
			| AddressingMode::Relative
			| AddressingMode::IndirectX
			| AddressingMode::IndirectY => 1,
			AddressingMode::Absolute
			| AddressingMode::AbsoluteX
			| AddressingMode::AbsoluteY
			| AddressingMode::Indirect => 2,
		}
	}

	/**
	 * Works out the effective address, and whether indexing carried it onto another page.
	 * Relative offsets are taken from the program counter, which by the time an instruction
	 * executes already points past its operands.
	 *
	 * behavior based on: https://www.nesdev.org/obelisk-6502-guide/addressing.html
	 */
	pub fn resolve(&self, cpu: &CPU, byte1: u8, byte2: u8) -> (u16, bool) {
		match self {
			AddressingMode::Implicit | AddressingMode::Accumulator | AddressingMode::Immediate =>
				unreachable!("{self:?} operands never live in memory"),
			AddressingMode::ZeroPage =>
				(zero_page_addr(byte1, 0), false),
			AddressingMode::ZeroPageX =>
				(zero_page_addr(byte1, cpu.index_x), false),
			AddressingMode::ZeroPageY =>
				(zero_page_addr(byte1, cpu.index_y), false),
			AddressingMode::Relative =>
				(cpu.program_counter.wrapping_add_signed(byte1 as i8 as i16), false),
			AddressingMode::Absolute =>
				(addr(byte1, byte2), false),
			AddressingMode::AbsoluteX => {
				let base = addr(byte1, byte2);
				let effective = base.wrapping_add(cpu.index_x as u16);
				(effective, crosses_page(base, effective))
			}
			AddressingMode::AbsoluteY => {
				let base = addr(byte1, byte2);
				let effective = base.wrapping_add(cpu.index_y as u16);
				(effective, crosses_page(base, effective))
			}
			AddressingMode::Indirect => {
				/* only used for JMP. The high byte of the pointer is fetched without carrying
				 * into the page, so JMP ($10FF) reads $10FF and $1000. */
				let lo = cpu.read_mem(addr(byte1, byte2));
				let hi = cpu.read_mem(addr(byte1.wrapping_add(1), byte2));
				(addr(lo, hi), false)
			}
			AddressingMode::IndirectX => {
				let pointer = byte1.wrapping_add(cpu.index_x);
				(cpu.read_zero_page16(pointer), false)
			}
			AddressingMode::IndirectY => {
				let base = cpu.read_zero_page16(byte1);
				let effective = base.wrapping_add(cpu.index_y as u16);
				(effective, crosses_page(base, effective))
			}
		}
	}

	pub fn resolve_address(&self, cpu: &CPU, byte1: u8, byte2: u8) -> u16 {
		self.resolve(cpu, byte1, byte2).0
	}

	pub fn deref(&self, cpu: &CPU, byte1: u8, byte2: u8) -> u8 {
		match self {
			AddressingMode::Immediate => byte1,
			AddressingMode::Accumulator => cpu.accumulator,
			_ => cpu.read_mem(self.resolve_address(cpu, byte1, byte2)),
		}
	}

	/* same as deref, but counts the extra cycle an indexed read spends fixing up the high byte */
	pub fn deref_check_boundary_cross(&self, cpu: &CPU, byte1: u8, byte2: u8, extra_cycles: &mut u16) -> u8 {
		match self {
			AddressingMode::Immediate | AddressingMode::Accumulator => self.deref(cpu, byte1, byte2),
			_ => {
				let (address, crossed) = self.resolve(cpu, byte1, byte2);
				if crossed {
					*extra_cycles += 1;
				}
				cpu.read_mem(address)
			}
		}
	}

	pub fn write(&self, cpu: &mut CPU, byte1: u8, byte2: u8, new_val: u8) {
		match self {
			AddressingMode::Accumulator => { cpu.accumulator = new_val }
			_ => {
				let address = self.resolve_address(cpu, byte1, byte2);
				cpu.write_mem(address, new_val)
			}
		}
	}
}
