use crate::cpu::{AddressingMode, StatusFlag, CPU, IRQ_HANDLER_LOCATION};

use AddressingMode::*;
use Instruction::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /* load/store */
    LDA, /* Load A */
    LDX, /* Load X */
    LDY, /* Load Y */
    STA, /* Store A */
    STX, /* Store X */
    STY, /* Store Y */

    /* register transfers; all but TXS set zero/negative */
    TAX,
    TAY,
    TSX,
    TXS,
    TXA,
    TYA,

    /* comparisons */
    CMP,
    CPX,
    CPY,

    /* branches, relative to the following instruction */
    BCC, /* Branch if Carry Clear */
    BCS, /* Branch if Carry Set */
    BEQ, /* Branch if Equal */
    BMI, /* Branch if Minus */
    BNE, /* Branch if Not Equal */
    BPL, /* Branch if Plus */
    BVC, /* Branch if Overflow Clear */
    BVS, /* Branch if Overflow Set */

    /* increment/decrement */
    DEC,
    DEX,
    DEY,
    INC,
    INX,
    INY,

    /* bitwise */
    AND,
    ASL, /* Arithmetic Shift Left */
    BIT, /* Bit Test */
    EOR,
    LSR, /* Logical Shift Right */
    ORA,
    ROL,
    ROR,

    /* arithmetic; binary only, the decimal flag is stored but ignored */
    ADC,
    SBC,

    /* flags */
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,

    /* stack */
    PHA,
    PHP,
    PLA,
    PLP,

    /* control flow */
    JMP,
    JSR,
    RTS,
    RTI,
    BRK, /* software interrupt through 0xfffe */
    NOP,

    /* anything not in the table below */
    Unhandled,
}

impl Instruction {
    /**
     * Executes the instruction against the processor. The program counter already points past
     * the opcode and its operands. Returns the cycles spent beyond the table's base count:
     * taken branches and indexed reads that cross a page.
     */
    pub fn apply(&self, cpu: &mut CPU, addr_mode: &AddressingMode, b1: u8, b2: u8) -> u16 {
        let mut extra_cycles = 0;
        match self {
            LDA => {
                cpu.accumulator = addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            LDX => {
                cpu.index_x = addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.index_x);
            }
            LDY => {
                cpu.index_y = addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.index_y);
            }
            STA => addr_mode.write(cpu, b1, b2, cpu.accumulator),
            STX => addr_mode.write(cpu, b1, b2, cpu.index_x),
            STY => addr_mode.write(cpu, b1, b2, cpu.index_y),

            TAX => {
                cpu.index_x = cpu.accumulator;
                cpu.update_zero_neg_flags(cpu.index_x);
            }
            TAY => {
                cpu.index_y = cpu.accumulator;
                cpu.update_zero_neg_flags(cpu.index_y);
            }
            TSX => {
                cpu.index_x = cpu.s_register;
                cpu.update_zero_neg_flags(cpu.index_x);
            }
            TXS => cpu.s_register = cpu.index_x,
            TXA => {
                cpu.accumulator = cpu.index_x;
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            TYA => {
                cpu.accumulator = cpu.index_y;
                cpu.update_zero_neg_flags(cpu.accumulator);
            }

            CMP => compare(cpu, addr_mode, b1, b2, cpu.accumulator, &mut extra_cycles),
            CPX => compare(cpu, addr_mode, b1, b2, cpu.index_x, &mut extra_cycles),
            CPY => compare(cpu, addr_mode, b1, b2, cpu.index_y, &mut extra_cycles),

            BCC => extra_cycles += branch(cpu, StatusFlag::Carry, false, b1),
            BCS => extra_cycles += branch(cpu, StatusFlag::Carry, true, b1),
            BEQ => extra_cycles += branch(cpu, StatusFlag::Zero, true, b1),
            BMI => extra_cycles += branch(cpu, StatusFlag::Negative, true, b1),
            BNE => extra_cycles += branch(cpu, StatusFlag::Zero, false, b1),
            BPL => extra_cycles += branch(cpu, StatusFlag::Negative, false, b1),
            BVC => extra_cycles += branch(cpu, StatusFlag::Overflow, false, b1),
            BVS => extra_cycles += branch(cpu, StatusFlag::Overflow, true, b1),

            DEC => {
                let new_val = addr_mode.deref(cpu, b1, b2).wrapping_sub(1);
                addr_mode.write(cpu, b1, b2, new_val);
                cpu.update_zero_neg_flags(new_val);
            }
            DEX => {
                cpu.index_x = cpu.index_x.wrapping_sub(1);
                cpu.update_zero_neg_flags(cpu.index_x);
            }
            DEY => {
                cpu.index_y = cpu.index_y.wrapping_sub(1);
                cpu.update_zero_neg_flags(cpu.index_y);
            }
            INC => {
                let new_val = addr_mode.deref(cpu, b1, b2).wrapping_add(1);
                addr_mode.write(cpu, b1, b2, new_val);
                cpu.update_zero_neg_flags(new_val);
            }
            INX => {
                cpu.index_x = cpu.index_x.wrapping_add(1);
                cpu.update_zero_neg_flags(cpu.index_x);
            }
            INY => {
                cpu.index_y = cpu.index_y.wrapping_add(1);
                cpu.update_zero_neg_flags(cpu.index_y);
            }

            AND => {
                cpu.accumulator &= addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            EOR => {
                cpu.accumulator ^= addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            ORA => {
                cpu.accumulator |= addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            BIT => {
                let mem = addr_mode.deref(cpu, b1, b2);
                cpu.update_flag(StatusFlag::Zero, cpu.accumulator & mem == 0);
                cpu.update_flag(StatusFlag::Overflow, mem & 0x40 != 0);
                cpu.update_flag(StatusFlag::Negative, mem & 0x80 != 0);
            }
            ASL => shift(cpu, addr_mode, b1, b2, |val, _| (val << 1, val & 0x80 != 0)),
            LSR => shift(cpu, addr_mode, b1, b2, |val, _| (val >> 1, val & 0x01 != 0)),
            ROL => shift(cpu, addr_mode, b1, b2, |val, carry| {
                ((val << 1) | carry, val & 0x80 != 0)
            }),
            ROR => shift(cpu, addr_mode, b1, b2, |val, carry| {
                ((val >> 1) | (carry << 7), val & 0x01 != 0)
            }),

            ADC => {
                let val = addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                add_with_carry_and_update(cpu, val);
            }
            SBC => {
                /* A - M - (1 - C) is A + !M + C */
                let val = addr_mode.deref_check_boundary_cross(cpu, b1, b2, &mut extra_cycles);
                add_with_carry_and_update(cpu, !val);
            }

            CLC => cpu.update_flag(StatusFlag::Carry, false),
            CLD => cpu.update_flag(StatusFlag::Decimal, false),
            CLI => cpu.update_flag(StatusFlag::InterruptDisable, false),
            CLV => cpu.update_flag(StatusFlag::Overflow, false),
            SEC => cpu.update_flag(StatusFlag::Carry, true),
            SED => cpu.update_flag(StatusFlag::Decimal, true),
            SEI => cpu.update_flag(StatusFlag::InterruptDisable, true),

            PHA => cpu.push(cpu.accumulator),
            PHP => {
                /* the pushed copy always has B and bit 5 on */
                cpu.push(cpu.status | 0x30);
            }
            PLA => {
                cpu.accumulator = cpu.pop();
                cpu.update_zero_neg_flags(cpu.accumulator);
            }
            PLP => {
                let val = cpu.pop();
                cpu.restore_status(val);
            }

            JMP => cpu.program_counter = addr_mode.resolve_address(cpu, b1, b2),
            JSR => {
                /* the return address pushed is the last byte of the JSR itself */
                cpu.push_memory_loc(cpu.program_counter.wrapping_sub(1));
                cpu.program_counter = addr_mode.resolve_address(cpu, b1, b2);
            }
            RTS => cpu.program_counter = cpu.pop_memory_loc().wrapping_add(1),
            RTI => {
                let val = cpu.pop();
                cpu.restore_status(val);
                cpu.program_counter = cpu.pop_memory_loc();
            }
            BRK => {
                /* BRK is followed by a padding byte, which the return address skips */
                let return_address = cpu.program_counter.wrapping_add(1);
                cpu.interrupt(IRQ_HANDLER_LOCATION, return_address, true);
            }
            NOP => {}

            /* the processor refuses to execute these, see CPU::step */
            Unhandled => {}
        }

        extra_cycles
    }
}

/* a taken branch costs one cycle, two if it lands on another page */
fn branch(cpu: &mut CPU, flag: StatusFlag, is_positive: bool, offset: u8) -> u16 {
    if is_positive != flag.is_set(cpu) {
        return 0;
    }

    let old_pc = cpu.program_counter;
    cpu.program_counter = Relative.resolve_address(cpu, offset, 0);
    if old_pc & 0xff00 != cpu.program_counter & 0xff00 {
        2
    } else {
        1
    }
}

fn compare(cpu: &mut CPU, addr_mode: &AddressingMode, b1: u8, b2: u8, register: u8, extra_cycles: &mut u16) {
    let mem_val = addr_mode.deref_check_boundary_cross(cpu, b1, b2, extra_cycles);

    cpu.update_flag(StatusFlag::Carry, register >= mem_val);
    cpu.update_zero_neg_flags(register.wrapping_sub(mem_val));
}

/* read-modify-write through `op`, which gets the value and carry-in and returns the result and carry-out */
fn shift(cpu: &mut CPU, addr_mode: &AddressingMode, b1: u8, b2: u8, op: impl Fn(u8, u8) -> (u8, bool)) {
    let val = addr_mode.deref(cpu, b1, b2);
    let (result, carry) = op(val, StatusFlag::Carry.as_num(cpu));
    addr_mode.write(cpu, b1, b2, result);
    cpu.update_flag(StatusFlag::Carry, carry);
    cpu.update_zero_neg_flags(result);
}

fn add_with_carry_and_update(cpu: &mut CPU, mem_val: u8) {
    let old_a = cpu.accumulator;
    let sum = old_a as u16 + mem_val as u16 + StatusFlag::Carry.as_num(cpu) as u16;
    let result = sum as u8;

    cpu.accumulator = result;
    cpu.update_zero_neg_flags(result);
    cpu.update_flag(StatusFlag::Carry, sum > 0xff);
    /* signed overflow: both inputs share a sign the result doesn't */
    cpu.update_flag(StatusFlag::Overflow, (result ^ old_a) & (result ^ mem_val) & 0x80 != 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizedInstruction {
    pub instruction: Instruction,
    pub addr_mode: AddressingMode,
    pub cycles: u16,
}

const UNHANDLED: RealizedInstruction = RealizedInstruction {
    instruction: Unhandled,
    addr_mode: Implicit,
    cycles: 0,
};

/*
 * Every documented opcode, plus the one-byte unofficial NOPs some games lean on.
 * Cycle counts are the base cost; see Instruction::apply for the extras.
 */
#[rustfmt::skip]
const OPCODES: &[(u8, Instruction, AddressingMode, u16)] = &[
    (0x69, ADC, Immediate, 2), (0x65, ADC, ZeroPage, 3), (0x75, ADC, ZeroPageX, 4), (0x6d, ADC, Absolute, 4),
    (0x7d, ADC, AbsoluteX, 4), (0x79, ADC, AbsoluteY, 4), (0x61, ADC, IndirectX, 6), (0x71, ADC, IndirectY, 5),

    (0x29, AND, Immediate, 2), (0x25, AND, ZeroPage, 3), (0x35, AND, ZeroPageX, 4), (0x2d, AND, Absolute, 4),
    (0x3d, AND, AbsoluteX, 4), (0x39, AND, AbsoluteY, 4), (0x21, AND, IndirectX, 6), (0x31, AND, IndirectY, 5),

    (0x0a, ASL, Accumulator, 2), (0x06, ASL, ZeroPage, 5), (0x16, ASL, ZeroPageX, 6), (0x0e, ASL, Absolute, 6),
    (0x1e, ASL, AbsoluteX, 7),

    (0x90, BCC, Relative, 2), (0xb0, BCS, Relative, 2), (0xf0, BEQ, Relative, 2), (0x30, BMI, Relative, 2),
    (0xd0, BNE, Relative, 2), (0x10, BPL, Relative, 2), (0x50, BVC, Relative, 2), (0x70, BVS, Relative, 2),

    (0x24, BIT, ZeroPage, 3), (0x2c, BIT, Absolute, 4),

    (0x00, BRK, Implicit, 7),

    (0x18, CLC, Implicit, 2), (0xd8, CLD, Implicit, 2), (0x58, CLI, Implicit, 2), (0xb8, CLV, Implicit, 2),
    (0x38, SEC, Implicit, 2), (0xf8, SED, Implicit, 2), (0x78, SEI, Implicit, 2),

    (0xc9, CMP, Immediate, 2), (0xc5, CMP, ZeroPage, 3), (0xd5, CMP, ZeroPageX, 4), (0xcd, CMP, Absolute, 4),
    (0xdd, CMP, AbsoluteX, 4), (0xd9, CMP, AbsoluteY, 4), (0xc1, CMP, IndirectX, 6), (0xd1, CMP, IndirectY, 5),
    (0xe0, CPX, Immediate, 2), (0xe4, CPX, ZeroPage, 3), (0xec, CPX, Absolute, 4),
    (0xc0, CPY, Immediate, 2), (0xc4, CPY, ZeroPage, 3), (0xcc, CPY, Absolute, 4),

    (0xc6, DEC, ZeroPage, 5), (0xd6, DEC, ZeroPageX, 6), (0xce, DEC, Absolute, 6), (0xde, DEC, AbsoluteX, 7),
    (0xca, DEX, Implicit, 2), (0x88, DEY, Implicit, 2),
    (0xe6, INC, ZeroPage, 5), (0xf6, INC, ZeroPageX, 6), (0xee, INC, Absolute, 6), (0xfe, INC, AbsoluteX, 7),
    (0xe8, INX, Implicit, 2), (0xc8, INY, Implicit, 2),

    (0x49, EOR, Immediate, 2), (0x45, EOR, ZeroPage, 3), (0x55, EOR, ZeroPageX, 4), (0x4d, EOR, Absolute, 4),
    (0x5d, EOR, AbsoluteX, 4), (0x59, EOR, AbsoluteY, 4), (0x41, EOR, IndirectX, 6), (0x51, EOR, IndirectY, 5),

    (0x4c, JMP, Absolute, 3), (0x6c, JMP, Indirect, 5), (0x20, JSR, Absolute, 6),
    (0x60, RTS, Implicit, 6), (0x40, RTI, Implicit, 6),

    (0xa9, LDA, Immediate, 2), (0xa5, LDA, ZeroPage, 3), (0xb5, LDA, ZeroPageX, 4), (0xad, LDA, Absolute, 4),
    (0xbd, LDA, AbsoluteX, 4), (0xb9, LDA, AbsoluteY, 4), (0xa1, LDA, IndirectX, 6), (0xb1, LDA, IndirectY, 5),
    (0xa2, LDX, Immediate, 2), (0xa6, LDX, ZeroPage, 3), (0xb6, LDX, ZeroPageY, 4), (0xae, LDX, Absolute, 4),
    (0xbe, LDX, AbsoluteY, 4),
    (0xa0, LDY, Immediate, 2), (0xa4, LDY, ZeroPage, 3), (0xb4, LDY, ZeroPageX, 4), (0xac, LDY, Absolute, 4),
    (0xbc, LDY, AbsoluteX, 4),

    (0x4a, LSR, Accumulator, 2), (0x46, LSR, ZeroPage, 5), (0x56, LSR, ZeroPageX, 6), (0x4e, LSR, Absolute, 6),
    (0x5e, LSR, AbsoluteX, 7),

    (0xea, NOP, Implicit, 2),
    (0x1a, NOP, Implicit, 2), (0x3a, NOP, Implicit, 2), (0x5a, NOP, Implicit, 2), (0x7a, NOP, Implicit, 2),
    (0xda, NOP, Implicit, 2), (0xfa, NOP, Implicit, 2),

    (0x09, ORA, Immediate, 2), (0x05, ORA, ZeroPage, 3), (0x15, ORA, ZeroPageX, 4), (0x0d, ORA, Absolute, 4),
    (0x1d, ORA, AbsoluteX, 4), (0x19, ORA, AbsoluteY, 4), (0x01, ORA, IndirectX, 6), (0x11, ORA, IndirectY, 5),

    (0x48, PHA, Implicit, 3), (0x08, PHP, Implicit, 3), (0x68, PLA, Implicit, 4), (0x28, PLP, Implicit, 4),

    (0x2a, ROL, Accumulator, 2), (0x26, ROL, ZeroPage, 5), (0x36, ROL, ZeroPageX, 6), (0x2e, ROL, Absolute, 6),
    (0x3e, ROL, AbsoluteX, 7),
    (0x6a, ROR, Accumulator, 2), (0x66, ROR, ZeroPage, 5), (0x76, ROR, ZeroPageX, 6), (0x6e, ROR, Absolute, 6),
    (0x7e, ROR, AbsoluteX, 7),

    (0xe9, SBC, Immediate, 2), (0xe5, SBC, ZeroPage, 3), (0xf5, SBC, ZeroPageX, 4), (0xed, SBC, Absolute, 4),
    (0xfd, SBC, AbsoluteX, 4), (0xf9, SBC, AbsoluteY, 4), (0xe1, SBC, IndirectX, 6), (0xf1, SBC, IndirectY, 5),

    (0x85, STA, ZeroPage, 3), (0x95, STA, ZeroPageX, 4), (0x8d, STA, Absolute, 4), (0x9d, STA, AbsoluteX, 5),
    (0x99, STA, AbsoluteY, 5), (0x81, STA, IndirectX, 6), (0x91, STA, IndirectY, 6),
    (0x86, STX, ZeroPage, 3), (0x96, STX, ZeroPageY, 4), (0x8e, STX, Absolute, 4),
    (0x84, STY, ZeroPage, 3), (0x94, STY, ZeroPageX, 4), (0x8c, STY, Absolute, 4),

    (0xaa, TAX, Implicit, 2), (0xa8, TAY, Implicit, 2), (0xba, TSX, Implicit, 2), (0x8a, TXA, Implicit, 2),
    (0x9a, TXS, Implicit, 2), (0x98, TYA, Implicit, 2),
];

/* the full 256-entry decode table; opcodes not listed above decode to Unhandled */
pub fn opcode_table() -> [RealizedInstruction; 256] {
    let mut table = [UNHANDLED; 256];
    for &(opcode, instruction, addr_mode, cycles) in OPCODES {
        table[opcode as usize] = RealizedInstruction {
            instruction,
            addr_mode,
            cycles,
        };
    }
    table
}

pub fn from_opcode(opcode: u8) -> RealizedInstruction {
    OPCODES
        .iter()
        .find(|(code, ..)| *code == opcode)
        .map(|&(_, instruction, addr_mode, cycles)| RealizedInstruction {
            instruction,
            addr_mode,
            cycles,
        })
        .unwrap_or(UNHANDLED)
}
