use crate::bus::Bus;
use crate::cpu::{
    addr, opcode_table, CpuError, Instruction, NmiLine, RealizedInstruction, StatusFlag,
    INITIAL_PC_LOCATION, INTERRUPT_CYCLES, NMI_HANDLER_LOCATION, RESET_STACK_POINTER,
    RESET_STATUS, STACK_PAGE,
};
use bincode::{Decode, Encode};
use log::trace;

pub struct CPU {
    pub accumulator: u8,
    pub index_x: u8,
    pub index_y: u8,
    pub s_register: u8,
    pub program_counter: u16,
    pub status: u8,
    bus: Bus,
    nmi: NmiLine,
    opcodes: [RealizedInstruction; 256],
    trace_instructions: bool,
    brk_halts: bool,
}

/* everything needed to resume the processor, in snapshot order */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    pub accumulator: u8,
    pub status: u8,
    pub program_counter: u16,
    pub s_register: u8,
    pub index_x: u8,
    pub index_y: u8,
    pub nmi_pending: bool,
}

impl CPU {
    /* the processor starts zeroed; call reset() once the program is on the bus */
    pub fn new(bus: Bus, nmi: NmiLine) -> CPU {
        CPU {
            accumulator: 0,
            index_x: 0,
            index_y: 0,
            s_register: 0,
            program_counter: 0,
            status: 0,
            bus,
            nmi,
            opcodes: opcode_table(),
            trace_instructions: false,
            brk_halts: true,
        }
    }

    /* log every instruction at trace level before it executes */
    pub fn set_trace_instructions(&mut self, trace_instructions: bool) {
        self.trace_instructions = trace_instructions;
    }

    /* BRK stops the processor unless this is turned off, in which case it interrupts through 0xfffe */
    pub fn set_brk_halts(&mut self, brk_halts: bool) {
        self.brk_halts = brk_halts;
    }

    #[cfg(test)]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn reset(&mut self) {
        self.accumulator = 0;
        self.index_x = 0;
        self.index_y = 0;
        self.s_register = RESET_STACK_POINTER;
        self.status = RESET_STATUS;
        self.nmi.set_pending(false);
        self.program_counter = self.read_mem16(INITIAL_PC_LOCATION);
    }

    /**
     * Runs one instruction, or services a pending NMI instead, and returns the cycles it took.
     * On error the registers are left as they were when the failing opcode was fetched, apart
     * from the program counter, which has moved past it.
     */
    pub fn step(&mut self) -> Result<u16, CpuError> {
        if self.nmi.take() {
            self.interrupt(NMI_HANDLER_LOCATION, self.program_counter, false);
            return Ok(INTERRUPT_CYCLES);
        }

        let address = self.program_counter;
        let opcode = self.read_mem(address);
        let realized = self.opcodes[opcode as usize];
        self.program_counter = address.wrapping_add(1);

        if realized.instruction == Instruction::Unhandled {
            return Err(CpuError::UnhandledOpcode { opcode, address });
        }

        let operand_bytes = realized.addr_mode.operand_bytes();
        let b1 = if operand_bytes > 0 {
            self.read_mem(self.program_counter)
        } else {
            0
        };
        let b2 = if operand_bytes > 1 {
            self.read_mem(self.program_counter.wrapping_add(1))
        } else {
            0
        };
        self.program_counter = self.program_counter.wrapping_add(operand_bytes);

        if self.trace_instructions {
            self.trace(address, opcode, &realized, b1, b2);
        }

        if realized.instruction == Instruction::BRK && self.brk_halts {
            return Err(CpuError::Break { address });
        }

        let extra_cycles = realized.instruction.apply(self, &realized.addr_mode, b1, b2);
        Ok(realized.cycles + extra_cycles)
    }

    fn trace(&self, address: u16, opcode: u8, realized: &RealizedInstruction, b1: u8, b2: u8) {
        let operands = match realized.addr_mode.operand_bytes() {
            0 => String::new(),
            1 => format!("{b1:02X}"),
            _ => format!("{b1:02X} {b2:02X}"),
        };
        trace!(
            "{address:04X}  {opcode:02X} {operands:<5}  {:?} {:?}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            realized.instruction,
            realized.addr_mode,
            self.accumulator,
            self.index_x,
            self.index_y,
            self.status,
            self.s_register,
        );
    }

    /**
     * Pushes the return address and flags, then jumps through `vector`. The pushed flags always
     * have bit 5 set; bit 4 tells a handler whether BRK got it there.
     */
    pub fn interrupt(&mut self, vector: u16, return_address: u16, from_break: bool) {
        self.push_memory_loc(return_address);
        let pushed_status = if from_break {
            self.status | 0x30
        } else {
            (self.status & !0x10) | 0x20
        };
        self.push(pushed_status);
        self.update_flag(StatusFlag::InterruptDisable, true);
        self.program_counter = self.read_mem16(vector);
    }

    /* PLP and RTI take everything from the stack except bits 4 and 5 */
    pub fn restore_status(&mut self, pulled: u8) {
        self.status = (self.status & 0x30) | (pulled & !0x30);
    }

    pub fn update_flag(&mut self, flag: StatusFlag, new_val: bool) {
        flag.update_bool(self, new_val);
    }

    pub fn update_zero_neg_flags(&mut self, new_val: u8) {
        self.update_flag(StatusFlag::Zero, new_val == 0);
        self.update_flag(StatusFlag::Negative, new_val & 0x80 != 0);
    }

    pub fn push(&mut self, data: u8) {
        self.write_mem(addr(self.s_register, STACK_PAGE), data);
        self.s_register = self.s_register.wrapping_sub(1);
    }

    pub fn push_memory_loc(&mut self, mem_loc: u16) {
        self.push((mem_loc >> 8) as u8);
        self.push((mem_loc & 0xff) as u8);
    }

    pub fn pop(&mut self) -> u8 {
        self.s_register = self.s_register.wrapping_add(1);
        self.read_mem(addr(self.s_register, STACK_PAGE))
    }

    pub fn pop_memory_loc(&mut self) -> u16 {
        let lower = self.pop();
        let upper = self.pop();
        addr(lower, upper)
    }

    pub fn read_mem(&self, address: u16) -> u8 {
        self.bus.read(address)
    }

    pub fn write_mem(&mut self, address: u16, data: u8) {
        self.bus.write(address, data);
    }

    pub fn read_mem16(&self, address: u16) -> u16 {
        addr(self.read_mem(address), self.read_mem(address.wrapping_add(1)))
    }

    /* pointer fetch that stays on the zero page: ($ff) reads $ff and $00 */
    pub fn read_zero_page16(&self, pointer: u8) -> u16 {
        addr(
            self.read_mem(pointer as u16),
            self.read_mem(pointer.wrapping_add(1) as u16),
        )
    }

    pub fn state(&self) -> CpuState {
        CpuState {
            accumulator: self.accumulator,
            status: self.status,
            program_counter: self.program_counter,
            s_register: self.s_register,
            index_x: self.index_x,
            index_y: self.index_y,
            nmi_pending: self.nmi.is_pending(),
        }
    }

    pub fn restore(&mut self, state: &CpuState) {
        self.accumulator = state.accumulator;
        self.status = state.status;
        self.program_counter = state.program_counter;
        self.s_register = state.s_register;
        self.index_x = state.index_x;
        self.index_y = state.index_y;
        self.nmi.set_pending(state.nmi_pending);
    }
}
