use crate::cpu::CPU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Carry,
    Zero,
    InterruptDisable,
    Decimal,
    /* "No CPU effect; see: the B flag" */
    Break,
    /* "No CPU effect; always pushed as 1" */
    Unused,
    Overflow,
    Negative,
}

impl StatusFlag {
    pub fn bit(&self) -> u8 {
        match self {
            StatusFlag::Carry => 0,
            StatusFlag::Zero => 1,
            StatusFlag::InterruptDisable => 2,
            StatusFlag::Decimal => 3,
            StatusFlag::Break => 4,
            StatusFlag::Unused => 5,
            StatusFlag::Overflow => 6,
            StatusFlag::Negative => 7,
        }
    }

    pub fn mask(&self) -> u8 {
        1 << self.bit()
    }

    pub fn is_set(&self, cpu: &CPU) -> bool {
        cpu.status & self.mask() != 0
    }

    /* 1 if set, 0 otherwise; handy for carry arithmetic */
    pub fn as_num(&self, cpu: &CPU) -> u8 {
        (cpu.status >> self.bit()) & 1
    }

    pub fn update_bool(&self, cpu: &mut CPU, new_val: bool) {
        if new_val {
            cpu.status |= self.mask();
        } else {
            cpu.status &= !self.mask();
        }
    }
}
