use crate::apu::timer::Timer;
use bincode::{Decode, Encode};

/* largest period the sweep may produce; anything above mutes the channel */
const MAX_TARGET_PERIOD: u16 = 0x7ff;

/**
 * Periodically bends a pulse channel's period up or down. Pulse 1 negates with one's
 * complement (subtracting one more than pulse 2), which is the only difference between them.
 */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    divider: u8,
    enabled: bool,
    negate: bool,
    period: u8,
    reload: bool,
    shift: u8,
    ones_complement: bool,
}

impl Sweep {
    pub fn new(ones_complement: bool) -> Sweep {
        Sweep {
            divider: 0,
            enabled: false,
            negate: false,
            period: 0,
            reload: false,
            shift: 0,
            ones_complement,
        }
    }

    pub fn target_period(&self, current: u16) -> u16 {
        let mut change_amount = current >> self.shift;
        if self.negate {
            if self.ones_complement {
                change_amount += 1;
            }
            current.saturating_sub(change_amount)
        } else {
            current + change_amount
        }
    }

    /* checked continuously, whether or not the sweep is enabled */
    pub fn is_muting(&self, current: u16) -> bool {
        current < 8 || self.target_period(current) > MAX_TARGET_PERIOD
    }

    /* once per half frame */
    pub fn clock(&mut self, timer: &mut Timer) {
        if self.divider == 0 && self.enabled && self.shift != 0 && !self.is_muting(timer.period) {
            timer.period = self.target_period(timer.period);
        }
        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }
    }

    /* divider, period and shift are all 3-bit */
    pub fn is_valid(&self) -> bool {
        self.divider <= 7 && self.period <= 7 && self.shift <= 7
    }

    pub fn set_sweep(&mut self, data: u8) {
        self.enabled = data & 0x80 != 0;
        self.period = (data >> 4) & 0x7;
        self.negate = data & 0x08 != 0;
        self.shift = data & 0x07;
        self.reload = true;
    }
}
