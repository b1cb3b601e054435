/* waveform descriptions from https://www.nesdev.org/wiki/APU_Pulse */
use crate::apu::envelope::Envelope;
use crate::apu::length_counter::LengthCounter;
use crate::apu::sweep::Sweep;
use crate::apu::timer::Timer;
use bincode::{Decode, Encode};

#[rustfmt::skip]
const PULSE_DUTIES : [[bool;8];4] = [
    [false,true,false,false,false,false,false,false],
    [false,true,true,false,false,false,false,false],
    [false,true,true,true,true,false,false,false],
    [true,false,false,true,true,true,true,true],
];

/**
 * One square-wave channel: a timer driving an 8-step duty sequencer, shaped by the envelope,
 * cut off by the length counter and bent by the sweep.
 */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Pulse {
    duty: u8,
    duty_index: u8,
    timer: Timer,
    envelope: Envelope,
    sweep: Sweep,
    length_counter: LengthCounter,
}

impl Pulse {
    /* pulse 1 negates its sweep with one's complement, pulse 2 with two's */
    pub fn new(ones_complement: bool) -> Pulse {
        Pulse {
            duty: 0,
            duty_index: 0,
            timer: Timer::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(ones_complement),
            length_counter: LengthCounter::new(),
        }
    }

    /* `register` is 0-3, the offset into the channel's four registers */
    pub fn write_register(&mut self, register: u16, value: u8) {
        match register {
            0 => {
                /* DDLC VVVV: duty, halt/loop, constant volume, volume or period */
                self.duty = value >> 6; /* NB: does not change duty_index */
                self.length_counter.set_halt(value & 0x20 != 0);
                self.envelope.set_envelope(value);
            }
            1 => self.sweep.set_sweep(value),
            2 => self.timer.set_timer_lo(value),
            3 => {
                self.timer.set_timer_hi(value);
                self.length_counter.set_lc(value);

                /* side-effects on write */
                self.duty_index = 0;
                self.envelope.start();
            }
            _ => unreachable!("pulse register {register}"),
        }
    }

    /* once per APU cycle */
    pub fn clock_timer(&mut self) {
        if !self.length_counter.is_active() {
            return;
        }
        if self.timer.clock() {
            self.duty_index = (self.duty_index + 1) % 8;
        }
    }

    pub fn clock_quarter_frame(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_half_frame(&mut self) {
        self.length_counter.clock();
        self.sweep.clock(&mut self.timer);
    }

    pub fn disable(&mut self) {
        self.length_counter.clear();
    }

    /* false for state no register write could produce, e.g. from a damaged snapshot */
    pub fn is_valid(&self) -> bool {
        (self.duty as usize) < PULSE_DUTIES.len()
            && self.duty_index < 8
            && self.timer.is_valid()
            && self.envelope.is_valid()
            && self.sweep.is_valid()
    }

    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    #[cfg(test)]
    pub fn length(&self) -> u8 {
        self.length_counter.count()
    }

    /* -15..=15: the duty step's sign times the volume, 0 while silenced */
    pub fn output(&self) -> i8 {
        if !self.length_counter.is_active() || self.sweep.is_muting(self.timer.period) {
            return 0;
        }
        let volume = self.envelope.volume() as i8;
        if PULSE_DUTIES[self.duty as usize][self.duty_index as usize] {
            volume
        } else {
            -volume
        }
    }
}
