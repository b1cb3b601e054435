use crate::apu::frame_sequencer::{FrameEvent, FrameSequencer};
use crate::apu::pulse::Pulse;
use crate::apu::AudioSink;
use crate::bus::Peripheral;
use crate::cpu::CLOCK_SPEED;
use bincode::{Decode, Encode};
use log::{debug, warn};

/* each step of channel volume is worth this much of full scale */
const VOLUME_STEP: f32 = 1.0 / 40.0;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

const STATUS_ADDRESS: u16 = 0x4015;
pub const FRAME_COUNTER_ADDRESS: u16 = 0x4017;

/* 0x4015 bits: which channels are switched on */
const PULSE_1_ENABLE: u8 = 0x01;
const PULSE_2_ENABLE: u8 = 0x02;
const STATUS_WRITE_BITS: u8 = 0x1f;

pub struct APU {
    pulse1: Pulse,
    pulse2: Pulse,
    frame_sequencer: FrameSequencer,
    status: u8,
    sample_rate: u32,
    /* APU cycles run at half the processor clock; this holds the odd processor cycle */
    odd_cpu_cycle: bool,
    /* in units of 1/(2 * sample_rate) APU cycles; a sample falls due at CLOCK_SPEED */
    sample_phase: u32,
    samples: Vec<i16>,
}

/* everything needed to resume audio, in snapshot order */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ApuState {
    pub status: u8,
    pub frame_sequencer: FrameSequencer,
    pub odd_cpu_cycle: bool,
    pub sample_phase: u32,
    pub pulse1: Pulse,
    pub pulse2: Pulse,
}

impl APU {
    pub fn new(sample_rate: u32) -> APU {
        APU {
            pulse1: Pulse::new(true),
            pulse2: Pulse::new(false),
            frame_sequencer: FrameSequencer::new(),
            status: 0,
            sample_rate,
            odd_cpu_cycle: false,
            sample_phase: 0,
            samples: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.write_status(0);
        self.frame_sequencer = FrameSequencer::new();
        self.samples.clear();
    }

    /**
     * Runs the channels for `cpu_cycles` processor cycles, one APU cycle per two, and queues a
     * sample each time the output clock comes due. Leftover fractions carry over to the next call.
     */
    pub fn advance(&mut self, cpu_cycles: u32) {
        for _ in 0..cpu_cycles {
            if self.odd_cpu_cycle {
                self.tick();
            }
            self.odd_cpu_cycle = !self.odd_cpu_cycle;
        }
    }

    fn tick(&mut self) {
        let event = self.frame_sequencer.clock();
        self.clock_frame(event);

        if self.status & PULSE_1_ENABLE != 0 {
            self.pulse1.clock_timer();
        }
        if self.status & PULSE_2_ENABLE != 0 {
            self.pulse2.clock_timer();
        }

        self.sample_phase += 2 * self.sample_rate;
        if self.sample_phase >= CLOCK_SPEED {
            self.sample_phase -= CLOCK_SPEED;
            let sample = self.mix();
            self.samples.push(sample);
        }
    }

    fn clock_frame(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::None => (),
            FrameEvent::QuarterFrame => {
                self.pulse1.clock_quarter_frame();
                self.pulse2.clock_quarter_frame();
            }
            FrameEvent::HalfFrame => {
                self.pulse1.clock_quarter_frame();
                self.pulse2.clock_quarter_frame();
                self.pulse1.clock_half_frame();
                self.pulse2.clock_half_frame();
            }
        }
    }

    fn mix(&self) -> i16 {
        let mut level = 0i32;
        if self.status & PULSE_1_ENABLE != 0 {
            level += self.pulse1.output() as i32;
        }
        if self.status & PULSE_2_ENABLE != 0 {
            level += self.pulse2.output() as i32;
        }
        let mixed = (level as f32 * VOLUME_STEP).clamp(-1.0, 1.0);
        (mixed * i16::MAX as f32) as i16
    }

    /* samples produced since the last drain */
    #[cfg(test)]
    pub fn pending_samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn drain_to(&mut self, sink: &mut dyn AudioSink) {
        if !self.samples.is_empty() {
            sink.queue_samples(&self.samples);
            self.samples.clear();
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write_status(&mut self, value: u8) {
        self.status = value & STATUS_WRITE_BITS;
        if self.status & PULSE_1_ENABLE == 0 {
            self.pulse1.disable();
        }
        if self.status & PULSE_2_ENABLE == 0 {
            self.pulse2.disable();
        }
    }

    fn read_status(&self) -> u8 {
        let mut status = 0;
        if self.pulse1.is_active() {
            status |= PULSE_1_ENABLE;
        }
        if self.pulse2.is_active() {
            status |= PULSE_2_ENABLE;
        }
        status
    }

    /* 0x4017 is decoded by the controller port, which forwards writes here */
    pub fn write_frame_counter(&mut self, value: u8) {
        let event = self.frame_sequencer.write(value);
        self.clock_frame(event);
    }

    #[cfg(test)]
    pub fn pulse1(&self) -> &Pulse {
        &self.pulse1
    }

    #[cfg(test)]
    pub fn pulse2(&self) -> &Pulse {
        &self.pulse2
    }

    pub fn state(&self) -> ApuState {
        ApuState {
            status: self.status,
            frame_sequencer: self.frame_sequencer.clone(),
            odd_cpu_cycle: self.odd_cpu_cycle,
            sample_phase: self.sample_phase,
            pulse1: self.pulse1.clone(),
            pulse2: self.pulse2.clone(),
        }
    }

    /**
     * Checks a state read back from outside before it is restored. Names the first part that
     * holds a value the channels could never reach on their own.
     */
    pub fn check_state(state: &ApuState) -> Result<(), &'static str> {
        if !state.frame_sequencer.is_valid() {
            return Err("frame counter");
        }
        if state.sample_phase >= CLOCK_SPEED {
            return Err("sample phase");
        }
        if !state.pulse1.is_valid() {
            return Err("pulse 1");
        }
        if !state.pulse2.is_valid() {
            return Err("pulse 2");
        }
        Ok(())
    }

    pub fn restore(&mut self, state: &ApuState) {
        self.status = state.status & STATUS_WRITE_BITS;
        self.frame_sequencer = state.frame_sequencer.clone();
        self.odd_cpu_cycle = state.odd_cpu_cycle;
        self.sample_phase = state.sample_phase % CLOCK_SPEED;
        self.pulse1 = state.pulse1.clone();
        self.pulse2 = state.pulse2.clone();
        self.samples.clear();
    }
}

impl Peripheral for APU {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            STATUS_ADDRESS => self.read_status(),
            _ => {
                debug!("read from write-only APU register 0x{address:04x}");
                0
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x4000..=0x4003 => self.pulse1.write_register(address - 0x4000, value),
            0x4004..=0x4007 => self.pulse2.write_register(address - 0x4004, value),
            /* triangle, noise and DMC are not emulated */
            0x4008..=0x4013 => debug!("ignored write of 0x{value:02x} to 0x{address:04x}"),
            STATUS_ADDRESS => self.write_status(value),
            FRAME_COUNTER_ADDRESS => self.write_frame_counter(value),
            _ => warn!("APU write to unknown address 0x{address:04x}"),
        }
    }
}
