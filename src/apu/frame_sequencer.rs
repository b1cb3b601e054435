use bincode::{Decode, Encode};

/* APU cycles at which each step fires */
const FOUR_STEP: [u16; 4] = [3728, 7456, 11185, 14914];
const FIVE_STEP: [u16; 4] = [3728, 7456, 11185, 18640];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    None,
    QuarterFrame, /* envelopes */
    HalfFrame,    /* envelopes, length counters and sweeps */
}

/**
 * Divides the APU clock into the quarter and half frames the channels' slow units run on.
 * The 5-step mode (bit 7 of 0x4017) stretches the sequence with a silent fourth step.
 */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct FrameSequencer {
    counter: u16,
    five_step: bool,
}

impl FrameSequencer {
    pub fn new() -> FrameSequencer {
        FrameSequencer {
            counter: 0,
            five_step: false,
        }
    }

    pub fn clock(&mut self) -> FrameEvent {
        self.counter += 1;
        let steps = if self.five_step { FIVE_STEP } else { FOUR_STEP };

        match steps.iter().position(|step| *step == self.counter) {
            Some(0) | Some(2) => FrameEvent::QuarterFrame,
            Some(1) => FrameEvent::HalfFrame,
            Some(_) => {
                self.counter = 0;
                FrameEvent::HalfFrame
            }
            None => FrameEvent::None,
        }
    }

    /* a 0x4017 write restarts the sequence; 5-step mode also clocks everything right away */
    pub fn write(&mut self, value: u8) -> FrameEvent {
        self.five_step = value & 0x80 != 0;
        self.counter = 0;
        if self.five_step {
            FrameEvent::HalfFrame
        } else {
            FrameEvent::None
        }
    }

    /* the counter never reaches its mode's last step without wrapping */
    pub fn is_valid(&self) -> bool {
        let steps = if self.five_step { FIVE_STEP } else { FOUR_STEP };
        self.counter < steps[steps.len() - 1]
    }

    #[cfg(test)]
    pub fn is_five_step(&self) -> bool {
        self.five_step
    }
}
