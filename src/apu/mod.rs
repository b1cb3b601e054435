#[allow(clippy::module_inception)]
mod apu;
mod envelope;
mod frame_sequencer;
mod length_counter;
mod pulse;
mod sweep;
mod timer;

#[cfg(test)]
mod tests;

pub use apu::{ApuState, APU, DEFAULT_SAMPLE_RATE, FRAME_COUNTER_ADDRESS};
pub use frame_sequencer::{FrameEvent, FrameSequencer};
pub use length_counter::LENGTH_COUNTER_LOOKUP;
pub use pulse::Pulse;

/* where finished samples go: the sound card, a file, or nowhere */
pub trait AudioSink {
    fn queue_samples(&mut self, samples: &[i16]);
}

/* for running muted */
pub struct NullSink;

impl AudioSink for NullSink {
    fn queue_samples(&mut self, _samples: &[i16]) {}
}

impl AudioSink for Vec<i16> {
    fn queue_samples(&mut self, samples: &[i16]) {
        self.extend_from_slice(samples);
    }
}
