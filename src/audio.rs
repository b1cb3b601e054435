use crate::apu::AudioSink;
use log::{info, warn};
use rodio::{ChannelCount, OutputStream, SampleRate, Sink, Source};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/* about a fifth of a second at 44.1kHz; older samples are dropped past this */
const MAX_QUEUED_SAMPLES: usize = 8192;

pub type SampleQueue = Arc<Mutex<VecDeque<f32>>>;

/**
 * The sound card end of the audio path. Lives on the thread that opened it; the emulation
 * thread only ever sees the sample queue, through a QueueSink.
 */
pub struct AudioOutput {
    _output_stream: OutputStream, /* dropping the stream stops playback */
    _sink: Sink,
    queue: SampleQueue,
}

impl AudioOutput {
    /* None when there's no usable output device; the emulator then runs silent */
    pub fn open(sample_rate: u32) -> Option<AudioOutput> {
        let output_stream = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                warn!("no audio output, running silent: {err}");
                return None;
            }
        };
        let sink = Sink::connect_new(output_stream.mixer());
        let queue: SampleQueue = Arc::new(Mutex::new(VecDeque::new()));
        sink.append(BufferedMixedSource::new(queue.clone(), sample_rate));
        info!("audio output at {sample_rate}Hz");

        Some(AudioOutput {
            _output_stream: output_stream,
            _sink: sink,
            queue,
        })
    }

    pub fn queue(&self) -> SampleQueue {
        self.queue.clone()
    }
}

/* feeds the APU's samples into the queue the sound card drains */
pub struct QueueSink {
    queue: SampleQueue,
}

impl QueueSink {
    pub fn new(queue: SampleQueue) -> QueueSink {
        QueueSink { queue }
    }
}

impl AudioSink for QueueSink {
    fn queue_samples(&mut self, samples: &[i16]) {
        let Ok(mut queue) = self.queue.lock() else {
            return;
        };
        queue.extend(samples.iter().map(|sample| *sample as f32 / i16::MAX as f32));
        /* if the card falls behind, drop the oldest rather than drift further out of sync */
        let excess = queue.len().saturating_sub(MAX_QUEUED_SAMPLES);
        queue.drain(..excess);
    }
}

pub struct BufferedMixedSource {
    queue: SampleQueue,
    sample_rate: u32,
}

impl BufferedMixedSource {
    fn new(queue: SampleQueue, sample_rate: u32) -> BufferedMixedSource {
        BufferedMixedSource { queue, sample_rate }
    }
}

impl Iterator for BufferedMixedSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        /* a None here ends the stream for good, so an underrun plays silence instead */
        let sample = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        sample.or(Some(0.0))
    }
}

impl Source for BufferedMixedSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        1
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
