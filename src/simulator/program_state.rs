use crate::apu::{AudioSink, NullSink};
use crate::audio::{QueueSink, SampleQueue};
use crate::config::EmulatorConfig;
use crate::console::Console;
use crate::ppu::{WriteBuffer, WRITE_BUFFER_SIZE};
use crate::rom::Rom;
use crate::simulator::render_requester::RenderRequester;
use crate::simulator::scheduler::Scheduler;
use crate::simulator::SimulatorSignal;
use crate::snapshot::load_snapshot;
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use std::{fs, thread};
use winit::keyboard::Key;

/* how long the window side waits for the emulation thread to hand over save data */
const SAVE_TIMEOUT: Duration = Duration::from_secs(2);

/* everything the emulation thread needs to start a session */
pub struct SessionOptions {
    pub config: EmulatorConfig,
    pub savefile: Option<String>,
    pub snapshot_path: String,
    /* screenshots and debug views are written as <view_prefix>.*.png */
    pub view_prefix: String,
    /* restore this snapshot before the first frame */
    pub load_snapshot_at_start: bool,
    pub audio_queue: Option<SampleQueue>,
}

/**
 * Provides an external view into a running emulator state. The console (processor, video,
 * audio, memory) is built and run on its own thread; this handles all thread communication, as
 * well as joining when complete.
 */
pub struct ProgramState {
    /* inputs */
    pub render_requester: Arc<Mutex<RenderRequester>>,
    pub key_source: Arc<Mutex<HashSet<Key>>>,

    /* outputs */
    pub write_buffer: Arc<Mutex<WriteBuffer>>,
    pub thread_handle: Option<JoinHandle<()>>,

    /* communication */
    thread_sender: Sender<SimulatorSignal>,
}

impl ProgramState {
    pub fn simulate_async(rom: Rom, options: SessionOptions, key_source: Arc<Mutex<HashSet<Key>>>) -> ProgramState {
        let write_buffer = Arc::new(Mutex::new([0; WRITE_BUFFER_SIZE]));
        let render_requester = Arc::new(Mutex::new(RenderRequester::new()));

        let (thread_sender, thread_receiver) = channel::<SimulatorSignal>();

        let mut result = ProgramState {
            key_source,
            write_buffer,
            render_requester,
            thread_sender,
            thread_handle: None,
        };

        result.simulate_async_internal(rom, options, thread_receiver);

        result
    }

    fn simulate_async_internal(&mut self, rom: Rom, options: SessionOptions, thread_receiver: Receiver<SimulatorSignal>) {
        let write_buffer = self.write_buffer.clone();
        let render_requester = self.render_requester.clone();
        let key_source = self.key_source.clone();

        self.thread_handle = Some(thread::spawn(move || {
            let audio_sink: Box<dyn AudioSink> = match options.audio_queue {
                Some(queue) if !options.config.mute => Box::new(QueueSink::new(queue)),
                _ => Box::new(NullSink),
            };

            /* the image was already parsed, so only the mapper can refuse it here */
            let mut console = match Console::new(&rom, &options.config, audio_sink) {
                Ok(console) => console,
                Err(err) => {
                    error!("could not start: {err}");
                    return;
                }
            };

            if let Some(save_data) = Self::load_save_data(&options.savefile) {
                console.set_save_data(&save_data);
            }

            if options.load_snapshot_at_start {
                match load_snapshot(&mut console, &options.snapshot_path) {
                    Ok(()) => info!("restored {}", options.snapshot_path),
                    Err(err) => warn!("could not restore {}: {err}", options.snapshot_path),
                }
            }

            let mut scheduler = Scheduler::new(
                console,
                options.snapshot_path,
                options.view_prefix,
                write_buffer,
                render_requester,
                key_source,
                thread_receiver,
            );

            scheduler.simulate();
        }));
    }

    /* for the window side to send control signals from key presses */
    pub fn signal_sender(&self) -> Sender<SimulatorSignal> {
        self.thread_sender.clone()
    }

    /* battery-backed RAM from the running session, if the cartridge has any */
    pub fn handle_save(&self) -> Option<Vec<u8>> {
        let (sx, rx) = channel();

        self.thread_sender.send(SimulatorSignal::HandleSave(sx)).ok()?;
        match rx.recv_timeout(SAVE_TIMEOUT) {
            Ok(save_data) => save_data,
            Err(err) => {
                warn!("no save data from the emulation thread: {err}");
                None
            }
        }
    }

    pub fn cleanup(&mut self) {
        if let Some(thread_handle) = self.thread_handle.take() {
            /* tell the simulator thread to stop simulating */
            let _ = self.thread_sender.send(SimulatorSignal::EndSimulation);

            /* should be ready for joining soon, wait until then */
            if thread_handle.join().is_err() {
                error!("emulation thread panicked");
            }
        }
    }

    fn load_save_data(savefile: &Option<String>) -> Option<Vec<u8>> {
        let path = savefile.as_ref()?;
        match fs::read(path) {
            Ok(data) => {
                info!("loaded {} bytes of save data from {path}", data.len());
                Some(data)
            }
            Err(err) => {
                info!("no save data loaded from {path}: {err}");
                None
            }
        }
    }
}
