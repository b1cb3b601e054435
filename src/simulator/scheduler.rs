use crate::config::{buttons_for_keys, FRAME_RATE};
use crate::console::Console;
use crate::ppu::WriteBuffer;
use crate::screenshot::dump_views;
use crate::simulator::render_requester::RenderRequester;
use crate::simulator::SimulatorSignal;
use crate::snapshot::{load_snapshot, save_snapshot};
use log::{error, info, warn};
use std::collections::HashSet;
use std::ops::Add;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use winit::keyboard::Key;

/* if we fall further behind than this, stop trying to catch up */
const MAX_FRAMES_BEHIND: u64 = 5;

pub struct Scheduler {
    console: Console,
    snapshot_path: String,
    view_prefix: String,
    write_buffer: Arc<Mutex<WriteBuffer>>,
    render_requester: Arc<Mutex<RenderRequester>>,
    key_source: Arc<Mutex<HashSet<Key>>>,
    receiver: Receiver<SimulatorSignal>,

    /* only the first error of a halt is worth reporting */
    reported_halt: bool,
}

impl Scheduler {
    pub fn new(
        console: Console,
        snapshot_path: String,
        view_prefix: String,
        write_buffer: Arc<Mutex<WriteBuffer>>,
        render_requester: Arc<Mutex<RenderRequester>>,
        key_source: Arc<Mutex<HashSet<Key>>>,
        receiver: Receiver<SimulatorSignal>,
    ) -> Self {
        Scheduler {
            console,
            snapshot_path,
            view_prefix,
            write_buffer,
            render_requester,
            key_source,
            receiver,
            reported_halt: false,
        }
    }

    /* runs frames at the NTSC rate until told to stop */
    pub fn simulate(&mut self) {
        let mut start_time = Instant::now();
        let mut frames: u64 = 0;

        loop {
            if !self.handle_signals() {
                return;
            }

            self.run_frame();
            frames += 1;

            let now = Instant::now();
            let target = frames_to_time(start_time, frames);
            if target > now {
                thread::sleep(target.duration_since(now));
            } else if duration_to_frames(now.duration_since(target)) > MAX_FRAMES_BEHIND {
                /* e.g. the machine was suspended; pick up from here rather than racing */
                warn!("emulation fell behind, resynchronizing");
                start_time = now;
                frames = 0;
            }
        }
    }

    fn run_frame(&mut self) {
        let buttons = match self.key_source.lock() {
            Ok(keys) => buttons_for_keys(&keys),
            Err(_) => 0,
        };
        self.console.set_buttons(0, buttons);

        match self.console.run_frame() {
            Ok(()) => self.reported_halt = false,
            Err(err) => {
                if !self.reported_halt {
                    error!("emulation halted at frame {}: {err}", self.console.frame_count());
                    self.reported_halt = true;
                }
            }
        }

        if let Ok(mut write_buffer) = self.write_buffer.lock() {
            write_buffer.copy_from_slice(&self.console.frame());
        }
        if let Ok(render_requester) = self.render_requester.lock() {
            render_requester.request_redraw();
        }
    }

    /* false once the window has asked us to stop */
    fn handle_signals(&mut self) -> bool {
        loop {
            match self.receiver.try_recv() {
                /* handle save: hand battery RAM back to be written to the save file */
                Ok(SimulatorSignal::HandleSave(sx)) => {
                    let _ = sx.send(self.console.get_save_data());
                }
                /* success is logged by the snapshot functions themselves */
                Ok(SimulatorSignal::SaveSnapshot) => {
                    if let Err(err) = save_snapshot(&self.console, &self.snapshot_path) {
                        error!("could not save snapshot to {}: {err}", self.snapshot_path);
                    }
                }
                Ok(SimulatorSignal::LoadSnapshot) => {
                    if let Err(err) = load_snapshot(&mut self.console, &self.snapshot_path) {
                        error!("could not load snapshot from {}: {err}", self.snapshot_path);
                    }
                }
                Ok(SimulatorSignal::Reset) => self.console.reset(),
                Ok(SimulatorSignal::DumpViews) => match dump_views(&self.console, &self.view_prefix) {
                    Ok(paths) => info!("wrote {}", paths.join(", ")),
                    Err(err) => error!("could not write views: {err}"),
                },
                /* end simulation: break the loop */
                Ok(SimulatorSignal::EndSimulation) | Err(TryRecvError::Disconnected) => return false,
                Err(TryRecvError::Empty) => return true,
            }
        }
    }
}

/**
 * Given a starting time and a number of frames, returns the time at which that many frames
 * have passed since the start time.
 */
fn frames_to_time(start_time: Instant, frames: u64) -> Instant {
    start_time.add(Duration::from_secs_f64(frames as f64 / FRAME_RATE))
}

/* whole frames in a duration */
fn duration_to_frames(duration: Duration) -> u64 {
    (duration.as_secs_f64() * FRAME_RATE) as u64
}
