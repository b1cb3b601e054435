use clap::Parser;
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::process::exit;
use std::sync::{Arc, Mutex, RwLock};
use tracing_subscriber::EnvFilter;

mod cpu;

mod rom;
use crate::audio::AudioOutput;
use crate::config::{parse_patch, EmulatorConfig};
use crate::console::run_bare_program;
use crate::key_event_handler::KeyEventHandler;
use rom::{Rom, RomError};
use simulator::program_state::{ProgramState, SessionOptions};

mod apu;
mod audio;
mod bus;
mod config;
mod console;
mod controller;
mod key_event_handler;
mod mapper;
mod memory;
mod ppu;
mod simulator;
mod screenshot;
mod snapshot;
mod window;

fn main() -> Result<(), Box<dyn Error>> {
    let args = CommandLineArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verdigris=info")))
        .init();

    let config = args.emulator_config();

    if let Some(hex_dump) = &args.hex_dump {
        return run_hex_dump(hex_dump, &config, args.max_steps);
    }

    let Some(rom_path) = args.rom.clone() else {
        error!("no image given; pass a .nes file or --hex-dump");
        exit(2);
    };
    let rom = load_image(&rom_path)?;

    /* the output stream has to outlive the session, so it stays on this thread */
    let audio_output = if config.mute { None } else { AudioOutput::open(config.sample_rate) };

    let keys = Arc::new(Mutex::new(HashSet::new()));

    let options = SessionOptions {
        config,
        savefile: args.savefile.clone(),
        load_snapshot_at_start: args.snapshot.is_some(),
        snapshot_path: args.snapshot.clone().unwrap_or_else(|| snapshot::default_path(&rom_path)),
        view_prefix: rom_path.clone(),
        audio_queue: audio_output.as_ref().map(AudioOutput::queue),
    };

    let program_state = Arc::new(RwLock::new(ProgramState::simulate_async(rom, options, keys.clone())));

    let (write_buffer, render_requester, signals) = {
        let program_state = program_state.read().map_err(|_| "session lock poisoned")?;
        (
            program_state.write_buffer.clone(),
            program_state.render_requester.clone(),
            program_state.signal_sender(),
        )
    };
    let key_event_handler = KeyEventHandler::new(keys, signals);

    if let Some(savefile) = args.savefile.clone() {
        let handler_clone = program_state.clone();
        let installed = ctrlc::set_handler(move || {
            if let Ok(program_state) = handler_clone.read() {
                run_on_exit(&savefile, &program_state);
            }
            exit(0);
        });
        if let Err(err) = installed {
            warn!("battery RAM won't be saved on Ctrl-C: {err}");
        }
    }

    let result = window::initialize_ui(write_buffer, key_event_handler, render_requester);

    if let Ok(mut program_state) = program_state.write() {
        if let Some(savefile) = &args.savefile {
            run_on_exit(savefile, &program_state);
        }
        program_state.cleanup();
    }

    result.map_err(|err| err.into())
}

/* parses the image and makes sure a mapper can run it, before any window or thread exists */
fn load_image(path: &str) -> Result<Rom, RomError> {
    let rom = Rom::parse_file(path)?;
    mapper::load_mapper(&rom)?;
    info!("mapper {}, {}KB PRG, {}KB CHR", rom.mapper_number(), rom.prg_data.len() / 1024, rom.chr_data.len() / 1024);
    Ok(rom)
}

fn run_on_exit(savefile: &str, program_state: &ProgramState) {
    if let Some(save_data) = program_state.handle_save() {
        match fs::write(savefile, save_data) {
            Ok(_) => info!("wrote save data to {savefile}"),
            Err(x) => {
                error!("Failed to write to save file {savefile}: {x}");
            }
        }
    }
}

fn run_hex_dump(path: &str, config: &EmulatorConfig, max_steps: u64) -> Result<(), Box<dyn Error>> {
    let dump = fs::read_to_string(path)?;
    let run = run_bare_program(&dump, config, max_steps);
    let cpu = &run.cpu;

    match &run.stopped_by {
        Some(err) => info!("stopped after {} instructions: {err}", run.steps),
        None => info!("step limit of {} instructions reached", run.steps),
    }
    info!(
        "A={:02x} X={:02x} Y={:02x} P={:02x} SP={:02x} PC={:04x}",
        cpu.accumulator, cpu.index_x, cpu.index_y, cpu.status, cpu.s_register, cpu.program_counter
    );
    Ok(())
}

/// An NES emulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CommandLineArgs {
    /// iNES image (.nes)
    #[arg(required_unless_present = "hex_dump")]
    rom: Option<String>,

    /// save file for games with battery-backed saves
    #[arg(short, long)]
    savefile: Option<String>,

    /// snapshot file to restore at start and to use for F5/F9 (default: <rom>.snp)
    #[arg(long)]
    snapshot: Option<String>,

    /// log every instruction at trace level
    #[arg(long)]
    trace: bool,

    /// run BRK as an interrupt instead of stopping the processor
    #[arg(long)]
    brk_interrupt: bool,

    /// audio output sample rate, 8000-192000
    #[arg(long, default_value_t = apu::DEFAULT_SAMPLE_RATE, value_parser = clap::value_parser!(u32).range(8_000..=192_000))]
    sample_rate: u32,

    /// no audio output
    #[arg(long)]
    mute: bool,

    /// make reads of ADDR always return VALUE (hex, e.g. 075a=08); repeatable
    #[arg(long, value_parser = parse_patch)]
    patch: Vec<(u16, u8)>,

    /// run a bare 6502 program from a hex dump ("0600: a9 01 ...") with no video
    #[arg(long)]
    hex_dump: Option<String>,

    /// instruction limit for --hex-dump
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,
}

impl CommandLineArgs {
    fn emulator_config(&self) -> EmulatorConfig {
        EmulatorConfig {
            trace_instructions: self.trace,
            brk_halts: !self.brk_interrupt,
            sample_rate: self.sample_rate,
            mute: self.mute,
            patches: self.patch.clone(),
        }
    }
}
