use crate::apu::{ApuState, APU};
use crate::console::{Console, WORK_RAM_SIZE};
use crate::cpu::CpuState;
use crate::mapper::PRG_RAM_SIZE;
use crate::ppu::PpuState;
use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit};
use bincode::{Decode, Encode};
use log::info;
use std::{fs, io};
use thiserror::Error;

pub const SNAPSHOT_EXTENSION: &str = ".snp";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("could not decode snapshot: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("snapshot has {0} unexpected trailing bytes")]
    TrailingData(usize),
    #[error("snapshot audio state is out of range: {0}")]
    OutOfRange(&'static str),
}

/**
 * The whole session, field by field in file order: memory, then the processor, video and
 * audio state. Arrays are written without length prefixes and integers at fixed width, so the
 * layout depends only on this order.
 */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub work_ram: [u8; WORK_RAM_SIZE],
    pub prg_ram: [u8; PRG_RAM_SIZE],
    pub cpu: CpuState,
    pub ppu: PpuState,
    pub apu: ApuState,
}

fn config() -> Configuration<LittleEndian, Fixint, NoLimit> {
    bincode::config::standard().with_fixed_int_encoding()
}

/* the image path with the snapshot extension added */
pub fn default_path(rom_path: &str) -> String {
    format!("{rom_path}{SNAPSHOT_EXTENSION}")
}

pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::encode_to_vec(snapshot, config())?)
}

pub fn decode(bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
    let (snapshot, read) = bincode::decode_from_slice::<Snapshot, _>(bytes, config())?;
    if read != bytes.len() {
        return Err(SnapshotError::TrailingData(bytes.len() - read));
    }
    APU::check_state(&snapshot.apu).map_err(SnapshotError::OutOfRange)?;
    Ok(snapshot)
}

pub fn save_snapshot(console: &Console, path: &str) -> Result<(), SnapshotError> {
    let bytes = encode(&console.snapshot())?;
    fs::write(path, bytes)?;
    info!("saved snapshot to {path}");
    Ok(())
}

/* nothing in the console changes unless the whole file decodes */
pub fn load_snapshot(console: &mut Console, path: &str) -> Result<(), SnapshotError> {
    let snapshot = decode(&fs::read(path)?)?;
    console.restore(&snapshot);
    info!("loaded snapshot from {path}");
    Ok(())
}
