#[allow(clippy::module_inception)]
mod mapper;
mod nrom;

pub use mapper::Mapper;
pub use nrom::{NROM, PRG_RAM_SIZE};

use crate::rom::{Rom, RomError};

pub fn load_mapper(rom: &Rom) -> Result<Box<dyn Mapper>, RomError> {
    match rom.mapper_number() {
        0 => Ok(Box::new(NROM::new(rom)?)), /* nrom */
        mapper_num => Err(RomError::UnsupportedMapper(mapper_num)),
    }
}
