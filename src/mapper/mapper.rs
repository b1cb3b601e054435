use crate::bus::Bus;
use crate::memory::Memory;
use crate::ppu::Mirroring;

/**
 * Cartridge hardware: decides what the processor sees at 0x6000-0xffff and what the video
 * chip sees at 0x0000-0x1fff.
 */
pub trait Mapper {
    /* attaches PRG RAM and PRG ROM to the processor bus */
    fn attach(&self, cpu_bus: &Bus);

    /* whatever answers 0x0000-0x1fff on the video bus */
    fn pattern_table(&self) -> Memory;

    fn mirroring(&self) -> Mirroring;

    /**
     * Returns the current value of the data that would be saved in RAM, if it exists,
     * or None if this mapper doesn't support it.
     */
    fn get_save_data(&self) -> Option<Vec<u8>> {
        None
    }

    /**
     * Sets the current save RAM data. If the mapper does not support save RAM,
     * this has no effect.
     */
    fn set_save_data(&mut self, _data: &[u8]) {}
}
