use crate::bus::Bus;
use crate::mapper::Mapper;
use crate::memory::Memory;
use crate::ppu::{Mirroring, PATTERN_TABLE_SIZE};
use crate::rom::{Rom, RomError, PRG_BANK_SIZE};
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

pub const PRG_RAM_SIZE: usize = 1 << 13; /* 8kb at 0x6000 */

/**
 * Mapper 0: no bank switching. 16kb of PRG ROM is mirrored across 0x8000-0xffff, 32kb fills
 * it; CHR is a single 8kb bank of ROM, or RAM when the image has none.
 */
pub struct NROM {
    prg_rom: Rc<RefCell<Memory>>,
    prg_ram: Rc<RefCell<Memory>>,
    chr_data: Vec<u8>,
    mirroring: Mirroring,
}

impl NROM {
    pub fn new(rom: &Rom) -> Result<NROM, RomError> {
        let prg_size = rom.prg_data.len();
        if prg_size != PRG_BANK_SIZE && prg_size != 2 * PRG_BANK_SIZE {
            return Err(RomError::UnsupportedPrgSize(prg_size));
        }

        let mut chr_data = rom.chr_data.clone();
        if chr_data.len() > PATTERN_TABLE_SIZE {
            warn!("NROM: {} bytes of CHR ROM, only the first 8kb are visible", chr_data.len());
            chr_data.truncate(PATTERN_TABLE_SIZE);
        }
        if rom.has_four_screen() {
            warn!("NROM: four-screen layout not supported, using {:?} mirroring", rom.mirroring());
        }

        Ok(NROM {
            prg_rom: Rc::new(RefCell::new(Memory::rom(0x8000, rom.prg_data.clone()))),
            prg_ram: Rc::new(RefCell::new(Memory::new(0x6000, PRG_RAM_SIZE))),
            chr_data,
            mirroring: rom.mirroring(),
        })
    }
}

impl Mapper for NROM {
    fn attach(&self, cpu_bus: &Bus) {
        cpu_bus.attach_peripheral(0x6000, 0x7fff, self.prg_ram.clone());
        cpu_bus.attach_peripheral(0x8000, 0xffff, self.prg_rom.clone());
    }

    fn pattern_table(&self) -> Memory {
        if self.chr_data.is_empty() {
            Memory::new(0x0000, PATTERN_TABLE_SIZE)
        } else {
            Memory::rom(0x0000, self.chr_data.clone())
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn get_save_data(&self) -> Option<Vec<u8>> {
        Some(self.prg_ram.borrow().bytes().to_vec())
    }

    fn set_save_data(&mut self, data: &[u8]) {
        if data.len() != PRG_RAM_SIZE {
            warn!("NROM: save data is {} bytes, expected {PRG_RAM_SIZE}", data.len());
        }
        self.prg_ram.borrow_mut().load(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::tests::build_image;

    fn nrom(prg_banks: u8, chr_banks: u8) -> NROM {
        let rom = Rom::read_rom_data(&build_image(prg_banks, chr_banks, 0x01, 0)).unwrap();
        NROM::new(&rom).unwrap()
    }

    #[test]
    fn test_16k_mirrored() {
        let bus = Bus::new("test");
        let mapper = nrom(1, 1);
        mapper.attach(&bus);
        mapper.prg_rom.borrow_mut().bytes_mut()[0x3ffc] = 0x12;

        assert_eq!(bus.read(0xbffc), 0x12);
        assert_eq!(bus.read(0xfffc), 0x12);
    }

    #[test]
    fn test_32k() {
        let bus = Bus::new("test");
        let mapper = nrom(2, 1);
        mapper.attach(&bus);
        assert_eq!(bus.read(0x8000), 0);
        assert_eq!(bus.read(0xc000), 1);

        /* ROM ignores writes */
        bus.write(0xc000, 0x55);
        assert_eq!(bus.read(0xc000), 1);
    }

    #[test]
    fn test_prg_ram() {
        let bus = Bus::new("test");
        let mut mapper = nrom(1, 1);
        mapper.attach(&bus);
        bus.write(0x6010, 0x77);
        let save = mapper.get_save_data().unwrap();
        assert_eq!(save.len(), PRG_RAM_SIZE);
        assert_eq!(save[0x10], 0x77);

        let mut replacement = vec![0; PRG_RAM_SIZE];
        replacement[0x1fff] = 0x99;
        mapper.set_save_data(&replacement);
        assert_eq!(bus.read(0x7fff), 0x99);
        assert_eq!(bus.read(0x6010), 0x00);
    }

    #[test]
    fn test_pattern_table() {
        let mut chr_rom = nrom(1, 1).pattern_table();
        assert_eq!(chr_rom.bytes()[0], 0xc0);
        crate::bus::Peripheral::write(&mut chr_rom, 0x0000, 0x01);
        assert_eq!(chr_rom.bytes()[0], 0xc0);

        let mut chr_ram = nrom(1, 0).pattern_table();
        assert_eq!(chr_ram.bytes().len(), PATTERN_TABLE_SIZE);
        crate::bus::Peripheral::write(&mut chr_ram, 0x0000, 0x01);
        assert_eq!(chr_ram.bytes()[0], 0x01);
    }

    #[test]
    fn test_bad_prg_size() {
        let rom = Rom::read_rom_data(&build_image(3, 1, 0, 0)).unwrap();
        assert!(matches!(NROM::new(&rom), Err(RomError::UnsupportedPrgSize(size)) if size == 3 * PRG_BANK_SIZE));
    }
}
