use crate::ppu::Mirroring;
use log::{info, warn};
use std::{fs, io};
use thiserror::Error;

pub const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 1 << 14; /* 16k */
pub const CHR_BANK_SIZE: usize = 1 << 13; /* 8k */

const MAGIC: &[u8; 4] = b"NES\x1A";

/* flag 6 bits */
const FLAG_VERTICAL_MIRRORING: u8 = 0x01;
const FLAG_BATTERY: u8 = 0x02;
const FLAG_TRAINER: u8 = 0x04;
const FLAG_FOUR_SCREEN: u8 = 0x08;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("could not read image: {0}")]
    Io(#[from] io::Error),
    #[error("not an iNES image (header starts {0:02x?})")]
    BadMagic(Vec<u8>),
    #[error("image is truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
    #[error("{0} bytes of PRG ROM is not supported by this mapper")]
    UnsupportedPrgSize(usize),
}

/* a parsed iNES image */
#[derive(Debug, Clone)]
pub struct Rom {
    pub prg_data: Vec<u8>,
    pub chr_data: Vec<u8>,
    pub byte_6_flags: u8,
    pub byte_7_flags: u8,
}

impl Rom {
    pub fn parse_file(path: &str) -> Result<Rom, RomError> {
        info!("loading {path}");
        let rom_data = fs::read(path)?;
        Rom::read_rom_data(&rom_data)
    }

    pub fn read_rom_data(rom_data: &[u8]) -> Result<Rom, RomError> {
        if rom_data.len() < HEADER_SIZE {
            return Err(RomError::Truncated {
                expected: HEADER_SIZE,
                actual: rom_data.len(),
            });
        }

        let header_data = &rom_data[0..4];
        if header_data != MAGIC {
            return Err(RomError::BadMagic(header_data.to_vec()));
        }

        /* PRG ROM is in 16k increments, CHR ROM in 8k (and can be zero, meaning CHR RAM) */
        let prg_rom_size = (rom_data[4] as usize) * PRG_BANK_SIZE;
        let chr_rom_size = (rom_data[5] as usize) * CHR_BANK_SIZE;
        let byte_6_flags = rom_data[6];
        let byte_7_flags = rom_data[7];

        /* the trainer is only used by copier hardware */
        let prg_rom_start = if byte_6_flags & FLAG_TRAINER != 0 {
            HEADER_SIZE + TRAINER_SIZE
        } else {
            HEADER_SIZE
        };
        let chr_rom_start = prg_rom_start + prg_rom_size;
        let end = chr_rom_start + chr_rom_size;
        if rom_data.len() < end {
            return Err(RomError::Truncated {
                expected: end,
                actual: rom_data.len(),
            });
        }
        if rom_data.len() > end {
            warn!("{} bytes past the end of CHR ROM ignored", rom_data.len() - end);
        }

        let rom = Rom {
            prg_data: rom_data[prg_rom_start..chr_rom_start].to_vec(),
            chr_data: rom_data[chr_rom_start..end].to_vec(),
            byte_6_flags,
            byte_7_flags,
        };

        info!(
            "mapper {}, PRG {}k, CHR {}k, {:?} mirroring{}",
            rom.mapper_number(),
            rom.prg_data.len() / 1024,
            rom.chr_data.len() / 1024,
            rom.mirroring(),
            if rom.has_battery() { ", battery" } else { "" }
        );
        Ok(rom)
    }

    /* low nibble from flag 6, high nibble from flag 7 */
    pub fn mapper_number(&self) -> u8 {
        (self.byte_7_flags & 0xf0) | (self.byte_6_flags >> 4)
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.byte_6_flags & FLAG_VERTICAL_MIRRORING != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    pub fn has_battery(&self) -> bool {
        self.byte_6_flags & FLAG_BATTERY != 0
    }

    pub fn has_four_screen(&self) -> bool {
        self.byte_6_flags & FLAG_FOUR_SCREEN != 0
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /* a well-formed image with the given bank counts and flags, PRG filled with its bank number */
    pub fn build_image(prg_banks: u8, chr_banks: u8, flags_6: u8, flags_7: u8) -> Vec<u8> {
        let mut image = vec![0u8; HEADER_SIZE];
        image[0..4].copy_from_slice(MAGIC);
        image[4] = prg_banks;
        image[5] = chr_banks;
        image[6] = flags_6;
        image[7] = flags_7;
        if flags_6 & FLAG_TRAINER != 0 {
            image.extend(vec![0xee; TRAINER_SIZE]);
        }
        for bank in 0..prg_banks {
            image.extend(vec![bank; PRG_BANK_SIZE]);
        }
        image.extend(vec![0xc0; chr_banks as usize * CHR_BANK_SIZE]);
        image
    }

    #[test]
    fn test_parse() {
        let rom = Rom::read_rom_data(&build_image(2, 1, 0x03, 0x00)).unwrap();
        assert_eq!(rom.prg_data.len(), 2 * PRG_BANK_SIZE);
        assert_eq!(rom.prg_data[PRG_BANK_SIZE], 1);
        assert_eq!(rom.chr_data.len(), CHR_BANK_SIZE);
        assert_eq!(rom.mirroring(), Mirroring::Vertical);
        assert!(rom.has_battery());
        assert_eq!(rom.mapper_number(), 0);
    }

    #[test]
    fn test_mapper_number() {
        let rom = Rom::read_rom_data(&build_image(1, 1, 0x10, 0x40)).unwrap();
        assert_eq!(rom.mapper_number(), 0x41);
        assert_eq!(rom.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn test_trainer_skipped() {
        let rom = Rom::read_rom_data(&build_image(1, 0, FLAG_TRAINER, 0)).unwrap();
        assert_eq!(rom.prg_data.len(), PRG_BANK_SIZE);
        assert!(rom.prg_data.iter().all(|byte| *byte == 0));
        assert!(rom.chr_data.is_empty());
    }

    #[test]
    fn test_bad_magic() {
        let mut image = build_image(1, 1, 0, 0);
        image[3] = 0x1b;
        assert!(matches!(Rom::read_rom_data(&image), Err(RomError::BadMagic(_))));
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(
            Rom::read_rom_data(b"NES"),
            Err(RomError::Truncated { expected: 16, actual: 3 })
        ));

        let mut image = build_image(2, 1, 0, 0);
        image.truncate(HEADER_SIZE + PRG_BANK_SIZE);
        assert!(matches!(
            Rom::read_rom_data(&image),
            Err(RomError::Truncated { actual, .. }) if actual == HEADER_SIZE + PRG_BANK_SIZE
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Rom::parse_file("/nonexistent/image.nes"),
            Err(RomError::Io(_))
        ));
    }
}
