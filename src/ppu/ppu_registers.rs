/* the eight registers at 0x2000-0x2007, repeated through 0x3fff */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PPURegister {
    PPUCTRL,
    PPUMASK,
    PPUSTATUS,
    OAMADDR,
    OAMDATA,
    PPUSCROLL,
    PPUADDR,
    PPUDATA,
}

/* on the processor bus rather than in the register window */
pub const OAMDMA_ADDRESS: u16 = 0x4014;

impl PPURegister {
    pub fn address(&self) -> u16 {
        0x2000
            + match self {
                PPURegister::PPUCTRL => 0,
                PPURegister::PPUMASK => 1,
                PPURegister::PPUSTATUS => 2,
                PPURegister::OAMADDR => 3,
                PPURegister::OAMDATA => 4,
                PPURegister::PPUSCROLL => 5,
                PPURegister::PPUADDR => 6,
                PPURegister::PPUDATA => 7,
            }
    }

    /* any address in the window; only the low three bits matter */
    pub fn from_addr(addr: u16) -> PPURegister {
        match addr & 0x7 {
            0 => PPURegister::PPUCTRL,
            1 => PPURegister::PPUMASK,
            2 => PPURegister::PPUSTATUS,
            3 => PPURegister::OAMADDR,
            4 => PPURegister::OAMDATA,
            5 => PPURegister::PPUSCROLL,
            6 => PPURegister::PPUADDR,
            _ => PPURegister::PPUDATA,
        }
    }
}
