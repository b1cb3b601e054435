use crate::bus::Peripheral;
use log::{debug, warn};

/**
 * A flat block of bytes attached to a bus at `base`. The backing store may be smaller than the
 * range it is attached to: addresses past the end alias back onto the start through
 * `mirror_mask`, which is how the 2KB of work RAM covers 0x0000-0x1fff and a 16KB program ROM
 * covers 0x8000-0xffff.
 */
pub struct Memory {
    base: u16,
    data: Vec<u8>,
    mirror_mask: usize,
    read_only: bool,
}

impl Memory {
    /* size must be a power of two */
    pub fn new(base: u16, size: usize) -> Memory {
        Self::from_bytes(base, vec![0; size])
    }

    pub fn from_bytes(base: u16, data: Vec<u8>) -> Memory {
        debug_assert!(data.len().is_power_of_two(), "memory size must be a power of two");
        Memory {
            base,
            mirror_mask: data.len() - 1,
            data,
            read_only: false,
        }
    }

    /* same as from_bytes, but writes from the bus are ignored */
    pub fn rom(base: u16, data: Vec<u8>) -> Memory {
        Memory {
            read_only: true,
            ..Self::from_bytes(base, data)
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /* copies `data` over the start of the backing store, as much of it as fits */
    pub fn load(&mut self, data: &[u8]) {
        let len = data.len().min(self.data.len());
        self.data[..len].copy_from_slice(&data[..len]);
    }

    /**
     * Loads a text hex dump of the form "0600: a9 01 8d 00 02 ...". A token ending in ':' moves
     * the write position to that (bus) address; two-digit tokens are bytes written in order.
     * Anything else is skipped with a warning. Returns the number of bytes written.
     */
    pub fn load_hex_dump(&mut self, dump: &str) -> usize {
        let mut address = self.base;
        let mut written = 0;

        for token in dump.split_whitespace() {
            if let Some(offset) = token.strip_suffix(':') {
                match u16::from_str_radix(offset, 16) {
                    Ok(offset) => address = offset,
                    Err(_) => warn!("hex dump: bad offset {token}"),
                }
            } else if token.len() == 2 {
                match u8::from_str_radix(token, 16) {
                    Ok(value) => {
                        let index = self.index(address);
                        self.data[index] = value;
                        address = address.wrapping_add(1);
                        written += 1;
                    }
                    Err(_) => warn!("hex dump: bad byte {token}"),
                }
            } else {
                warn!("hex dump: unrecognized token {token}");
            }
        }

        written
    }

    fn index(&self, address: u16) -> usize {
        (address.wrapping_sub(self.base) as usize) & self.mirror_mask
    }
}

impl Peripheral for Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.data[self.index(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        if self.read_only {
            debug!("ignoring write of 0x{value:02x} to read-only 0x{address:04x}");
            return;
        }
        let index = self.index(address);
        self.data[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirroring() {
        let mut ram = Memory::new(0x0000, 0x800);
        ram.write(0x0001, 0x11);
        /* 2KB of work RAM repeats four times across 0x0000-0x1fff */
        assert_eq!(ram.read(0x0801), 0x11);
        assert_eq!(ram.read(0x1001), 0x11);
        assert_eq!(ram.read(0x1801), 0x11);
        ram.write(0x1fff, 0x22);
        assert_eq!(ram.read(0x07ff), 0x22);
    }

    #[test]
    fn test_based_mirroring() {
        /* a 16KB program image mirrored into the top 32KB */
        let mut prg = vec![0u8; 0x4000];
        prg[0] = 0xaa;
        prg[0x3ffc] = 0x34;
        let mut rom = Memory::rom(0x8000, prg);
        assert_eq!(rom.read(0x8000), 0xaa);
        assert_eq!(rom.read(0xc000), 0xaa);
        assert_eq!(rom.read(0xfffc), 0x34);
    }

    #[test]
    fn test_read_only() {
        let mut rom = Memory::rom(0x8000, vec![0x55; 0x4000]);
        rom.write(0x8000, 0x00);
        assert_eq!(rom.read(0x8000), 0x55);
    }

    #[test]
    fn test_hex_dump() {
        let mut ram = Memory::new(0x0000, 0x10000);
        let written = ram.load_hex_dump("0600: a9 01 8d 00 02 0610: ea zz 60");
        assert_eq!(written, 7);
        assert_eq!(&ram.bytes()[0x600..0x605], &[0xa9, 0x01, 0x8d, 0x00, 0x02]);
        assert_eq!(ram.bytes()[0x610], 0xea);
        /* the bad token is skipped, the next byte keeps its place */
        assert_eq!(ram.bytes()[0x611], 0x60);
    }
}
