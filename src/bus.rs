use log::{error, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/* the most devices a single bus will route to */
pub const MAX_PERIPHERALS: usize = 8;

/* returned for reads nothing answers */
pub const OPEN_BUS: u8 = 0xff;

/**
 * Anything that can be attached to a bus. Addresses are passed through untranslated, so a
 * device that cares about offsets subtracts its own base address. Reads take `&mut self`
 * because several registers have side effects when read (status flags, shift registers,
 * buffered data ports).
 */
pub trait Peripheral {
    fn read(&mut self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
}

pub type PeripheralHandle = Rc<RefCell<dyn Peripheral>>;

struct BusEntry {
    start: u16,
    end: u16,
    device: PeripheralHandle,
}

struct BusInner {
    name: &'static str,
    entries: Vec<BusEntry>,
    patches: Vec<(u16, u8)>,
}

/**
 * Routes reads and writes to whichever attached device claims an address. Ranges are scanned
 * in the order they were attached and the first match wins; overlapping ranges are allowed,
 * they just shadow each other.
 *
 * Cloning a Bus produces another handle onto the same routing table.
 */
#[derive(Clone)]
pub struct Bus {
    inner: Rc<RefCell<BusInner>>,
}

/* a non-owning handle, for devices that need to read back through the bus they sit on */
#[derive(Clone)]
pub struct WeakBus {
    inner: Weak<RefCell<BusInner>>,
}

impl Bus {
    pub fn new(name: &'static str) -> Bus {
        Bus {
            inner: Rc::new(RefCell::new(BusInner {
                name,
                entries: Vec::with_capacity(MAX_PERIPHERALS),
                patches: Vec::new(),
            })),
        }
    }

    /* registers a device for the inclusive range start..=end */
    pub fn attach_peripheral(&self, start: u16, end: u16, device: PeripheralHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.entries.len() == MAX_PERIPHERALS {
            error!(
                "{} bus: cannot attach 0x{start:04x}-0x{end:04x}, all {MAX_PERIPHERALS} slots in use",
                inner.name
            );
            return;
        }
        inner.entries.push(BusEntry { start, end, device });
    }

    /* forces every read of `address` to return `value`, whatever is attached there */
    pub fn patch_read(&self, address: u16, value: u8) {
        let mut inner = self.inner.borrow_mut();
        inner.patches.retain(|(patched, _)| *patched != address);
        inner.patches.push((address, value));
    }

    #[cfg(test)]
    pub fn peripheral_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn read(&self, address: u16) -> u8 {
        let inner = self.inner.borrow();

        if let Some((_, value)) = inner.patches.iter().find(|(patched, _)| *patched == address) {
            return *value;
        }

        match inner.find(address) {
            Some(entry) => match entry.device.try_borrow_mut() {
                Ok(mut device) => device.read(address),
                Err(_) => {
                    warn!("{} bus: re-entrant read from 0x{address:04x}", inner.name);
                    OPEN_BUS
                }
            },
            None => {
                warn!("{} bus: unmapped read from 0x{address:04x}", inner.name);
                OPEN_BUS
            }
        }
    }

    pub fn write(&self, address: u16, value: u8) {
        let inner = self.inner.borrow();

        match inner.find(address) {
            Some(entry) => match entry.device.try_borrow_mut() {
                Ok(mut device) => device.write(address, value),
                Err(_) => {
                    warn!("{} bus: re-entrant write to 0x{address:04x}", inner.name);
                }
            },
            None => {
                warn!(
                    "{} bus: unmapped write of 0x{value:02x} to 0x{address:04x}",
                    inner.name
                );
            }
        }
    }

    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl BusInner {
    fn find(&self, address: u16) -> Option<&BusEntry> {
        self.entries
            .iter()
            .find(|entry| entry.start <= address && address <= entry.end)
    }
}

impl WeakBus {
    pub fn read(&self, address: u16) -> u8 {
        match self.inner.upgrade() {
            Some(inner) => Bus { inner }.read(address),
            None => OPEN_BUS,
        }
    }
}
