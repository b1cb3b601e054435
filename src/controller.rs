use crate::apu::APU;
use crate::bus::Peripheral;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

/* button bits, in the order the shift register reports them */
pub const BUTTON_A: u8 = 0x01;
pub const BUTTON_B: u8 = 0x02;
pub const BUTTON_SELECT: u8 = 0x04;
pub const BUTTON_START: u8 = 0x08;
pub const BUTTON_UP: u8 = 0x10;
pub const BUTTON_DOWN: u8 = 0x20;
pub const BUTTON_LEFT: u8 = 0x40;
pub const BUTTON_RIGHT: u8 = 0x80;

pub const CONTROLLER_1_ADDRESS: u16 = 0x4016;
pub const CONTROLLER_2_ADDRESS: u16 = 0x4017;

/**
 * A standard joypad. While the strobe is high the shift register keeps reloading from the
 * buttons; once it drops, each read returns the next button, A first, and 1s after the eighth.
 */
#[derive(Debug, Clone, Default)]
pub struct Controller {
    buttons: u8,
    shift: u8,
    strobe: bool,
}

impl Controller {
    pub fn new() -> Controller {
        Controller::default()
    }

    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons;
        if self.strobe {
            self.shift = buttons;
        }
    }

    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.shift = self.buttons;
        }
    }

    pub fn read_next(&mut self) -> u8 {
        if self.strobe {
            return self.buttons & 1;
        }
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }
}

/**
 * 0x4016-0x4017 on the processor bus. Reads come from the two joypads; a write to 0x4016
 * strobes both of them, while a write to 0x4017 belongs to the APU's frame counter and is
 * passed along.
 */
pub struct IoPort {
    controllers: [Controller; 2],
    apu: Rc<RefCell<APU>>,
}

impl IoPort {
    pub fn new(apu: Rc<RefCell<APU>>) -> IoPort {
        IoPort {
            controllers: [Controller::new(), Controller::new()],
            apu,
        }
    }

    /* `port` is 0 or 1 */
    pub fn set_buttons(&mut self, port: usize, buttons: u8) {
        match self.controllers.get_mut(port) {
            Some(controller) => controller.set_buttons(buttons),
            None => warn!("no controller port {port}"),
        }
    }
}

impl Peripheral for IoPort {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            CONTROLLER_1_ADDRESS => self.controllers[0].read_next(),
            CONTROLLER_2_ADDRESS => self.controllers[1].read_next(),
            _ => {
                warn!("controller read from 0x{address:04x}");
                0
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            CONTROLLER_1_ADDRESS => {
                for controller in self.controllers.iter_mut() {
                    controller.write_strobe(value);
                }
            }
            CONTROLLER_2_ADDRESS => match self.apu.try_borrow_mut() {
                Ok(mut apu) => apu.write_frame_counter(value),
                Err(_) => debug!("frame counter write of 0x{value:02x} dropped"),
            },
            _ => warn!("controller write of 0x{value:02x} to 0x{address:04x}"),
        }
    }
}
