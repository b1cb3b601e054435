use bincode::{Decode, Encode};

/* an 11-bit down counter that reloads from `period` when it runs out */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub period: u16,
    pub count: u16,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            period: 0,
            count: 0,
        }
    }

    /* both halves fit in 11 bits */
    pub fn is_valid(&self) -> bool {
        self.period <= 0x7ff && self.count <= 0x7ff
    }

    /* Returns true if the timer looped */
    pub fn clock(&mut self) -> bool {
        if self.count == 0 {
            self.count = self.period;
            true
        } else {
            self.count -= 1;
            false
        }
    }

    pub fn set_timer_lo(&mut self, data: u8) {
        self.period = (self.period & 0xff00) | (data as u16);
    }

    pub fn set_timer_hi(&mut self, data: u8) {
        self.period = (self.period & 0xff) | (((data as u16) & 0x7) << 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_period() {
        let mut timer = Timer::new();
        timer.set_timer_lo(0xff);
        timer.set_timer_hi(0xfd);
        /* only three bits of the high write are used */
        assert_eq!(timer.period, 0x5ff);

        timer.period = 2;
        assert!(timer.clock());
        assert!(!timer.clock());
        assert!(!timer.clock());
        assert!(timer.clock());
    }
}
