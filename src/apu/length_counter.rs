use bincode::{Decode, Encode};

#[rustfmt::skip]
pub const LENGTH_COUNTER_LOOKUP : [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6,
    160, 8, 60, 10, 14, 12, 26, 14,
    12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30
];

/* counts down on half frames and silences the channel when it reaches zero */
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct LengthCounter {
    count: u8,
    halt: bool,
}

impl LengthCounter {
    pub fn new() -> LengthCounter {
        LengthCounter {
            count: 0,
            halt: false,
        }
    }

    pub fn clock(&mut self) {
        if !self.halt && self.count != 0 {
            self.count -= 1;
        }
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /* the top five bits of a register 3 write index the table */
    pub fn set_lc(&mut self, data: u8) {
        self.count = LENGTH_COUNTER_LOOKUP[(data >> 3) as usize];
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_runs_out() {
        for index in [0u8, 1, 3, 12, 31] {
            let mut counter = LengthCounter::new();
            counter.set_lc(index << 3);
            let expected = LENGTH_COUNTER_LOOKUP[index as usize];
            assert_eq!(counter.count(), expected);

            for _ in 1..expected {
                counter.clock();
            }
            assert!(counter.is_active());
            counter.clock();
            assert!(!counter.is_active());
        }
    }

    #[test]
    fn test_halt() {
        let mut counter = LengthCounter::new();
        counter.set_lc(0x18);
        counter.set_halt(true);
        counter.clock();
        assert_eq!(counter.count(), 2);
        counter.set_halt(false);
        counter.clock();
        assert_eq!(counter.count(), 1);
    }
}
