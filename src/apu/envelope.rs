use bincode::{Decode, Encode};

#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    decay_level: u8,
    period_or_volume: u8,
    divider: u8,
    constant_volume: bool,
    start_flag: bool,
    loop_flag: bool,
}

impl Envelope {
    pub fn new() -> Envelope {
        Envelope {
            decay_level: 0,
            period_or_volume: 0,
            divider: 0,
            constant_volume: false,
            start_flag: false,
            loop_flag: false,
        }
    }

    /* once per quarter frame */
    pub fn clock(&mut self) {
        /* a restart maxes out the decay level and reloads the divider */
        if self.start_flag {
            self.start_flag = false;
            self.decay_level = 15;
            self.divider = self.period_or_volume;
        /* each time the divider runs out the level drops by one, or wraps back to 15 when
         * looping (the length counter halt bit doubles as the loop flag)
         */
        } else if self.divider == 0 {
            self.divider = self.period_or_volume;
            if self.decay_level == 0 && self.loop_flag {
                self.decay_level = 15;
            } else if self.decay_level > 0 {
                self.decay_level -= 1;
            }
        } else {
            self.divider -= 1;
        }
    }

    pub fn is_valid(&self) -> bool {
        self.decay_level <= 15 && self.period_or_volume <= 15 && self.divider <= 15
    }

    /* 0-15 */
    pub fn volume(&self) -> u8 {
        if self.constant_volume {
            self.period_or_volume
        } else {
            self.decay_level
        }
    }

    pub fn set_envelope(&mut self, data: u8) {
        self.period_or_volume = data & 0xf;
        self.constant_volume = data & 0x10 != 0;
        self.loop_flag = data & 0x20 != 0;
    }

    pub fn start(&mut self) {
        self.start_flag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decay() {
        let mut envelope = Envelope::new();
        /* decaying, divider period 1 */
        envelope.set_envelope(0x01);
        envelope.start();

        envelope.clock();
        assert_eq!(envelope.volume(), 15);
        envelope.clock();
        assert_eq!(envelope.volume(), 15);
        envelope.clock();
        assert_eq!(envelope.volume(), 14);

        for _ in 0..28 {
            envelope.clock();
        }
        assert_eq!(envelope.volume(), 0);
        /* not looping, so it stays down */
        envelope.clock();
        envelope.clock();
        assert_eq!(envelope.volume(), 0);
    }

    #[test]
    fn test_envelope_loop() {
        let mut envelope = Envelope::new();
        envelope.set_envelope(0x20);
        envelope.start();
        for _ in 0..16 {
            envelope.clock();
        }
        assert_eq!(envelope.volume(), 0);
        envelope.clock();
        assert_eq!(envelope.volume(), 15);
    }

    #[test]
    fn test_constant_volume() {
        let mut envelope = Envelope::new();
        envelope.set_envelope(0x17);
        envelope.start();
        envelope.clock();
        assert_eq!(envelope.volume(), 7);
    }
}
