use crate::apu::APU;
use crate::bus::Peripheral;

mod frame_sequencer_tests;

/* an APU with pulse 1 switched on and playing a steady tone */
fn apu_with_tone() -> APU {
    let mut apu = APU::new(44_100);
    apu.write(0x4015, 0x01);
    /* 50% duty, constant volume 15 */
    apu.write(0x4000, 0xbf);
    apu.write(0x4002, 0xfd);
    /* length index 1 (254), period high 0 */
    apu.write(0x4003, 0x08);
    apu
}
