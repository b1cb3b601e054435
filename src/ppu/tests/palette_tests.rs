use crate::bus::Peripheral;
use crate::ppu::{hue_lookup, PaletteRam};

#[test]
fn test_hue_high_order_bits() {
    /* only the low six bits pick the color */
    assert_eq!(hue_lookup(0xff), hue_lookup(0x3f));
    assert_eq!(hue_lookup(0x40), hue_lookup(0x00));
    assert_eq!(hue_lookup(0x30), [236, 238, 236, 0xff]);
}

#[test]
fn test_sprite_backdrop_aliases() {
    let mut palette = PaletteRam::new();
    palette.write(0x3f10, 0x21);
    assert_eq!(palette.read(0x3f00), 0x21);
    assert_eq!(palette.entry(0x00), 0x21);

    palette.write(0x3f0c, 0x05);
    assert_eq!(palette.read(0x3f1c), 0x05);

    /* 0x11 is a real sprite color, not an alias */
    palette.write(0x3f11, 0x16);
    assert_eq!(palette.read(0x3f01), 0x00);
    assert_eq!(palette.entry(0x11), 0x16);
}

#[test]
fn test_palette_repeats() {
    let mut palette = PaletteRam::new();
    palette.write(0x3f03, 0x2a);
    assert_eq!(palette.read(0x3f23), 0x2a);
    assert_eq!(palette.read(0x3fe3), 0x2a);
}
