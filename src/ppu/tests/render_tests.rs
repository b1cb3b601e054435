use crate::bus::Peripheral;
use crate::ppu::tests::{ppu_for_testing, write_vram_block};
use crate::ppu::{hue_lookup, Mirroring, PPURegister, PPU, SCREEN_WIDTH};

fn pixel(ppu: &PPU, x: usize, y: usize) -> [u8; 4] {
    let index = 4 * (y * SCREEN_WIDTH + x);
    let mut rgba = [0; 4];
    rgba.copy_from_slice(&ppu.frame()[index..index + 4]);
    rgba
}

/* tile 1 is solid color 1, tile 2 has only its top-left pixel set, in color 2 */
fn ppu_with_tiles() -> PPU {
    let (mut ppu, _) = ppu_for_testing(Mirroring::Vertical);
    write_vram_block(&mut ppu, 0x0010, &[0xff; 8]);
    write_vram_block(&mut ppu, 0x0028, &[0x80]);
    write_vram_block(&mut ppu, 0x3f00, &[0x0f, 0x30, 0x21, 0x11]);
    write_vram_block(&mut ppu, 0x3f11, &[0x16, 0x2a, 0x27]);
    ppu
}

#[test]
fn test_backdrop_when_disabled() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2000, &[1]);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 0, 0), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 255, 239), hue_lookup(0x0f));
}

#[test]
fn test_background_tile() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2000, &[1, 0, 1]);
    ppu.write(PPURegister::PPUMASK.address(), 0x0a);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 0, 0), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 7, 7), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 8, 0), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 16, 3), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 0, 8), hue_lookup(0x0f));
}

#[test]
fn test_left_column_mask() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2000, &[1, 1]);
    ppu.write(PPURegister::PPUMASK.address(), 0x08);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 7, 0), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 8, 0), hue_lookup(0x30));
}

#[test]
fn test_attribute_palette() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x3f05, &[0x1a]);
    /* bottom-right 2x2 block of the first attribute byte uses palette 1 */
    write_vram_block(&mut ppu, 0x2000 + 2 * 32 + 2, &[1]);
    write_vram_block(&mut ppu, 0x23c0, &[0b0100_0000]);
    ppu.write(PPURegister::PPUMASK.address(), 0x0a);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 16, 16), hue_lookup(0x1a));
}

#[test]
fn test_horizontal_scroll() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2000, &[0, 1]);
    /* the first tile of the right-hand nametable scrolls in at the edge */
    write_vram_block(&mut ppu, 0x2400, &[1]);
    ppu.write(PPURegister::PPUMASK.address(), 0x0a);
    ppu.write(PPURegister::PPUSCROLL.address(), 4);
    ppu.write(PPURegister::PPUSCROLL.address(), 0);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 3, 0), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 4, 0), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 11, 0), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 12, 0), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 252, 0), hue_lookup(0x30));
}

#[test]
fn test_vertical_scroll() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2020, &[1]);
    ppu.write(PPURegister::PPUMASK.address(), 0x0a);
    ppu.write(PPURegister::PPUSCROLL.address(), 0);
    ppu.write(PPURegister::PPUSCROLL.address(), 8);
    ppu.update_image();

    /* tile row 1 is now at the top */
    assert_eq!(pixel(&ppu, 0, 0), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 0, 8), hue_lookup(0x0f));
}

#[test]
fn test_sprite() {
    let mut ppu = ppu_with_tiles();
    ppu.write(PPURegister::PPUMASK.address(), 0x14);
    ppu.write_oam_block(&[9, 2, 0x00, 20]);
    ppu.update_image();

    /* Y is one less than the first line drawn */
    assert_eq!(pixel(&ppu, 20, 9), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 20, 10), hue_lookup(0x2a));
    assert_eq!(pixel(&ppu, 21, 10), hue_lookup(0x0f));
}

#[test]
fn test_sprite_flip() {
    let mut ppu = ppu_with_tiles();
    ppu.write(PPURegister::PPUMASK.address(), 0x14);
    ppu.write_oam_block(&[9, 2, 0xc0, 20]);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 20, 10), hue_lookup(0x0f));
    assert_eq!(pixel(&ppu, 27, 17), hue_lookup(0x2a));
}

#[test]
fn test_sprite_behind_background() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2000 + 32 + 2, &[1]);
    ppu.write(PPURegister::PPUMASK.address(), 0x1e);
    /* sprite 0 behind the tile at 16-23, sprite 1 in front just right of it */
    ppu.write_oam_block(&[7, 2, 0x20, 16, 7, 2, 0x00, 24]);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 16, 8), hue_lookup(0x30));
    assert_eq!(pixel(&ppu, 24, 8), hue_lookup(0x2a));
}

#[test]
fn test_lower_index_on_top() {
    let mut ppu = ppu_with_tiles();
    ppu.write(PPURegister::PPUMASK.address(), 0x14);
    ppu.write_oam_block(&[9, 2, 0x01, 20, 9, 2, 0x00, 20]);
    write_vram_block(&mut ppu, 0x3f16, &[0x05]);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 20, 10), hue_lookup(0x05));
}

#[test]
fn test_greyscale() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x3f00, &[0x16]);
    ppu.write(PPURegister::PPUMASK.address(), 0x01);
    ppu.update_image();

    assert_eq!(pixel(&ppu, 100, 100), hue_lookup(0x10));
}

#[test]
fn test_debug_views() {
    let mut ppu = ppu_with_tiles();
    write_vram_block(&mut ppu, 0x2400, &[1]);

    let patterns = ppu.pattern_table_view(0);
    assert_eq!(patterns.len(), 256 * 128 * 4);
    /* tile 1 of the first table sits at (8, 0) */
    assert_eq!(patterns[4 * 8..4 * 8 + 4], hue_lookup(0x30));
    assert_eq!(patterns[0..4], hue_lookup(0x0f));

    let nametables = ppu.nametable_view();
    assert_eq!(nametables.len(), 512 * 480 * 4);
    /* vertical mirroring: top-right and bottom-right quadrants show the same tile */
    assert_eq!(nametables[4 * 256..4 * 256 + 4], hue_lookup(0x30));
    let bottom_right = 4 * (512 * 240 + 256);
    assert_eq!(nametables[bottom_right..bottom_right + 4], hue_lookup(0x30));
    assert_eq!(nametables[0..4], hue_lookup(0x0f));
}
