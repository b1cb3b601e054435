use crate::console::Console;
use crate::ppu::{NAMETABLE_VIEW_HEIGHT, NAMETABLE_VIEW_WIDTH, PATTERN_VIEW_HEIGHT, PATTERN_VIEW_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult};
use std::fs::File;
use std::io::{BufWriter, Write};

/* writes an RGBA buffer as a PNG */
pub fn write_png(path: &str, rgba: &[u8], width: usize, height: usize) -> ImageResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new(&mut file);
    encoder.write_image(rgba, width as u32, height as u32, ExtendedColorType::Rgba8)?;
    file.flush()?;
    Ok(())
}

/**
 * Writes the current frame, both pattern tables and the nametable plane next to `prefix`,
 * returning the paths written.
 */
pub fn dump_views(console: &Console, prefix: &str) -> ImageResult<Vec<String>> {
    let screen = format!("{prefix}.screen.png");
    let patterns = format!("{prefix}.patterns.png");
    let nametables = format!("{prefix}.nametables.png");

    write_png(&screen, &console.frame(), SCREEN_WIDTH, SCREEN_HEIGHT)?;
    {
        let ppu = console.ppu();
        write_png(&patterns, &ppu.pattern_table_view(0), PATTERN_VIEW_WIDTH, PATTERN_VIEW_HEIGHT)?;
        write_png(&nametables, &ppu.nametable_view(), NAMETABLE_VIEW_WIDTH, NAMETABLE_VIEW_HEIGHT)?;
    }
    Ok(vec![screen, patterns, nametables])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmulatorConfig;
    use crate::console::tests::{console_with_program, ENABLE_NMI_AND_WAIT};
    use std::fs;

    #[test]
    fn test_dump_views() {
        let mut console = console_with_program(&ENABLE_NMI_AND_WAIT, &[0x40], &EmulatorConfig::default());
        console.run_frame().unwrap();

        let prefix = std::env::temp_dir()
            .join(format!("verdigris-views-{}", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let written = dump_views(&console, &prefix).unwrap();
        assert_eq!(written.len(), 3);
        for path in written {
            let bytes = fs::read(&path).unwrap();
            /* PNG signature */
            assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
            fs::remove_file(path).unwrap();
        }
    }
}
