use crate::apu::DEFAULT_SAMPLE_RATE;
use crate::controller::{
    BUTTON_A, BUTTON_B, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_SELECT, BUTTON_START,
    BUTTON_UP,
};
use std::collections::HashSet;
use winit::keyboard::{Key, NamedKey};

/* NTSC: 39375000 / 655171 frames a second */
pub const FRAME_RATE: f64 = 60.0988;

pub const WINDOW_TITLE: &str = "Verdigris";
/* the frame is drawn at this multiple of 256x240 */
pub const WINDOW_SCALE: u32 = 3;

pub const SAVE_SNAPSHOT_KEY: NamedKey = NamedKey::F5;
pub const LOAD_SNAPSHOT_KEY: NamedKey = NamedKey::F9;
pub const RESET_KEY: NamedKey = NamedKey::F12;
/* screenshot plus pattern table and nametable views */
pub const DUMP_VIEWS_KEY: NamedKey = NamedKey::F8;

/* everything about a session that isn't in the cartridge image */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub trace_instructions: bool,
    /* BRK stops the processor instead of interrupting */
    pub brk_halts: bool,
    pub sample_rate: u32,
    pub mute: bool,
    /* (address, value): reads of address always return value */
    pub patches: Vec<(u16, u8)>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            trace_instructions: false,
            brk_halts: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
            mute: false,
            patches: Vec::new(),
        }
    }
}

/* parses "075a=08" or "0x075a=0x08"; both sides are hex */
pub fn parse_patch(text: &str) -> Result<(u16, u8), String> {
    let (address, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {text}"))?;
    let hex = |part: &str| part.trim().trim_start_matches("0x").to_string();
    let address = u16::from_str_radix(&hex(address), 16)
        .map_err(|err| format!("bad address in {text}: {err}"))?;
    let value = u8::from_str_radix(&hex(value), 16)
        .map_err(|err| format!("bad value in {text}: {err}"))?;
    Ok((address, value))
}

/* arrows = D-pad, X = A, Z = B, Enter = Start, Tab = Select */
pub fn button_for_key(key: &Key) -> Option<u8> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(BUTTON_UP),
        Key::Named(NamedKey::ArrowDown) => Some(BUTTON_DOWN),
        Key::Named(NamedKey::ArrowLeft) => Some(BUTTON_LEFT),
        Key::Named(NamedKey::ArrowRight) => Some(BUTTON_RIGHT),
        Key::Named(NamedKey::Enter) => Some(BUTTON_START),
        Key::Named(NamedKey::Tab) => Some(BUTTON_SELECT),
        Key::Character(c) if c.eq_ignore_ascii_case("x") => Some(BUTTON_A),
        Key::Character(c) if c.eq_ignore_ascii_case("z") => Some(BUTTON_B),
        _ => None,
    }
}

/* the controller byte for everything currently held down */
pub fn buttons_for_keys(keys: &HashSet<Key>) -> u8 {
    keys.iter().filter_map(button_for_key).fold(0, |buttons, button| buttons | button)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patch() {
        assert_eq!(parse_patch("075a=08"), Ok((0x075a, 0x08)));
        assert_eq!(parse_patch("0x075A=0xff"), Ok((0x075a, 0xff)));
        assert!(parse_patch("075a").is_err());
        assert!(parse_patch("075a=100").is_err());
        assert!(parse_patch("zz=01").is_err());
    }

    #[test]
    fn test_buttons_for_keys() {
        let mut keys = HashSet::new();
        keys.insert(Key::Named(NamedKey::ArrowLeft));
        keys.insert(Key::Character("X".into()));
        keys.insert(Key::Named(NamedKey::Enter));
        keys.insert(Key::Character("q".into()));
        assert_eq!(buttons_for_keys(&keys), BUTTON_LEFT | BUTTON_A | BUTTON_START);
    }

    #[test]
    fn test_defaults() {
        let config = EmulatorConfig::default();
        assert!(config.brk_halts);
        assert_eq!(config.sample_rate, 44_100);
    }
}
