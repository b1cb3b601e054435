use crate::config::{DUMP_VIEWS_KEY, LOAD_SNAPSHOT_KEY, RESET_KEY, SAVE_SNAPSHOT_KEY};
use crate::simulator::SimulatorSignal;
use log::warn;
use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::Key;

type PressedKeys = Arc<Mutex<HashSet<Key>>>;

/**
 * Turns window key events into the pressed-key set the emulation thread polls for the
 * controller, plus the one-shot snapshot and reset commands.
 */
pub struct KeyEventHandler {
    pressed_keys: PressedKeys,
    signals: Sender<SimulatorSignal>,
}

impl KeyEventHandler {
    pub fn new(pressed_keys: PressedKeys, signals: Sender<SimulatorSignal>) -> KeyEventHandler {
        KeyEventHandler {
            pressed_keys,
            signals,
        }
    }

    pub fn handle_key_event(&mut self, key_event: &KeyEvent) {
        self.handle_key(&key_event.logical_key, key_event.state, key_event.repeat);
    }

    fn handle_key(&mut self, key: &Key, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if let Ok(mut pressed_keys) = self.pressed_keys.lock() {
                    pressed_keys.insert(key.clone());
                }
                if !repeat {
                    if let Some(signal) = command_for_key(key) {
                        if self.signals.send(signal).is_err() {
                            warn!("emulation thread is gone, {key:?} ignored");
                        }
                    }
                }
            }
            ElementState::Released => {
                if let Ok(mut pressed_keys) = self.pressed_keys.lock() {
                    pressed_keys.remove(key);
                }
            }
        }
    }
}

fn command_for_key(key: &Key) -> Option<SimulatorSignal> {
    match key {
        Key::Named(named) if *named == SAVE_SNAPSHOT_KEY => Some(SimulatorSignal::SaveSnapshot),
        Key::Named(named) if *named == LOAD_SNAPSHOT_KEY => Some(SimulatorSignal::LoadSnapshot),
        Key::Named(named) if *named == RESET_KEY => Some(SimulatorSignal::Reset),
        Key::Named(named) if *named == DUMP_VIEWS_KEY => Some(SimulatorSignal::DumpViews),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use winit::keyboard::NamedKey;

    #[test]
    fn test_pressed_keys_tracked() {
        let keys: PressedKeys = Arc::new(Mutex::new(HashSet::new()));
        let (sx, _rx) = channel();
        let mut handler = KeyEventHandler::new(keys.clone(), sx);

        let up = Key::Named(NamedKey::ArrowUp);
        handler.handle_key(&up, ElementState::Pressed, false);
        assert!(keys.lock().unwrap().contains(&up));
        handler.handle_key(&up, ElementState::Released, false);
        assert!(keys.lock().unwrap().is_empty());
    }

    #[test]
    fn test_command_keys() {
        let keys: PressedKeys = Arc::new(Mutex::new(HashSet::new()));
        let (sx, rx) = channel();
        let mut handler = KeyEventHandler::new(keys, sx);

        handler.handle_key(&Key::Named(SAVE_SNAPSHOT_KEY), ElementState::Pressed, false);
        handler.handle_key(&Key::Named(LOAD_SNAPSHOT_KEY), ElementState::Pressed, false);
        /* held keys don't repeat the command */
        handler.handle_key(&Key::Named(LOAD_SNAPSHOT_KEY), ElementState::Pressed, true);
        handler.handle_key(&Key::Named(RESET_KEY), ElementState::Pressed, false);
        handler.handle_key(&Key::Named(NamedKey::ArrowUp), ElementState::Pressed, false);
        handler.handle_key(&Key::Named(DUMP_VIEWS_KEY), ElementState::Pressed, false);

        let received: Vec<SimulatorSignal> = rx.try_iter().collect();
        assert_eq!(received.len(), 4);
        assert!(matches!(received[0], SimulatorSignal::SaveSnapshot));
        assert!(matches!(received[1], SimulatorSignal::LoadSnapshot));
        assert!(matches!(received[2], SimulatorSignal::Reset));
        assert!(matches!(received[3], SimulatorSignal::DumpViews));
    }
}
