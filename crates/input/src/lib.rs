//! Keyboard input for the flight controls.
//!
//! Keys are tracked as held state only. Gameplay samples the held state once
//! per tick, so a key tapped and released between two ticks is not seen.

use std::collections::HashSet;

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
}

/// One tick's worth of sampled flight input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightControls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_held.insert(key) {
                    log::trace!("key down: {:?}", key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Drop all held keys (e.g. when the window loses focus and release events
    /// will never arrive).
    pub fn clear(&mut self) {
        self.keys_held.clear();
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| self.is_key_held(*k))
    }

    /// Sample the WASD / arrow keys into flight controls.
    pub fn flight_controls(&self) -> FlightControls {
        FlightControls {
            left: self.any_held(&[KeyCode::KeyA, KeyCode::ArrowLeft]),
            right: self.any_held(&[KeyCode::KeyD, KeyCode::ArrowRight]),
            up: self.any_held(&[KeyCode::KeyW, KeyCode::ArrowUp]),
            down: self.any_held(&[KeyCode::KeyS, KeyCode::ArrowDown]),
        }
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_map_to_the_same_controls() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        let c = input.flight_controls();
        assert!(c.left && c.up);
        assert!(!c.right && !c.down);

        input.process_keyboard(KeyCode::ArrowLeft, ElementState::Released);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        input.process_keyboard(KeyCode::ArrowDown, ElementState::Pressed);
        let c = input.flight_controls();
        assert!(!c.left && c.right && c.up && c.down);
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        assert_eq!(input.flight_controls(), FlightControls::default());
        assert!(input.is_key_held(KeyCode::Space));
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyA, ElementState::Pressed);
        input.clear();
        assert_eq!(input.flight_controls(), FlightControls::default());
    }
}
