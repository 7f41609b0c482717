//! Keyboard tracking and the terrain rotation controls.
//!
//! Keys are tracked by physical code so the rotate keys sit in the same place
//! on every layout.

use std::collections::HashSet;

use relief_config::InputConfig;
use thiserror::Error;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key name `{name}` for input.{field}")]
    UnknownKey { field: &'static str, name: String },
}

/// Keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.handle_key(code, event.state, event.repeat);
        }
    }

    /// Record one key transition. OS auto-repeat is ignored.
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        if repeat {
            return;
        }
        match state {
            ElementState::Pressed => {
                self.held.insert(code);
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Forget everything, e.g. when the window loses focus and release
    /// events may never arrive.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

/// Maps two keys to a signed rotation per update tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationControls {
    pub left: KeyCode,
    pub right: KeyCode,
    pub step: f32,
}

impl Default for RotationControls {
    fn default() -> Self {
        Self {
            left: KeyCode::KeyE,
            right: KeyCode::KeyD,
            step: 0.05,
        }
    }
}

impl RotationControls {
    pub fn from_config(config: &InputConfig) -> Result<Self, InputError> {
        Ok(Self {
            left: parse_key(&config.rotate_left_key, "rotate_left_key")?,
            right: parse_key(&config.rotate_right_key, "rotate_right_key")?,
            step: config.rotation_step,
        })
    }

    /// Angle change for one tick. Holding both keys cancels out.
    pub fn tick_delta(&self, keyboard: &KeyboardState) -> f32 {
        let mut delta = 0.0;
        if keyboard.is_held(self.left) {
            delta += self.step;
        }
        if keyboard.is_held(self.right) {
            delta -= self.step;
        }
        delta
    }
}

/// Parse a key name as written in `config.ron`: a letter (`"E"`), a digit
/// (`"4"`), an arrow (`"Left"`), a few named keys, or any `KeyCode` variant
/// name with its prefix (`"KeyE"`, `"ArrowLeft"`). Case-insensitive.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return single_char_key(c.to_ascii_uppercase());
    }

    let lower = trimmed.to_ascii_lowercase();
    let stripped = lower
        .strip_prefix("key")
        .or_else(|| lower.strip_prefix("digit"))
        .filter(|rest| rest.len() == 1);
    if let Some(rest) = stripped {
        return parse_key_name(rest);
    }

    let code = match lower.as_str() {
        "left" | "arrowleft" => KeyCode::ArrowLeft,
        "right" | "arrowright" => KeyCode::ArrowRight,
        "up" | "arrowup" => KeyCode::ArrowUp,
        "down" | "arrowdown" => KeyCode::ArrowDown,
        "space" => KeyCode::Space,
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "comma" => KeyCode::Comma,
        "period" => KeyCode::Period,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => return None,
    };
    Some(code)
}

fn parse_key(name: &str, field: &'static str) -> Result<KeyCode, InputError> {
    parse_key_name(name).ok_or_else(|| InputError::UnknownKey {
        field,
        name: name.to_string(),
    })
}

fn single_char_key(c: char) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    match c {
        'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        _ => None,
    }
}
