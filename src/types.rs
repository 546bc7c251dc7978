//! Core types shared across the settings tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle to a node in a configurator's field arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub(crate) usize);

impl FieldId {
    /// Position of the node in the arena (registration order).
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque widget handle handed out by the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetHandle(pub u64);

/// Reload ordering during preset switches. Higher values reload first.
pub type Priority = i32;

pub const PRIORITY_DEFAULT: Priority = 0;

/// RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert from hex u32 (0xRRGGBB)
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self { r, g, b }
    }

    /// Convert to hex u32 (0xRRGGBB), rounding each channel.
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Clamp every component into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

macro_rules! key_codes {
    ($($variant:ident),* $(,)?) => {
        /// Keyboard and mouse codes a keybinding field can hold.
        ///
        /// Persisted by variant name. `None` is the unbound sentinel.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum KeyCode {
            #[default]
            None,
            $($variant),*
        }

        impl KeyCode {
            /// Every code, `None` first.
            pub const ALL: &'static [KeyCode] = &[KeyCode::None, $(KeyCode::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    KeyCode::None => "None",
                    $(KeyCode::$variant => stringify!($variant)),*
                }
            }
        }

        impl FromStr for KeyCode {
            type Err = UnknownKeyCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    "None" => Ok(KeyCode::None),
                    $(stringify!($variant) => Ok(KeyCode::$variant),)*
                    other => Err(UnknownKeyCode(other.to_string())),
                }
            }
        }
    };
}

key_codes! {
    Backspace, Tab, Return, Escape, Space, Delete, Insert, Home, End, PageUp, PageDown,
    UpArrow, DownArrow, LeftArrow, RightArrow,
    Alpha0, Alpha1, Alpha2, Alpha3, Alpha4, Alpha5, Alpha6, Alpha7, Alpha8, Alpha9,
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Keypad0, Keypad1, Keypad2, Keypad3, Keypad4, Keypad5, Keypad6, Keypad7, Keypad8, Keypad9,
    KeypadPlus, KeypadMinus, KeypadMultiply, KeypadDivide, KeypadEnter, KeypadPeriod,
    Minus, Equals, LeftBracket, RightBracket, Semicolon, Quote, BackQuote, Comma, Period,
    Slash, Backslash, CapsLock,
    LeftShift, RightShift, LeftControl, RightControl, LeftAlt, RightAlt,
    Mouse0, Mouse1, Mouse2, Mouse3, Mouse4, Mouse5, Mouse6,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a key code name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyCode(pub String);

impl fmt::Display for UnknownKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key code: {}", self.0)
    }
}

impl std::error::Error for UnknownKeyCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code_names_roundtrip() {
        for key in KeyCode::ALL {
            assert_eq!(key.name().parse::<KeyCode>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_key_code() {
        assert!("Hyper".parse::<KeyCode>().is_err());
        assert!("".parse::<KeyCode>().is_err());
    }

    #[test]
    fn test_color_hex() {
        let color = Color::from_hex(0xFF8000);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.b, 0.0);
        assert_eq!(color.to_hex(), 0xFF8000);
    }

    #[test]
    fn test_color_clamped() {
        let color = Color::rgb(-0.5, 0.25, 3.0).clamped();
        assert_eq!(color, Color::rgb(0.0, 0.25, 1.0));
    }
}
