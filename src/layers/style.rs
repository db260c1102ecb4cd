use crate::{
    core::constants::{DEFAULT_FONT, DEFAULT_FONT_SIZE},
    MapError,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RGBA colour handed through to the drawing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const GREEN: Colour = Colour::rgb(0, 255, 0);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);
    pub const YELLOW: Colour = Colour::rgb(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    fn named(name: &str) -> Option<Colour> {
        Some(match name {
            "black" => Colour::BLACK,
            "white" => Colour::WHITE,
            "red" => Colour::RED,
            "green" => Colour::GREEN,
            "blue" => Colour::BLUE,
            "yellow" => Colour::YELLOW,
            _ => return None,
        })
    }
}

impl FromStr for Colour {
    type Err = MapError;

    /// Accepts `#rrggbb`, `#rrggbbaa` or a basic colour name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let invalid = || MapError::InvalidColour(s.to_string());

        if let Some(colour) = Colour::named(&text) {
            return Ok(colour);
        }

        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Colour::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

/// Font family and point size for text entities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    pub size: u32,
}

impl FontSpec {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FONT, DEFAULT_FONT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_names() {
        assert_eq!("#ff8000".parse::<Colour>().unwrap(), Colour::rgb(255, 128, 0));
        assert_eq!("#FF800080".parse::<Colour>().unwrap(), Colour::new(255, 128, 0, 128));
        assert_eq!("Red".parse::<Colour>().unwrap(), Colour::RED);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#12345", "#gg0000", "mauve", "ff0000"] {
            assert!(matches!(bad.parse::<Colour>(), Err(MapError::InvalidColour(_))), "{}", bad);
        }
    }

    #[test]
    fn test_default_font() {
        let font = FontSpec::default();
        assert_eq!(font.name, "Arial");
        assert_eq!(font.size, 9);
    }
}
