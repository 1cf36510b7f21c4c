//! RGBA color value type and CSS-ish color parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static RGB_FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$",
    )
    .unwrap()
});

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// `#RRGGBB`, without alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse `#RGB`, `#RRGGBB`, `#AARRGGBB`, `rgb(r,g,b)`, `rgba(r,g,b,a)` or a
    /// small set of named colors.
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(caps) = RGB_FN_RE.captures(value) {
            let channel = |idx: usize| caps.get(idx)?.as_str().parse::<u8>().ok();
            let r = channel(1)?;
            let g = channel(2)?;
            let b = channel(3)?;
            let a = match caps.get(4) {
                Some(m) => {
                    let alpha: f32 = m.as_str().parse().ok()?;
                    if !(0.0..=1.0).contains(&alpha) {
                        return None;
                    }
                    (alpha * 255.0).round() as u8
                }
                None => 255,
            };
            return Some(Color::new(r, g, b, a));
        }
        named_color(&value.to_ascii_lowercase())
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let r = byte(&hex[0..1].repeat(2))?;
            let g = byte(&hex[1..2].repeat(2))?;
            let b = byte(&hex[2..3].repeat(2))?;
            Some(Color::rgb(r, g, b))
        }
        6 => Some(Color::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
        8 => Some(Color::new(
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
            byte(&hex[0..2])?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "navy" => Color::rgb(0, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "maroon" => Color::rgb(128, 0, 0),
        "olive" => Color::rgb(128, 128, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        _ => return None,
    };
    Some(color)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.to_hex())
        } else {
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.a, self.r, self.g, self.b
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#102030"), Some(Color::rgb(0x10, 0x20, 0x30)));
        assert_eq!(
            Color::parse("#80102030"),
            Some(Color::new(0x10, 0x20, 0x30, 0x80))
        );
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
    }

    #[test]
    fn parses_rgb_functions() {
        assert_eq!(Color::parse("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(
            Color::parse("rgba(232,232,232, 0.5)"),
            Some(Color::new(232, 232, 232, 128))
        );
        assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
        assert_eq!(Color::parse("rgba(0, 0, 0, 1.5)"), None);
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(Color::parse("Navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::parse("not-a-color"), None);
    }

    #[test]
    fn display_keeps_alpha_when_translucent() {
        assert_eq!(Color::rgb(255, 0, 0).to_string(), "#FF0000");
        assert_eq!(Color::new(255, 0, 0, 10).to_string(), "#0AFF0000");
        assert_eq!(Color::parse(&Color::new(1, 2, 3, 4).to_string()), Some(Color::new(1, 2, 3, 4)));
    }
}
