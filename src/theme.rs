use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: Color,
    pub vertex_color: Color,
    pub edge_color: Color,
    pub selected_color: Color,
    pub label_fill_color: Color,
    pub label_text_color: Color,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Segoe UI\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            background: Color::WHITE,
            vertex_color: Color::BLACK,
            edge_color: Color::BLACK,
            selected_color: Color::rgb(255, 0, 0),
            label_fill_color: Color::WHITE,
            label_text_color: Color::BLACK,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            vertex_color: Color::rgb(0x1C, 0x24, 0x30),
            edge_color: Color::rgb(0x7A, 0x8A, 0xA6),
            selected_color: Color::rgb(0xE5, 0x48, 0x4D),
            label_fill_color: Color::rgb(0xF8, 0xFA, 0xFF),
            label_text_color: Color::rgb(0x1C, 0x24, 0x30),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
