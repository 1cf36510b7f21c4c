use crate::color::Color;
use crate::config::Config;
use crate::error::{RenderError, Result};
use crate::geometry::Rect;

/// Per-draw-call context: where the graph may be drawn and what lies behind it.
/// Passed by reference for the duration of one draw or redraw call.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    rect: Rect,
    margin: f32,
    background: Color,
}

impl Canvas {
    pub fn new(rect: Rect, margin: f32, background: Color) -> Result<Self> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(RenderError::Argument(format!(
                "margin must be a non-negative number, got {margin}"
            )));
        }
        if ![rect.x, rect.y, rect.width, rect.height]
            .iter()
            .all(|v| v.is_finite())
            || rect.width < 0.0
            || rect.height < 0.0
        {
            return Err(RenderError::Argument(format!(
                "drawable rectangle {rect:?} is not a valid rectangle"
            )));
        }
        Ok(Self {
            rect,
            margin,
            background,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.canvas.drawable_rect(),
            config.canvas.margin,
            config.theme.background,
        )
    }

    /// The full drawable rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// The drawable rectangle reduced by the margin; vertices are kept inside it.
    pub fn usable_rect(&self) -> Rect {
        self.rect.inset(self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_margin_is_rejected() {
        let err = Canvas::new(Rect::new(0.0, 0.0, 10.0, 10.0), -1.0, Color::WHITE).unwrap_err();
        assert!(matches!(err, RenderError::Argument(_)));
    }

    #[test]
    fn usable_rect_is_inset_by_margin() {
        let canvas = Canvas::new(Rect::new(0.0, 0.0, 50.0, 50.0), 5.0, Color::WHITE).unwrap();
        assert_eq!(canvas.usable_rect(), Rect::new(5.0, 5.0, 40.0, 40.0));
    }
}
