// ABOUTME: Backend-agnostic draw commands produced from a resolved view tree.
// ABOUTME: The renderer consumes these in order, painter's-algorithm style.

use crate::{Color, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Solid rectangle in window coordinates
    Fill { rect: Rect, color: Color },
    /// Single line of text laid out inside `frame`, vertically centered
    Text {
        frame: Rect,
        text: String,
        color: Color,
        font_size: f32,
        align: TextAlign,
    },
}
