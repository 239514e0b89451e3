// ABOUTME: Color representation and conversion utilities.
// ABOUTME: Provides the named fill colors used to mark each view.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);

    /// Brown as a 0.6/0.4/0.2 mix
    pub const BROWN: Self = Self::rgb(0.6, 0.4, 0.2);

    /// One-third white
    pub const DARK_GRAY: Self = Self::rgb(0.333, 0.333, 0.333);

    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_visible(&self) -> bool {
        self.a > 0.001
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}
