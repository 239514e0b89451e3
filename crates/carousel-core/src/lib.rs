// ABOUTME: Shared types and configuration for carousel.
// ABOUTME: Defines colors, geometry, easing curves, draw commands and config file handling.

pub mod color;
pub mod config;
pub mod draw;
pub mod easing;
pub mod geometry;

pub use color::Color;
pub use config::{AnimationSettings, Config, ConfigError, LayoutSettings, Palette, TitleSettings};
pub use draw::{DrawCommand, TextAlign};
pub use easing::Easing;
pub use geometry::{Point, Rect, Size};
