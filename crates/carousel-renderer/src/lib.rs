// ABOUTME: GPU rendering of draw commands.
// ABOUTME: Uses wgpu to draw filled rectangles and label glyphs as textured quads.

mod atlas;
pub mod fonts;
mod gpu;
mod quad_pipeline;
pub mod renderer;

pub use atlas::AtlasError;
pub use fonts::load_font_data;
pub use gpu::GpuError;
pub use renderer::{RenderError, Renderer};
