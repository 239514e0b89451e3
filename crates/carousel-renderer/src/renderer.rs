// ABOUTME: Main GPU renderer using wgpu.
// ABOUTME: Turns a frame's draw commands into filled quads and label glyphs.

use std::sync::Arc;
use winit::window::Window;

use carousel_core::{Color, DrawCommand, Rect, TextAlign};

use crate::atlas::LabelAtlas;
use crate::gpu::{GpuError, GpuState};
use crate::quad_pipeline::{Quad, QuadPipeline};

/// Whole texture; used for fills when there is no atlas, only a white texel
const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("GPU setup failed: {0}")]
    Gpu(#[from] GpuError),

    #[error("Atlas error: {0}")]
    Atlas(#[from] crate::atlas::AtlasError),
}

pub struct Renderer {
    gpu: GpuState,
    /// Physical pixels per logical pixel
    scale: f32,
    quad_pipeline: QuadPipeline,
    /// Absent when no font could be loaded; text commands are then skipped
    atlas: Option<LabelAtlas>,
}

impl Renderer {
    /// Glyphs for `label` are rasterized once, at `font_size` logical pixels
    /// times the window's scale factor.
    pub async fn new(
        window: Arc<Window>,
        font_data: Option<&[u8]>,
        label: &str,
        font_size: f32,
    ) -> Result<Self, RenderError> {
        let scale = window.scale_factor() as f32;
        let gpu = GpuState::new(window).await?;

        let atlas = match font_data {
            Some(data) => Some(LabelAtlas::new(data, font_size * scale, label)?),
            None => {
                tracing::warn!("No font available, labels will not be drawn");
                None
            }
        };
        let (coverage, dimensions) = match &atlas {
            Some(atlas) => (atlas.pixels(), atlas.dimensions()),
            None => (&[255u8][..], (1, 1)),
        };
        let quad_pipeline = QuadPipeline::new(
            &gpu.device,
            &gpu.queue,
            gpu.config.format,
            coverage,
            dimensions,
        );

        let mut renderer = Self {
            gpu,
            scale,
            quad_pipeline,
            atlas,
        };
        let (width, height) = renderer.gpu.size;
        renderer.resize(width, height);
        Ok(renderer)
    }

    /// New surface size in physical pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (logical_width, logical_height) = self.logical_size();
        self.quad_pipeline
            .update_screen_size(&self.gpu.queue, logical_width, logical_height);
    }

    pub fn logical_size(&self) -> (f32, f32) {
        let (width, height) = self.gpu.size;
        (width as f32 / self.scale, height as f32 / self.scale)
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Single-line extent of `text` at the label size in logical pixels, if a font is loaded
    pub fn measure_text(&self, text: &str) -> Option<(f32, f32)> {
        let (width, height) = self.atlas.as_ref()?.measure(text);
        Some((width / self.scale, height / self.scale))
    }

    pub fn render(&mut self, commands: &[DrawCommand], clear: Color) -> Result<(), RenderError> {
        let solid = self.atlas.as_ref().map_or(FULL_UV, LabelAtlas::solid_uv);
        // Backgrounds first, text on top
        let mut quads: Vec<Quad> = commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Fill { rect, color } => Some(Quad {
                    rect: rect_to_f32(rect),
                    uv: solid,
                    color: color.to_array(),
                }),
                DrawCommand::Text { .. } => None,
            })
            .collect();
        if let Some(atlas) = &self.atlas {
            quads.extend(place_text(atlas, commands));
        }
        self.quad_pipeline.prepare(&self.gpu.queue, &quads);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost, reconfiguring");
                let (width, height) = self.gpu.size;
                self.gpu.resize(width, height);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Screen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &screen_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.quad_pipeline.render(&mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn rect_to_f32(rect: &Rect) -> [f32; 4] {
    [
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    ]
}

/// Glyph quads for every text command, each on a single line inside its
/// frame. Atlas metrics are physical pixels at the atlas size; `k` maps them
/// to logical pixels at the command's font size.
fn place_text(atlas: &LabelAtlas, commands: &[DrawCommand]) -> Vec<Quad> {
    let mut quads = Vec::new();
    for command in commands {
        let DrawCommand::Text {
            frame,
            text,
            color,
            font_size,
            align,
        } = command
        else {
            continue;
        };
        let k = *font_size / atlas.px();
        let (width, height) = atlas.measure(text);
        let (mut pen_x, baseline) = line_origin(
            rect_to_f32(frame),
            width * k,
            height * k,
            atlas.ascent() * k,
            *align,
        );
        for c in text.chars() {
            let Some(glyph) = atlas.glyph(c) else {
                tracing::debug!("No glyph for {:?}", c);
                continue;
            };
            let [_, _, w, h] = glyph.texels;
            let [offset_x, offset_y] = glyph.offset;
            // offset_y is the distance from the baseline to the glyph's bottom edge
            quads.push(Quad {
                rect: [
                    pen_x + offset_x * k,
                    baseline - (h as f32 + offset_y) * k,
                    w as f32 * k,
                    h as f32 * k,
                ],
                uv: atlas.uv(&glyph),
                color: color.to_array(),
            });
            pen_x += glyph.advance * k;
        }
    }
    quads
}

/// Pen position and baseline for a line of text, vertically centered in `frame`
fn line_origin(
    [x, y, width, height]: [f32; 4],
    text_width: f32,
    line_height: f32,
    ascent: f32,
    align: TextAlign,
) -> (f32, f32) {
    let pen_x = match align {
        TextAlign::Left => x,
        TextAlign::Center => x + (width - text_width) / 2.0,
        TextAlign::Right => x + width - text_width,
    };
    let baseline = y + (height - line_height) / 2.0 + ascent;
    (pen_x, baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::tests::block;
    use carousel_core::Color;

    const FRAME: [f32; 4] = [0.0, 64.0, 375.0, 31.0];

    #[test]
    fn centered_text_splits_leftover_width() {
        let (x, baseline) = line_origin(FRAME, 175.0, 31.0, 24.0, TextAlign::Center);
        assert_eq!(x, 100.0);
        assert_eq!(baseline, 88.0);
    }

    #[test]
    fn edge_alignments() {
        assert_eq!(line_origin(FRAME, 175.0, 31.0, 24.0, TextAlign::Left).0, 0.0);
        assert_eq!(line_origin(FRAME, 175.0, 31.0, 24.0, TextAlign::Right).0, 200.0);
    }

    #[test]
    fn short_line_is_vertically_centered() {
        let (_, baseline) = line_origin([0.0, 0.0, 100.0, 40.0], 10.0, 20.0, 15.0, TextAlign::Center);
        assert_eq!(baseline, 25.0);
    }

    fn label(font_size: f32, text: &str) -> DrawCommand {
        DrawCommand::Text {
            frame: Rect::new(0.0, 0.0, 100.0, 60.0),
            text: text.to_string(),
            color: Color::DARK_GRAY,
            font_size,
            align: TextAlign::Center,
        }
    }

    fn strip() -> LabelAtlas {
        LabelAtlas::from_bitmaps(20.0, 16.0, 20.0, vec![block('a', 4, 5, 5.0)]).unwrap()
    }

    #[test]
    fn glyphs_scale_with_command_font_size() {
        let atlas = strip();
        let quads = place_text(&atlas, &[label(40.0, "aa")]);

        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].rect, [42.0, 36.0, 8.0, 10.0]);
        assert_eq!(quads[1].rect[0], 52.0);
        assert_eq!(quads[0].uv, atlas.uv(&atlas.glyph('a').unwrap()));
        assert_eq!(quads[0].color, Color::DARK_GRAY.to_array());
    }

    #[test]
    fn atlas_size_text_keeps_bitmap_extent() {
        let quads = place_text(&strip(), &[label(20.0, "a")]);
        // Centered: pen at (100 - 5) / 2, baseline at (60 - 20) / 2 + 16
        assert_eq!(quads[0].rect, [48.5, 33.0, 4.0, 5.0]);
    }

    #[test]
    fn unpacked_characters_are_skipped() {
        let quads = place_text(&strip(), &[label(20.0, "a?a")]);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].rect[0] - quads[0].rect[0], 5.0);
    }
}
