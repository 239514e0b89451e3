// ABOUTME: Single-row coverage texture holding the label's glyphs.
// ABOUTME: Packed once at startup; column zero is solid white so fills sample it too.

use std::collections::HashMap;

use fontdue::{Font, FontSettings};

/// Largest texture width every wgpu backend accepts
const MAX_WIDTH: u32 = 8192;

/// Columns before the first glyph: the white fill column and a blank gutter
const LEAD_COLUMNS: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    #[error("Label glyphs need a {0} texel wide atlas")]
    TooWide(u32),
}

/// One rasterized glyph before packing
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub c: char,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
    pub advance: f32,
    /// Left bearing and distance from the baseline to the bottom edge
    pub offset: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// `[x, y, width, height]` in texels
    pub texels: [u32; 4],
    pub advance: f32,
    pub offset: [f32; 2],
}

/// Glyph metrics are in pixels at `px`, the size the strip was rasterized at.
pub struct LabelAtlas {
    px: f32,
    ascent: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl LabelAtlas {
    /// Rasterize every distinct character of `text` at `px` physical pixels
    pub fn new(font_data: &[u8], px: f32, text: &str) -> Result<Self, AtlasError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| AtlasError::FontLoadError(e.to_string()))?;
        let (ascent, descent) = font
            .horizontal_line_metrics(px)
            .map_or((px * 0.8, px * -0.2), |m| (m.ascent, m.descent));

        let mut seen = Vec::new();
        let bitmaps = text
            .chars()
            .filter(|c| {
                let fresh = !seen.contains(c);
                seen.push(*c);
                fresh
            })
            .map(|c| {
                let (metrics, coverage) = font.rasterize(c, px);
                Bitmap {
                    c,
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    coverage,
                    advance: metrics.advance_width,
                    offset: [metrics.xmin as f32, metrics.ymin as f32],
                }
            })
            .collect();

        Self::from_bitmaps(px, ascent, ascent - descent, bitmaps)
    }

    /// Lay glyphs left to right after the lead columns, one texel apart
    pub fn from_bitmaps(
        px: f32,
        ascent: f32,
        line_height: f32,
        bitmaps: Vec<Bitmap>,
    ) -> Result<Self, AtlasError> {
        let width = LEAD_COLUMNS + bitmaps.iter().map(|b| b.width + 1).sum::<u32>();
        if width > MAX_WIDTH {
            return Err(AtlasError::TooWide(width));
        }
        let height = bitmaps.iter().map(|b| b.height).max().unwrap_or(0).max(1);

        let mut pixels = vec![0u8; (width * height) as usize];
        for row in 0..height {
            pixels[(row * width) as usize] = 255;
        }

        let mut glyphs = HashMap::new();
        let mut x = LEAD_COLUMNS;
        for bitmap in bitmaps {
            if bitmap.width > 0 {
                for (row, line) in bitmap.coverage.chunks(bitmap.width as usize).enumerate() {
                    let start = (row as u32 * width + x) as usize;
                    pixels[start..start + line.len()].copy_from_slice(line);
                }
            }
            glyphs.insert(
                bitmap.c,
                Glyph {
                    texels: [x, 0, bitmap.width, bitmap.height],
                    advance: bitmap.advance,
                    offset: bitmap.offset,
                },
            );
            x += bitmap.width + 1;
        }

        Ok(Self {
            px,
            ascent,
            line_height,
            glyphs,
            pixels,
            width,
            height,
        })
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn glyph(&self, c: char) -> Option<Glyph> {
        self.glyphs.get(&c).copied()
    }

    /// Width and line height (ascent to descent) of `text` at `px`.
    /// Characters that were not packed take no room.
    pub fn measure(&self, text: &str) -> (f32, f32) {
        let width = text
            .chars()
            .filter_map(|c| self.glyphs.get(&c))
            .map(|g| g.advance)
            .sum();
        (width, self.line_height)
    }

    /// `[u0, v0, u1, v1]` for a glyph's texels
    pub fn uv(&self, glyph: &Glyph) -> [f32; 4] {
        let [x, y, w, h] = glyph.texels;
        let (width, height) = (self.width as f32, self.height as f32);
        [
            x as f32 / width,
            y as f32 / height,
            (x + w) as f32 / width,
            (y + h) as f32 / height,
        ]
    }

    /// Texture coordinates inside the white column
    pub fn solid_uv(&self) -> [f32; 4] {
        let u = 0.5 / self.width as f32;
        [u, 0.5, u, 0.5]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Solid block glyph of the given size
    pub(crate) fn block(c: char, width: u32, height: u32, advance: f32) -> Bitmap {
        Bitmap {
            c,
            width,
            height,
            coverage: vec![200; (width * height) as usize],
            advance,
            offset: [1.0, -2.0],
        }
    }

    #[test]
    fn garbage_bytes_are_not_a_font() {
        let err = LabelAtlas::new(&[0, 1, 2, 3], 26.0, "a").err().unwrap();
        assert!(matches!(err, AtlasError::FontLoadError(_)));
    }

    #[test]
    fn glyphs_pack_left_to_right_after_white_column() {
        let atlas = LabelAtlas::from_bitmaps(
            20.0,
            16.0,
            20.0,
            vec![block('a', 3, 4, 5.0), block(' ', 0, 0, 4.0), block('b', 2, 6, 5.0)],
        )
        .unwrap();

        assert_eq!(atlas.dimensions(), (2 + 4 + 1 + 3, 6));
        assert_eq!(atlas.glyph('a').unwrap().texels, [2, 0, 3, 4]);
        assert_eq!(atlas.glyph(' ').unwrap().texels, [6, 0, 0, 0]);
        assert_eq!(atlas.glyph('b').unwrap().texels, [7, 0, 2, 6]);

        let (width, _) = atlas.dimensions();
        let pixels = atlas.pixels();
        assert!((0..6).all(|row| pixels[(row * width) as usize] == 255));
        assert_eq!(pixels[1], 0);
        assert_eq!(pixels[2], 200);
        // Below the short glyph stays blank
        assert_eq!(pixels[(5 * width + 2) as usize], 0);
    }

    #[test]
    fn measure_sums_packed_advances() {
        let atlas = LabelAtlas::from_bitmaps(
            20.0,
            16.0,
            22.0,
            vec![block('a', 3, 4, 5.0), block('b', 2, 6, 7.5)],
        )
        .unwrap();
        assert_eq!(atlas.measure("abba"), (25.0, 22.0));
        assert_eq!(atlas.measure("a?"), (5.0, 22.0));
    }

    #[test]
    fn uv_spans_glyph_texels() {
        let atlas = LabelAtlas::from_bitmaps(20.0, 16.0, 20.0, vec![block('a', 4, 5, 5.0)]).unwrap();
        let glyph = atlas.glyph('a').unwrap();
        assert_eq!(atlas.dimensions(), (7, 5));
        assert_eq!(atlas.uv(&glyph), [2.0 / 7.0, 0.0, 6.0 / 7.0, 1.0]);
        assert_eq!(atlas.solid_uv()[0], 0.5 / 7.0);
    }

    #[test]
    fn oversized_strip_is_rejected() {
        let wide = vec![block('w', 9000, 1, 9000.0)];
        assert!(matches!(
            LabelAtlas::from_bitmaps(20.0, 16.0, 20.0, wide),
            Err(AtlasError::TooWide(9003))
        ));
    }
}
