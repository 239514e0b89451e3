// ABOUTME: Locates a TTF/OTF font for the title label.
// ABOUTME: Uses the configured path first, then common system font locations.

use std::path::{Path, PathBuf};

/// The title is set in a bold face, so bold files come first
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Font bytes for the label, or `None` if no usable file exists
pub fn load_font_data(configured: Option<&Path>) -> Option<Vec<u8>> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));
    first_readable(candidates)
}

fn first_readable(candidates: impl IntoIterator<Item = PathBuf>) -> Option<Vec<u8>> {
    for path in candidates {
        match std::fs::read(&path) {
            Ok(data) => {
                tracing::info!("Using font {}", path.display());
                return Some(data);
            }
            Err(e) => tracing::debug!("Font {} unavailable: {}", path.display(), e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_faces_are_tried_first() {
        let first_regular = SYSTEM_FONTS
            .iter()
            .position(|path| !path.contains("Bold") && !path.ends_with("bd.ttf"));
        assert!(SYSTEM_FONTS[0].contains("Bold"));
        assert!(SYSTEM_FONTS
            .iter()
            .take(first_regular.unwrap_or(SYSTEM_FONTS.len()))
            .all(|path| path.contains("Bold") || path.ends_with("bd.ttf")));
        assert!(first_regular.is_some());
    }

    #[test]
    fn missing_files_are_skipped() {
        let candidates = vec![
            PathBuf::from("/nonexistent/carousel/a.ttf"),
            PathBuf::from("/nonexistent/carousel/b.ttf"),
        ];
        assert!(first_readable(candidates).is_none());
    }

    #[test]
    fn first_readable_file_wins() {
        let dir = std::env::temp_dir().join(format!("carousel-fonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let font = dir.join("fake.ttf");
        std::fs::write(&font, b"not really a font").unwrap();

        let data = first_readable(vec![PathBuf::from("/nonexistent/x.ttf"), font.clone()]);
        assert_eq!(data.as_deref(), Some(&b"not really a font"[..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
