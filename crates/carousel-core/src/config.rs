// ABOUTME: Application configuration handling.
// ABOUTME: Loads layout, animation, title and color settings from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Color, Easing};

/// Proportions that size the scroll container and its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Scroll container height as a fraction of the root view height
    pub scroll_height_fraction: f64,

    /// Scroll container width as a fraction of the root view width
    pub scroll_width_fraction: f64,

    /// Content width as a multiple of the scroll container width
    pub content_width_ratio: f64,

    /// Width of the outer panels relative to the middle one.
    /// Slightly under 1.0 hides a one-pixel seam left of the middle panel on
    /// some rasterizers; set to 1.0 for exactly equal thirds.
    pub panel_seam_multiplier: f64,

    /// Before the entrance animation the scroll container is centered at
    /// root height divided by this value
    pub start_center_divisor: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            scroll_height_fraction: 0.36,
            scroll_width_fraction: 0.85,
            content_width_ratio: 1.5,
            panel_seam_multiplier: 0.99,
            start_center_divisor: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Duration of the grow-into-place animation
    pub entrance_duration_secs: f64,

    /// Duration of the content-offset scroll that follows it
    pub scroll_duration_secs: f64,

    pub easing: Easing,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            entrance_duration_secs: 1.75,
            scroll_duration_secs: 0.3,
            easing: Easing::EaseInOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleSettings {
    pub text: String,

    /// Font size in points
    pub font_size: f32,

    /// Distance from the top of the root view to the label
    pub top_offset: f64,

    /// TTF/OTF file used for the label. Common system fonts are tried if unset.
    pub font_path: Option<PathBuf>,
}

impl Default for TitleSettings {
    fn default() -> Self {
        Self {
            text: "aGupieWare".to_string(),
            font_size: 26.0,
            top_offset: 64.0,
            font_path: None,
        }
    }
}

/// Fill colors; they only mark which view is which
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Color,
    pub title: Color,
    pub scroll: Color,
    pub content: Color,
    pub left: Color,
    pub middle: Color,
    pub right: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            title: Color::DARK_GRAY,
            scroll: Color::BROWN,
            content: Color::CYAN,
            left: Color::BLUE,
            middle: Color::YELLOW,
            right: Color::GREEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "carousel".to_string(),
            width: 375,
            height: 667,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowSettings,
    pub title: TitleSettings,
    pub layout: LayoutSettings,
    pub animation: AnimationSettings,
    pub colors: Palette,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

impl Config {
    /// Get the default config file path (~/.config/carousel/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("carousel").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default_from(&path),
            None => Self::default(),
        }
    }

    /// Defaults when `path` is missing; a file that exists but fails to load
    /// is reported before falling back.
    pub fn load_or_default_from(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
