use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::openf1::DEFAULT_BASE_URL;
use crate::roster::DEFAULT_SEED;
use crate::ui::theme::{serde_color, Theme};
use crate::ui::CardDisplayConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub roster: RosterConfig,
    pub appearance: AppearanceConfig,
    pub cards: CardsConfig,
    pub photos: PhotosConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Drivers endpoint, queried with `?driver_number=`
    pub base_url: String,
    /// Request timeout. Unset means requests may wait forever.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Driver numbers shown at startup
    pub seed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Theme preset name
    pub theme: String,
    pub prompt: String,
    /// Fixed column count, 0 picks one from the terminal width
    pub columns: u16,
    /// Use RGB colors; otherwise approximate with the 256-color palette
    pub truecolor: bool,
    #[serde(deserialize_with = "serde_color::deserialize_option")]
    pub accent: Option<Color>,
    #[serde(deserialize_with = "serde_color::deserialize_option")]
    pub background: Option<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub show_photo: bool,
    pub show_team: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// Enable headshots on graphics-capable terminals
    pub enabled: bool,
    /// Raster size in pixels for downloaded photos
    pub size: u32,
    /// Fallback image URL, `{number}` is replaced by the driver number
    pub placeholder_url: String,
    /// Query graphics support even over SSH (normally skipped)
    pub force_over_ssh: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: "pitlane".to_string(),
            prompt: "❯ ".to_string(),
            columns: 0,
            truecolor: true,
            accent: None,
            background: None,
        }
    }
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            show_photo: true,
            show_team: true,
        }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 200,
            placeholder_url: "https://placehold.co/200x200/4F46E5/FFFFFF?text={number}".to_string(),
            force_over_ssh: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Default config location under the XDG config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("f1-gallery")
            .join("config.toml")
    }

    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the theme preset and apply color overrides
    pub fn resolve_theme(&self) -> Theme {
        let appearance = &self.appearance;
        let mut theme = Theme::from_preset(&appearance.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme preset '{}', using default", appearance.theme);
            Theme::default()
        });

        if let Some(accent) = appearance.accent {
            theme.accent = accent;
        }
        if let Some(background) = appearance.background {
            theme.background = background;
        }

        if appearance.truecolor {
            theme
        } else {
            theme.to_256_color()
        }
    }

    pub fn card_display_config(&self) -> CardDisplayConfig {
        CardDisplayConfig {
            show_photo: self.cards.show_photo,
            show_team: self.cards.show_team,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.openf1.org/v1/drivers");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.roster.seed, vec!["1", "81", "4"]);
        assert!(config.photos.placeholder_url.contains("{number}"));
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r##"
            [api]
            timeout_secs = 5

            [roster]
            seed = ["44", "16"]

            [appearance]
            theme = "nord"
            accent = "#ff0000"
            "##,
        )
        .unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.roster.seed, vec!["44", "16"]);
        assert_eq!(config.appearance.prompt, "❯ ");

        let theme = config.resolve_theme();
        assert_eq!(theme.accent, Color::Rgb(255, 0, 0));
        assert_eq!(theme.background, Theme::nord().background);
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(Config::parse("[appearance]\naccent = \"#zzz\"").is_err());
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = Config::parse("[appearance]\ntheme = \"nope\"").unwrap();
        assert_eq!(config.resolve_theme().background, Theme::default().background);
    }

    #[test]
    fn test_256_color_mode() {
        let config = Config::parse("[appearance]\ntruecolor = false").unwrap();
        assert!(matches!(config.resolve_theme().background, Color::Indexed(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/f1-gallery/config.toml").unwrap();
        assert_eq!(config.appearance.theme, "pitlane");
    }
}
