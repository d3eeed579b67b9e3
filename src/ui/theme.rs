//! Theme system for the gallery
//!
//! Provides:
//! - Theme struct with all UI colors
//! - Built-in presets (pitlane, paddock, nord, gruvbox)
//! - Hex color parsing
//! - 256-color fallback

use ratatui::style::Color;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Screen background
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Card body background
    pub card_bg: Color,
    /// Card border
    pub card_border: Color,
    /// Border of the selected card
    pub selection_border: Color,
    /// Number badge, title and search focus
    pub accent: Color,
    /// Secondary text (team name)
    pub dimmed: Color,
    /// Tertiary text (hints, borders)
    pub dimmed_alt: Color,
    /// Loading placeholder background
    pub loading_bg: Color,
    /// Error alert background
    pub alert_bg: Color,
    /// Text on loading/alert backgrounds
    pub alert_fg: Color,
    /// Remove action
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::pitlane()
    }
}

impl Theme {
    /// Pitlane theme - default, dark gray with amber accents
    pub fn pitlane() -> Self {
        Self {
            background: Color::Rgb(17, 24, 39),        // #111827
            foreground: Color::Rgb(255, 255, 255),     // #ffffff
            card_bg: Color::Rgb(31, 41, 55),           // #1f2937
            card_border: Color::Rgb(202, 138, 4),      // #ca8a04
            selection_border: Color::Rgb(234, 179, 8), // #eab308
            accent: Color::Rgb(234, 179, 8),           // #eab308
            dimmed: Color::Rgb(156, 163, 175),         // #9ca3af
            dimmed_alt: Color::Rgb(75, 85, 99),        // #4b5563
            loading_bg: Color::Rgb(37, 99, 235),       // #2563eb
            alert_bg: Color::Rgb(220, 38, 38),         // #dc2626
            alert_fg: Color::Rgb(255, 255, 255),       // #ffffff
            danger: Color::Rgb(220, 38, 38),           // #dc2626
        }
    }

    /// Paddock theme - flat dark cards with light borders
    pub fn paddock() -> Self {
        Self {
            background: Color::Rgb(33, 37, 41),        // #212529
            foreground: Color::Rgb(248, 249, 250),     // #f8f9fa
            card_bg: Color::Rgb(33, 37, 41),           // #212529
            card_border: Color::Rgb(248, 249, 250),    // #f8f9fa
            selection_border: Color::Rgb(255, 193, 7), // #ffc107
            accent: Color::Rgb(255, 193, 7),           // #ffc107
            dimmed: Color::Rgb(173, 181, 189),         // #adb5bd
            dimmed_alt: Color::Rgb(108, 117, 125),     // #6c757d
            loading_bg: Color::Rgb(207, 244, 252),     // #cff4fc
            alert_bg: Color::Rgb(248, 215, 218),       // #f8d7da
            alert_fg: Color::Rgb(33, 37, 41),          // #212529
            danger: Color::Rgb(220, 53, 69),           // #dc3545
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),          // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244),       // #eceff4 (nord6)
            card_bg: Color::Rgb(59, 66, 82),             // #3b4252 (nord1)
            card_border: Color::Rgb(76, 86, 106),        // #4c566a (nord3)
            selection_border: Color::Rgb(136, 192, 208), // #88c0d0 (nord8)
            accent: Color::Rgb(235, 203, 139),           // #ebcb8b (nord13)
            dimmed: Color::Rgb(216, 222, 233),           // #d8dee9 (nord4)
            dimmed_alt: Color::Rgb(76, 86, 106),         // #4c566a (nord3)
            loading_bg: Color::Rgb(94, 129, 172),        // #5e81ac (nord10)
            alert_bg: Color::Rgb(191, 97, 106),          // #bf616a (nord11)
            alert_fg: Color::Rgb(236, 239, 244),         // #eceff4 (nord6)
            danger: Color::Rgb(191, 97, 106),            // #bf616a (nord11)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),         // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178),      // #ebdbb2 (fg)
            card_bg: Color::Rgb(60, 56, 54),            // #3c3836 (bg1)
            card_border: Color::Rgb(146, 131, 116),     // #928374 (gray)
            selection_border: Color::Rgb(250, 189, 47), // #fabd2f (bright yellow)
            accent: Color::Rgb(215, 153, 33),           // #d79921 (yellow)
            dimmed: Color::Rgb(168, 153, 132),          // #a89984 (gray)
            dimmed_alt: Color::Rgb(146, 131, 116),      // #928374 (gray)
            loading_bg: Color::Rgb(69, 133, 136),       // #458588 (blue)
            alert_bg: Color::Rgb(204, 36, 29),          // #cc241d (red)
            alert_fg: Color::Rgb(235, 219, 178),        // #ebdbb2 (fg)
            danger: Color::Rgb(251, 73, 52),            // #fb4934 (bright red)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pitlane" | "default" => Some(Self::pitlane()),
            "paddock" => Some(Self::paddock()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }

    /// Convert to 256-color approximation for limited terminals
    pub fn to_256_color(&self) -> Self {
        Self {
            background: approximate_256(self.background),
            foreground: approximate_256(self.foreground),
            card_bg: approximate_256(self.card_bg),
            card_border: approximate_256(self.card_border),
            selection_border: approximate_256(self.selection_border),
            accent: approximate_256(self.accent),
            dimmed: approximate_256(self.dimmed),
            dimmed_alt: approximate_256(self.dimmed_alt),
            loading_bg: approximate_256(self.loading_bg),
            alert_bg: approximate_256(self.alert_bg),
            alert_fg: approximate_256(self.alert_fg),
            danger: approximate_256(self.danger),
        }
    }
}

/// Parse hex color string to Color
/// Supports: #rrggbb, #rgb, rrggbb, rgb, #rrggbbaa
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ColorError::InvalidHex);
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ColorError::InvalidHex)
    };

    match s.len() {
        3 => Ok(Color::Rgb(channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)),
        // Alpha of the 8-digit form is ignored
        6 | 8 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => Err(ColorError::InvalidLength),
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq)]
pub enum ColorError {
    InvalidLength,
    InvalidHex,
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::InvalidLength => write!(f, "invalid color length (expected 3, 6, or 8 hex chars)"),
            ColorError::InvalidHex => write!(f, "invalid hex character"),
        }
    }
}

impl std::error::Error for ColorError {}

/// Approximate RGB color to nearest 256-color palette entry
fn approximate_256(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            // 6x6x6 cube at index 16, axis steps 0, 95, 135, 175, 215, 255
            let axis = |v: u8| {
                if v < 48 {
                    0
                } else if v < 115 {
                    1
                } else {
                    (v - 35) / 40
                }
            };
            Color::Indexed(16 + 36 * axis(r) + 6 * axis(g) + axis(b))
        }
        c => c,
    }
}

/// Serde deserializers for hex colors in the config file
pub mod serde_color {
    use super::*;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => parse_hex_color(&s).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
