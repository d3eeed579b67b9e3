//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw/` - Screen composition (header, search bar, gallery, status bar)
//! - `theme.rs` - Color themes and presets
//! - `layout.rs` - Grid layout logic
//! - `driver_card.rs` - Driver card widget

mod draw;
pub mod driver_card;
pub mod layout;
pub mod theme;

// Re-export main draw function
pub use draw::{draw, gallery_area};

// Re-export commonly used types
pub use driver_card::CardDisplayConfig;
pub use layout::GridLayout;
pub use theme::Theme;
