//! Grid layout for the card gallery
//!
//! Provides:
//! - Responsive column count (1-4 columns by terminal width)
//! - Row-major ordering, like a CSS grid
//! - Navigation helpers (up/down/left/right, tab)
//! - Pagination

use std::ops::Range;

/// Widths at which the gallery gains a column
const BREAKPOINTS: [u16; 3] = [60, 100, 140];

/// Grid layout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Number of columns
    pub columns: u16,
    /// Number of card rows that fit on screen
    pub visible_rows: u16,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 1,
            visible_rows: 1,
        }
    }
}

impl GridLayout {
    /// Create a new grid layout
    pub fn new(columns: u16, visible_rows: u16) -> Self {
        Self {
            columns: columns.clamp(1, 8),
            visible_rows: visible_rows.clamp(1, 20),
        }
    }

    /// Column count for a given width when none is configured
    pub fn responsive_columns(width: u16) -> u16 {
        1 + BREAKPOINTS.iter().filter(|&&bp| width >= bp).count() as u16
    }

    /// Fit a grid into an area. `columns == 0` means responsive.
    pub fn fit(width: u16, height: u16, card_height: u16, columns: u16) -> Self {
        let columns = if columns == 0 {
            Self::responsive_columns(width)
        } else {
            columns
        };
        Self::new(columns, height / card_height.max(1))
    }

    /// Total number of visible cards (columns × rows)
    pub fn visible_count(&self) -> usize {
        (self.columns as usize) * (self.visible_rows as usize)
    }

    /// Range of cards on the page holding `selected`
    pub fn visible_range(&self, selected: usize, total: usize) -> Range<usize> {
        if total == 0 {
            return 0..0;
        }

        let page_size = self.visible_count();
        let page = selected.min(total - 1) / page_size;
        let start = page * page_size;
        let end = (start + page_size).min(total);
        start..end
    }

    /// Convert a page-local index to (row, col), row-major:
    /// ```text
    /// Index:  0 1 2
    ///         3 4 5
    /// ```
    pub fn index_to_position(&self, index: usize) -> (u16, u16) {
        let cols = self.columns as usize;
        ((index / cols) as u16, (index % cols) as u16)
    }

    /// Selection after moving up one row
    pub fn move_up(&self, current: usize) -> usize {
        let cols = self.columns as usize;
        if current >= cols {
            current - cols
        } else {
            current
        }
    }

    /// Selection after moving down one row
    pub fn move_down(&self, current: usize, total: usize) -> usize {
        let cols = self.columns as usize;
        if current + cols < total {
            current + cols
        } else {
            current
        }
    }

    /// Selection after moving to the previous card
    pub fn move_left(&self, current: usize) -> usize {
        current.saturating_sub(1)
    }

    /// Selection after moving to the next card
    pub fn move_right(&self, current: usize, total: usize) -> usize {
        (current + 1).min(total.saturating_sub(1))
    }

    pub fn page_up(&self, current: usize) -> usize {
        current.saturating_sub(self.visible_count())
    }

    pub fn page_down(&self, current: usize, total: usize) -> usize {
        (current + self.visible_count()).min(total.saturating_sub(1))
    }

    /// Tab navigation (next with wrap)
    pub fn tab_next(&self, current: usize, total: usize) -> usize {
        if total == 0 {
            0
        } else {
            (current + 1) % total
        }
    }

    /// Shift+Tab navigation (previous with wrap)
    pub fn tab_prev(&self, current: usize, total: usize) -> usize {
        if total == 0 {
            0
        } else if current == 0 {
            total - 1
        } else {
            current - 1
        }
    }
}
