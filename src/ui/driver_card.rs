//! Driver card widget
//!
//! Renders one card according to its fetch state:
//! - Loading: colored placeholder with a loading message
//! - Error: alert with the generic error message
//! - Ready: photo slot, name + number badge, team, remove action

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::card::{DriverCard, FetchState, LOADING_MESSAGE};
use crate::openf1::DriverProfile;

/// Label of the remove action
pub const REMOVE_LABEL: &str = "[ Borrar Piloto ]";

/// Rows reserved for the photo
const PHOTO_ROWS: u16 = 6;

/// Which parts of a ready card to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDisplayConfig {
    pub show_photo: bool,
    pub show_team: bool,
}

impl Default for CardDisplayConfig {
    fn default() -> Self {
        Self {
            show_photo: true,
            show_team: true,
        }
    }
}

impl CardDisplayConfig {
    /// Height of a card in lines, borders included
    pub fn card_height(&self) -> u16 {
        let mut height = 2 + 1 + 1; // borders, name, remove action
        if self.show_photo {
            height += PHOTO_ROWS;
        }
        if self.show_team {
            height += 1;
        }
        height
    }

    /// Area of the photo slot inside a card
    pub fn photo_area(&self, card: Rect) -> Option<Rect> {
        if !self.show_photo || card.width < 4 || card.height < self.card_height() {
            return None;
        }
        let inner_width = card.width - 2;
        // Terminal cells are about twice as tall as wide
        let width = (PHOTO_ROWS * 2).min(inner_width);
        Some(Rect {
            x: card.x + 1 + (inner_width - width) / 2,
            y: card.y + 1,
            width,
            height: PHOTO_ROWS,
        })
    }
}

/// Card widget
pub struct DriverCardWidget<'a> {
    card: &'a DriverCard,
    theme: &'a Theme,
    selected: bool,
    config: CardDisplayConfig,
    /// A graphics photo will be drawn over the photo slot
    photo_drawn: bool,
}

impl<'a> DriverCardWidget<'a> {
    pub fn new(card: &'a DriverCard, theme: &'a Theme) -> Self {
        Self {
            card,
            theme,
            selected: false,
            config: CardDisplayConfig::default(),
            photo_drawn: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn config(mut self, config: CardDisplayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn photo_drawn(mut self, photo_drawn: bool) -> Self {
        self.photo_drawn = photo_drawn;
        self
    }

    fn frame(&self, bg: ratatui::style::Color, border: ratatui::style::Color) -> Block<'static> {
        let border = if self.selected { self.theme.selection_border } else { border };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border).bg(bg))
            .style(Style::default().bg(bg));
        if self.selected {
            block.border_type(BorderType::Thick)
        } else {
            block.border_type(BorderType::Rounded)
        }
    }

    /// Loading and error states: a colored box with a centered message
    fn render_message(&self, message: &str, bg: ratatui::style::Color, area: Rect, buf: &mut Buffer) {
        let block = self.frame(bg, bg);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = (message.width() as u16).div_ceil(inner.width).max(1);
        let top = inner.y + inner.height.saturating_sub(lines) / 2;
        let text_area = Rect {
            x: inner.x,
            y: top,
            width: inner.width,
            height: inner.bottom() - top,
        };
        Paragraph::new(message)
            .style(Style::default().fg(self.theme.alert_fg).bg(bg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }

    fn render_ready(&self, profile: &DriverProfile, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let bg = theme.card_bg;
        let block = self.frame(bg, theme.card_border);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let max_y = inner.bottom();
        let mut y = inner.y;

        if self.config.show_photo {
            if !self.photo_drawn && y + PHOTO_ROWS / 2 < max_y {
                // No graphics: a large badge stands in for the photo
                let badge = format!("[ #{} ]", profile.number);
                let style = Style::default().fg(theme.accent).bg(bg).add_modifier(Modifier::BOLD);
                set_centered(buf, inner, y + PHOTO_ROWS / 2, &badge, style);
            }
            y += PHOTO_ROWS;
        }

        // Name followed by the number badge
        if y < max_y {
            let badge = format!("#{}", profile.number);
            let name_width = width.saturating_sub(badge.width() + 1);
            let name = truncate(&profile.full_name, name_width);
            let total = name.width() + 1 + badge.width();
            let x = inner.x + (width.saturating_sub(total) / 2) as u16;

            let name_style = Style::default().fg(theme.foreground).bg(bg).add_modifier(Modifier::BOLD);
            let badge_style = Style::default().fg(theme.accent).bg(bg).add_modifier(Modifier::BOLD);
            let (after_name, _) = buf.set_stringn(x, y, &name, width, name_style);
            buf.set_stringn(
                after_name + 1,
                y,
                &badge,
                (inner.right().saturating_sub(after_name + 1)) as usize,
                badge_style,
            );
            y += 1;
        }

        if self.config.show_team && y < max_y {
            let style = Style::default().fg(theme.dimmed).bg(bg);
            set_centered(buf, inner, y, &truncate(&profile.team_name, width), style);
        }

        // Remove action sits on the last inner row
        if inner.height > 1 {
            let style = if self.selected {
                Style::default().fg(theme.foreground).bg(theme.danger).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.danger).bg(bg)
            };
            set_centered(buf, inner, max_y - 1, &truncate(REMOVE_LABEL, width), style);
        }
    }
}

impl<'a> Widget for DriverCardWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        match self.card.state() {
            FetchState::Loading => self.render_message(LOADING_MESSAGE, self.theme.loading_bg, area, buf),
            FetchState::Error(message) => self.render_message(message, self.theme.alert_bg, area, buf),
            FetchState::Ready(profile) => self.render_ready(profile, area, buf),
        }
    }
}

/// Write a string horizontally centered within `area` on row `y`
fn set_centered(buf: &mut Buffer, area: Rect, y: u16, s: &str, style: Style) {
    let width = area.width as usize;
    let x = area.x + (width.saturating_sub(s.width()) / 2) as u16;
    buf.set_stringn(x, y, s, width, style);
}

/// Truncate string to fit within max_width, adding ellipsis if needed
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 1 {
        return "…".repeat(max_width);
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if current_width + char_width + 1 > max_width {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{FetchTicket, LOAD_ERROR_MESSAGE};
    use crate::openf1::LookupError;

    fn render(card: &DriverCard, width: u16, selected: bool) -> Vec<String> {
        let config = CardDisplayConfig::default();
        let area = Rect::new(0, 0, width, config.card_height());
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        DriverCardWidget::new(card, &theme)
            .selected(selected)
            .config(config)
            .render(area, &mut buf);

        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn ready_card() -> DriverCard {
        let (mut card, ticket) = DriverCard::mount("1", 0);
        card.resolve(
            &ticket,
            Ok(DriverProfile {
                full_name: "Max Verstappen".into(),
                number: 1,
                team_name: "Red Bull Racing".into(),
                headshot_url: Some("https://x/1.png".into()),
            }),
        );
        card
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hi", 2), "hi");
        assert_eq!(truncate("hello", 1), "…");
        assert_eq!(truncate("hello", 0), "");
    }

    #[test]
    fn test_card_height() {
        assert_eq!(CardDisplayConfig::default().card_height(), 11);
        let compact = CardDisplayConfig {
            show_photo: false,
            show_team: false,
        };
        assert_eq!(compact.card_height(), 4);
        assert_eq!(compact.photo_area(Rect::new(0, 0, 30, 11)), None);
    }

    #[test]
    fn test_photo_area_centered() {
        let config = CardDisplayConfig::default();
        let area = config.photo_area(Rect::new(10, 5, 32, 11)).unwrap();
        assert_eq!(area, Rect::new(20, 6, 12, 6));
    }

    #[test]
    fn test_ready_card_content() {
        let rows = render(&ready_card(), 40, false);
        let text = rows.join("\n");

        assert!(text.contains("Max Verstappen #1"));
        assert!(text.contains("Red Bull Racing"));
        assert!(text.contains("[ #1 ]"));
        assert!(rows[rows.len() - 2].contains(REMOVE_LABEL));
    }

    #[test]
    fn test_ready_card_with_photo_hides_badge() {
        let config = CardDisplayConfig::default();
        let area = Rect::new(0, 0, 40, config.card_height());
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        DriverCardWidget::new(&ready_card(), &theme)
            .photo_drawn(true)
            .render(area, &mut buf);

        let row: String = (0..40).map(|x| buf[(x, 4)].symbol()).collect();
        assert!(!row.contains("[ #1 ]"));
    }

    #[test]
    fn test_loading_card() {
        let (card, _) = DriverCard::mount("44", 0);
        let text = render(&card, 40, false).join("\n");
        assert!(text.contains(LOADING_MESSAGE));
        assert!(!text.contains("Borrar"));
    }

    #[test]
    fn test_error_card() {
        let (mut card, ticket) = DriverCard::mount("999", 0);
        card.resolve(&ticket, Err(LookupError::NotFound { number: "999".into() }));

        let text = render(&card, 60, false).join("\n");
        assert!(text.contains(LOAD_ERROR_MESSAGE));
        assert!(!text.contains("Borrar"));
    }

    #[test]
    fn test_narrow_error_wraps() {
        let (mut card, _) = DriverCard::mount("999", 0);
        let ticket = FetchTicket { identifier: "999".into(), generation: 0 };
        card.resolve(&ticket, Err(LookupError::NotFound { number: "999".into() }));

        let text = render(&card, 24, true).join(" ");
        assert!(text.contains("No se pudo"));
        assert!(text.contains("piloto."));
    }

    #[test]
    fn test_long_name_truncated() {
        let (mut card, ticket) = DriverCard::mount("1", 0);
        card.resolve(
            &ticket,
            Ok(DriverProfile {
                full_name: "Maximilian Emilian Verstappen-Longname".into(),
                number: 1,
                team_name: "Red Bull Racing".into(),
                headshot_url: None,
            }),
        );
        let rows = render(&card, 20, false);
        assert!(rows.iter().any(|r| r.contains("… #1")));
    }
}
