//! Card gallery drawing
//!
//! Lays the cards of the current page out on the grid, then draws cached
//! photos over the photo slots of ready cards.

use parking_lot::Mutex;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Paragraph, Wrap},
    Frame,
};
use ratatui_image::{Resize, StatefulImage};
use std::sync::Arc;

use crate::app::App;
use crate::card::DriverCard;
use crate::openf1::DriverLookup;
use crate::photos::PhotoManager;
use crate::ui::driver_card::{CardDisplayConfig, DriverCardWidget};
use crate::ui::layout::GridLayout;
use crate::ui::theme::Theme;

/// Gap between columns
const COLUMN_GAP: u16 = 2;

const EMPTY_MESSAGE: &str = "Aun no hay pilotos agregados. Usa la barra de busqueda.";

/// Position of each card on the current page
struct Placement<'a> {
    card: &'a DriverCard,
    area: Rect,
    selected: bool,
}

fn place_cards<'a>(
    cards: &[&'a DriverCard],
    selected: usize,
    area: Rect,
    grid: &GridLayout,
    card_height: u16,
) -> Vec<Placement<'a>> {
    let columns = grid.columns;
    let column_width = area.width.saturating_sub(COLUMN_GAP * (columns - 1)) / columns;
    let range = grid.visible_range(selected, cards.len());
    let page_start = range.start;

    cards[range]
        .iter()
        .copied()
        .enumerate()
        .filter_map(|(local_idx, card)| {
            let (row, col) = grid.index_to_position(local_idx);
            let y = area.y + row * card_height;
            // Skip cards that would be cut off at the bottom
            if y + card_height > area.y + area.height {
                return None;
            }
            Some(Placement {
                card,
                area: Rect {
                    x: area.x + col * (column_width + COLUMN_GAP),
                    y,
                    width: column_width,
                    height: card_height,
                },
                selected: page_start + local_idx == selected,
            })
        })
        .collect()
}

pub(super) fn draw_gallery<L: DriverLookup>(f: &mut Frame, app: &App<L>, area: Rect, theme: &Theme) {
    if app.is_empty() {
        draw_empty(f, area, theme);
        return;
    }

    let config = app.config();
    let display = config.card_display_config();
    let card_height = display.card_height();
    let grid = GridLayout::fit(area.width, area.height, card_height, config.appearance.columns);
    let cards = app.cards();
    let placements = place_cards(&cards, app.selected_index(), area, &grid, card_height);

    let photos = app
        .photos()
        .filter(|mgr| display.show_photo && mgr.lock().supports_graphics());

    for placement in &placements {
        let photo_drawn = photos.is_some_and(|mgr| has_photo(mgr, placement.card));
        let widget = DriverCardWidget::new(placement.card, theme)
            .selected(placement.selected)
            .config(display)
            .photo_drawn(photo_drawn);
        f.render_widget(widget, placement.area);
    }

    if let Some(mgr) = photos {
        draw_photos(f, &placements, mgr, &display);
    }
}

fn has_photo(mgr: &Arc<Mutex<PhotoManager>>, card: &DriverCard) -> bool {
    card.state().profile().is_some() && mgr.lock().get_cached(card.identifier()).is_some()
}

/// Render cached photos into the photo slots of ready cards
fn draw_photos(f: &mut Frame, placements: &[Placement<'_>], mgr: &Arc<Mutex<PhotoManager>>, display: &CardDisplayConfig) {
    // Collect under the lock, render after releasing it
    let mut to_render = Vec::new();
    {
        let mgr = mgr.lock();
        for placement in placements {
            if placement.card.state().profile().is_none() {
                continue;
            }
            let Some(slot) = display.photo_area(placement.area) else {
                continue;
            };
            if let Some(protocol) = mgr.get_cached(placement.card.identifier()) {
                to_render.push((slot, protocol));
            }
        }
    }

    for (slot, protocol) in to_render {
        let image = StatefulImage::new(None).resize(Resize::Fit(None));
        let mut proto = protocol.lock();
        f.render_stateful_widget(image, slot, &mut *proto);
    }
}

fn draw_empty(f: &mut Frame, area: Rect, theme: &Theme) {
    if area.height == 0 {
        return;
    }
    let message_area = Rect {
        y: area.y + area.height / 3,
        height: area.height - area.height / 3,
        ..area
    };
    let message = Paragraph::new(EMPTY_MESSAGE)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(message, message_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: usize) -> Vec<DriverCard> {
        (0..n).map(|i| DriverCard::mount(i.to_string(), i as u64).0).collect()
    }

    #[test]
    fn test_place_cards_row_major() {
        let owned = cards(5);
        let refs: Vec<&DriverCard> = owned.iter().collect();
        let area = Rect::new(0, 4, 104, 22);
        let grid = GridLayout::fit(area.width, area.height, 11, 0);
        assert_eq!(grid, GridLayout::new(3, 2));

        let placed = place_cards(&refs, 4, area, &grid, 11);
        assert_eq!(placed.len(), 5);
        // (104 - 2 * 2) / 3 = 33 wide
        assert_eq!(placed[1].area, Rect::new(35, 4, 33, 11));
        assert_eq!(placed[3].area, Rect::new(0, 15, 33, 11));
        assert!(placed[4].selected);
        assert!(!placed[0].selected);
    }

    #[test]
    fn test_place_cards_second_page() {
        let owned = cards(8);
        let refs: Vec<&DriverCard> = owned.iter().collect();
        let area = Rect::new(0, 0, 40, 11);
        let grid = GridLayout::fit(area.width, area.height, 11, 0);

        let placed = place_cards(&refs, 5, area, &grid, 11);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].card.identifier(), "5");
        assert!(placed[0].selected);
    }
}
