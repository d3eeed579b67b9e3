//! Drawing functions for the TUI
//!
//! The screen is one view, top to bottom:
//! - title
//! - search bar
//! - card gallery (or the empty-list message)
//! - status bar
//!
//! `gallery` renders the cards and their photos, `chrome` everything else.

mod chrome;
mod gallery;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};
use std::rc::Rc;

use crate::app::App;
use crate::openf1::DriverLookup;

use chrome::{draw_search_bar, draw_status_bar, draw_title};
use gallery::draw_gallery;

fn split(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search bar
            Constraint::Min(1),    // Gallery
            Constraint::Length(1), // Status bar
        ])
        .split(area)
}

/// Area the card grid occupies for a given screen size
pub fn gallery_area(area: Rect) -> Rect {
    split(area)[2]
}

/// Main draw function
pub fn draw<L: DriverLookup>(f: &mut Frame, app: &App<L>) {
    let theme = app.theme();
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let chunks = split(area);
    draw_title(f, chunks[0], theme);
    draw_search_bar(f, app, chunks[1], theme);
    draw_gallery(f, app, chunks[2], theme);
    draw_status_bar(f, app, chunks[3], theme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::openf1::testing::{grid_lookup, TableLookup};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App<TableLookup>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn settled_app() -> App<TableLookup> {
        let mut app = App::new(Config::default(), grid_lookup(), None);
        while app.cards().iter().any(|c| c.state().is_loading()) {
            app.next_update().await;
        }
        app.set_viewport(Rect::new(0, 0, 140, 30));
        app
    }

    #[test]
    fn test_gallery_area() {
        assert_eq!(gallery_area(Rect::new(0, 0, 80, 24)), Rect::new(0, 4, 80, 19));
    }

    #[tokio::test]
    async fn test_initial_loading_screen() {
        let app = App::new(Config::default(), grid_lookup(), None);
        let text = screen(&app, 140, 30);
        assert!(text.contains("Galeria de Pilotos de F1"));
        assert!(text.contains("Buscar por numero"));
        assert_eq!(text.matches("Cargando datos del piloto...").count(), 3);
    }

    #[tokio::test]
    async fn test_ready_gallery() {
        let app = settled_app().await;
        let text = screen(&app, 140, 30);
        assert!(text.contains("Max Verstappen #1"));
        assert!(text.contains("Oscar Piastri #81"));
        assert!(text.contains("Lando Norris #4"));
        assert_eq!(text.matches("Borrar Piloto").count(), 3);
    }

    #[tokio::test]
    async fn test_empty_message() {
        let mut app = settled_app().await;
        for id in ["1", "81", "4"] {
            app.remove_driver(id);
        }
        let text = screen(&app, 140, 30);
        assert!(text.contains("Aun no hay pilotos agregados. Usa la barra de busqueda."));
        assert!(!text.contains("Borrar Piloto"));
    }

    #[tokio::test]
    async fn test_remove_hint_only_for_ready_card() {
        let app = App::new(Config::default(), grid_lookup(), None);
        assert!(!screen(&app, 140, 30).contains("d: borrar"));

        let app = settled_app().await;
        assert!(screen(&app, 140, 30).contains("d: borrar"));
    }

    #[tokio::test]
    async fn test_search_text_shown() {
        let mut app = settled_app().await;
        app.start_search();
        app.push_search_char('4');
        app.push_search_char('4');
        let text = screen(&app, 140, 30);
        assert!(text.contains("❯ 44"));
        assert!(!text.contains("Buscar por numero"));
    }
}
