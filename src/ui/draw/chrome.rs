//! Title, search bar and status bar

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::openf1::DriverLookup;
use crate::ui::theme::Theme;

const TITLE: &str = "Galeria de Pilotos de F1";
const SEARCH_PLACEHOLDER: &str = "Buscar por numero";

pub(super) fn draw_title(f: &mut Frame, area: Rect, theme: &Theme) {
    let title = Paragraph::new(TITLE)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.foreground)
                .bg(theme.background)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title, area);
}

/// Draw the search bar; the cursor is shown while it has focus
pub(super) fn draw_search_bar<L: DriverLookup>(f: &mut Frame, app: &App<L>, area: Rect, theme: &Theme) {
    let prompt = &app.config().appearance.prompt;
    let searching = app.is_searching();

    let (text, style) = if app.search_text().is_empty() {
        let fg = if searching { theme.dimmed_alt } else { theme.dimmed };
        (
            format!("{}{}", prompt, SEARCH_PLACEHOLDER),
            Style::default().fg(fg).bg(theme.background),
        )
    } else {
        let fg = if searching { theme.accent } else { theme.foreground };
        (
            format!("{}{}", prompt, app.search_text()),
            Style::default().fg(fg).bg(theme.background),
        )
    };

    let border = if searching { theme.accent } else { theme.dimmed_alt };
    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Buscar ")
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(search, area);

    if searching {
        // +1 for the left border; widths, not byte lengths
        let cursor_x = area.x + 1 + prompt.width() as u16 + app.search_text().width() as u16;
        f.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the status bar with position and key hints
pub(super) fn draw_status_bar<L: DriverLookup>(f: &mut Frame, app: &App<L>, area: Rect, theme: &Theme) {
    let total = app.roster().len();

    let status = if app.is_searching() {
        " Enter: agregar | Ctrl+U: limpiar | Esc: volver | Ctrl+C: salir".to_string()
    } else if total == 0 {
        " 0 pilotos | /: buscar | q: salir".to_string()
    } else {
        let removable = app.selected_card().is_some_and(|c| c.is_removable());
        format!(
            " {}/{} | ←↓↑→: mover | Tab: siguiente{} | /: buscar | q: salir",
            app.selected_index() + 1,
            total,
            if removable { " | d: borrar" } else { "" }
        )
    };

    let status_bar = Paragraph::new(status).style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}
