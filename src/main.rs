mod app;
mod card;
mod config;
mod openf1;
mod photos;
mod roster;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use config::Config;
use openf1::{DriverLookup, OpenF1Client};
use photos::PhotoManager;

#[derive(Parser, Debug)]
#[command(name = "f1-gallery")]
#[command(about = "Gallery of Formula 1 drivers from the OpenF1 API")]
#[command(version)]
struct Cli {
    /// Driver numbers to show instead of the configured ones
    drivers: Vec<String>,

    /// Config file path [default: $XDG_CONFIG_HOME/f1-gallery/config.toml]
    #[arg(long)]
    config: Option<String>,

    /// Theme preset (pitlane, paddock, nord, gruvbox)
    #[arg(long)]
    theme: Option<String>,

    /// Drivers endpoint to query instead of OpenF1
    #[arg(long)]
    api_url: Option<String>,

    /// Do not download driver photos
    #[arg(long)]
    no_photos: bool,

    /// Log file [default: $XDG_CACHE_HOME/f1-gallery/f1-gallery.log]
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags win over the config file
    fn apply(&self, config: &mut Config) {
        if !self.drivers.is_empty() {
            config.roster.seed = self.drivers.clone();
        }
        if let Some(ref theme) = self.theme {
            config.appearance.theme = theme.clone();
        }
        if let Some(ref url) = self.api_url {
            config.api.base_url = url.clone();
        }
        if self.no_photos {
            config.photos.enabled = false;
        }
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("f1-gallery").join("f1-gallery.log"))
}

/// Log to a file so output does not tear the TUI; stderr if no file is usable
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "f1_gallery=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    let path = log_file.map(Path::to_path_buf).or_else(default_log_path);
    let Some(path) = path else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    registry
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    // Load config
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path().display().to_string());
    let mut config = Config::load(&config_path)?;
    cli.apply(&mut config);

    let client = OpenF1Client::new(config.api.base_url.clone(), config.api.timeout())
        .context("Failed to create HTTP client")?;
    tracing::info!("Using driver API at {}", client.base_url());

    // Graphics support must be queried before raw mode
    let photos = if config.photos.enabled && config.cards.show_photo {
        let manager = PhotoManager::new(&config.photos, config.api.timeout())
            .context("Failed to create photo loader")?;
        Some(Arc::new(Mutex::new(manager)))
    } else {
        None
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, client, photos);

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend, L: DriverLookup>(
    terminal: &mut Terminal<B>,
    app: &mut App<L>,
) -> Result<()> {
    loop {
        app.drain_updates();

        let size = terminal.size()?;
        app.set_viewport(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(app, key) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key<L: DriverLookup>(app: &mut App<L>, key: KeyEvent) -> Flow {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    if app.is_searching() {
        if key.code == KeyCode::Char('u') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.clear_search();
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Tab => app.stop_search(),
            KeyCode::Enter => {
                app.submit_search();
            }
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) => app.push_search_char(c),
            _ => {}
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('/') | KeyCode::Enter => app.start_search(),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            // Typing a number jumps straight into the search bar
            app.start_search();
            app.push_search_char(c);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.remove_selected();
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_up(),
        KeyCode::Down | KeyCode::Char('j') => app.select_down(),
        KeyCode::Left | KeyCode::Char('h') => app.select_left(),
        KeyCode::Right | KeyCode::Char('l') => app.select_right(),
        KeyCode::Tab => app.select_next(),
        KeyCode::BackTab => app.select_prev(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        _ => {}
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openf1::testing::{grid_lookup, TableLookup};

    fn press(app: &mut App<TableLookup>, code: KeyCode) -> Flow {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ids(app: &App<TableLookup>) -> Vec<&str> {
        app.roster().iter().collect()
    }

    #[tokio::test]
    async fn test_type_and_submit() {
        let mut app = App::new(Config::default(), grid_lookup(), None);

        press(&mut app, KeyCode::Char('4'));
        assert!(app.is_searching());
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(ids(&app), vec!["1", "81", "4", "44"]);
        assert_eq!(app.search_text(), "");
        assert!(app.is_searching());

        press(&mut app, KeyCode::Esc);
        assert!(!app.is_searching());
    }

    #[tokio::test]
    async fn test_duplicate_submit_keeps_text() {
        let mut app = App::new(Config::default(), grid_lookup(), None);
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('8'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(ids(&app), vec!["1", "81", "4"]);
        assert_eq!(app.search_text(), "81");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_text(), "8");
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.search_text(), "");
    }

    #[tokio::test]
    async fn test_delete_selected() {
        let mut app = App::new(Config::default(), grid_lookup(), None);
        // Loading cards offer no remove action
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(ids(&app), vec!["1", "81", "4"]);

        while app.cards().iter().any(|c| c.state().is_loading()) {
            app.next_update().await;
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(ids(&app), vec!["1", "4"]);
        press(&mut app, KeyCode::Delete);
        assert_eq!(ids(&app), vec!["1"]);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = App::new(Config::default(), grid_lookup(), None);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);

        // 'q' is text while searching
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Continue);
        assert_eq!(
            handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["f1-gallery", "--theme", "nord", "--no-photos", "44", "16"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.roster.seed, vec!["44", "16"]);
        assert_eq!(config.appearance.theme, "nord");
        assert!(!config.photos.enabled);
        assert_eq!(config.api.base_url, openf1::DEFAULT_BASE_URL);
    }
}
