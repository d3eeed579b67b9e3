use image::DynamicImage;
use parking_lot::Mutex;
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::card::{DriverCard, FetchTicket, PhotoSource};
use crate::config::Config;
use crate::openf1::{DriverLookup, DriverProfile, LookupError};
use crate::photos::{PhotoError, PhotoManager};
use crate::roster::Roster;
use crate::ui::{self, GridLayout, Theme};

/// Where keyboard input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigating the card grid
    Browse,
    /// Typing a driver number into the search bar
    Search,
}

/// Completion of a background task, applied on the UI loop
#[derive(Debug)]
pub enum Update {
    Profile {
        ticket: FetchTicket,
        result: Result<DriverProfile, LookupError>,
    },
    Photo {
        ticket: FetchTicket,
        url: String,
        result: Result<DynamicImage, PhotoError>,
    },
}

/// Application state: the driver list, its cards and the search bar
pub struct App<L: DriverLookup> {
    /// Driver numbers in display order
    roster: Roster,
    /// One card per roster entry
    cards: HashMap<String, DriverCard>,
    /// Pending search text
    search: String,
    mode: InputMode,
    /// Index of the selected card in roster order
    selected: usize,
    grid: GridLayout,
    config: Config,
    theme: Theme,
    lookup: Arc<L>,
    photos: Option<Arc<Mutex<PhotoManager>>>,
    /// Next fetch generation; never reused
    generation: u64,
    updates_tx: UnboundedSender<Update>,
    updates_rx: UnboundedReceiver<Update>,
}

impl<L: DriverLookup> App<L> {
    /// Create the app and start fetching the seed drivers.
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config, lookup: L, photos: Option<Arc<Mutex<PhotoManager>>>) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let theme = config.resolve_theme();
        let roster = Roster::seeded(&config.roster.seed);

        let mut app = Self {
            roster: Roster::default(),
            cards: HashMap::new(),
            search: String::new(),
            mode: InputMode::Browse,
            selected: 0,
            grid: GridLayout::default(),
            config,
            theme,
            lookup: Arc::new(lookup),
            photos,
            generation: 0,
            updates_tx,
            updates_rx,
        };

        for id in roster.iter() {
            app.mount_card(id.to_string());
        }
        app.roster = roster;
        tracing::info!("Gallery started with {} drivers", app.roster.len());

        app
    }

    fn next_generation(&mut self) -> u64 {
        let generation = self.generation;
        self.generation += 1;
        generation
    }

    fn mount_card(&mut self, id: String) {
        let generation = self.next_generation();
        let (card, ticket) = DriverCard::mount(id.clone(), generation);
        self.cards.insert(id, card);
        self.spawn_lookup(ticket);
    }

    fn spawn_lookup(&self, ticket: FetchTicket) {
        tracing::debug!(driver = %ticket.identifier, generation = ticket.generation, "Fetching driver");
        let lookup = Arc::clone(&self.lookup);
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let result = lookup.lookup(&ticket.identifier).await;
            // Receiver only goes away on shutdown
            let _ = tx.send(Update::Profile { ticket, result });
        });
    }

    fn spawn_photo(&self, ticket: FetchTicket, url: String) {
        let Some(photos) = &self.photos else {
            return;
        };
        let loader = photos.lock().loader();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let result = loader.fetch(&url).await;
            let _ = tx.send(Update::Photo { ticket, url, result });
        });
    }

    fn photos_active(&self) -> bool {
        self.config.cards.show_photo
            && self
                .photos
                .as_ref()
                .is_some_and(|p| p.lock().supports_graphics())
    }

    /// Apply one background completion. Returns `false` when it was stale.
    pub fn apply(&mut self, update: Update) -> bool {
        match update {
            Update::Profile { ticket, result } => self.apply_profile(ticket, result),
            Update::Photo { ticket, url, result } => self.apply_photo(ticket, url, result),
        }
    }

    fn apply_profile(&mut self, ticket: FetchTicket, result: Result<DriverProfile, LookupError>) -> bool {
        let photos_active = self.photos_active();
        let Some(card) = self.cards.get_mut(&ticket.identifier) else {
            tracing::debug!(driver = %ticket.identifier, "Dropping lookup for removed card");
            return false;
        };
        if !card.resolve(&ticket, result) {
            return false;
        }

        if photos_active {
            if let Some(profile) = card.state().profile() {
                let photo = PhotoSource::for_profile(profile, &self.config.photos.placeholder_url);
                let url = photo.current().map(str::to_owned);
                card.set_photo(photo);
                if let Some(url) = url {
                    self.spawn_photo(ticket, url);
                }
            }
        }
        true
    }

    fn apply_photo(&mut self, ticket: FetchTicket, url: String, result: Result<DynamicImage, PhotoError>) -> bool {
        let Some(card) = self.cards.get_mut(&ticket.identifier) else {
            return false;
        };
        if !card.is_current(&ticket) {
            return false;
        }
        let Some(photo) = card.photo_mut() else {
            return false;
        };
        if photo.current() != Some(url.as_str()) {
            return false;
        }

        match result {
            Ok(img) => {
                if let Some(photos) = &self.photos {
                    photos.lock().install(&ticket.identifier, img);
                }
            }
            Err(e) => {
                tracing::debug!(driver = %ticket.identifier, "Photo {} failed: {}", url, e);
                if let Some(next) = photo.on_load_error().map(str::to_owned) {
                    self.spawn_photo(ticket, next);
                }
            }
        }
        true
    }

    /// Apply every completion that is already waiting. Never blocks.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates_rx.try_recv() {
            if self.apply(update) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion and apply it
    #[allow(dead_code)] // Used in tests
    pub async fn next_update(&mut self) -> bool {
        match self.updates_rx.recv().await {
            Some(update) => self.apply(update),
            None => false,
        }
    }

    // -- Driver list ------------------------------------------------------

    /// Submit the search bar. Adds the trimmed number if it is new.
    pub fn submit_search(&mut self) -> Option<String> {
        let id = self.roster.submit(&self.search)?;
        tracing::info!("Adding driver {}", id);
        self.search.clear();
        self.mount_card(id.clone());
        self.selected = self.roster.len() - 1;
        Some(id)
    }

    /// Remove a driver and its card. No-op if absent.
    pub fn remove_driver(&mut self, id: &str) -> bool {
        if !self.roster.remove(id) {
            return false;
        }
        tracing::info!("Removing driver {}", id);
        self.cards.remove(id);
        if let Some(photos) = &self.photos {
            photos.lock().evict(id);
        }
        if self.selected >= self.roster.len() {
            self.selected = self.roster.len().saturating_sub(1);
        }
        true
    }

    /// Trigger the remove action of the selected card, if it shows one
    pub fn remove_selected(&mut self) -> Option<String> {
        let mut requested = None;
        if let Some(card) = self.selected_card().filter(|c| c.is_removable()) {
            card.on_remove_clicked(|id| requested = Some(id));
        }
        let id = requested?;
        self.remove_driver(&id).then_some(id)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Cards in display order
    pub fn cards(&self) -> Vec<&DriverCard> {
        self.roster.iter().filter_map(|id| self.cards.get(id)).collect()
    }

    #[allow(dead_code)] // Used in tests
    pub fn card(&self, id: &str) -> Option<&DriverCard> {
        self.cards.get(id)
    }

    pub fn selected_card(&self) -> Option<&DriverCard> {
        self.roster.get(self.selected).and_then(|id| self.cards.get(id))
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    // -- Navigation -------------------------------------------------------

    /// Recompute the grid for a new terminal size
    pub fn set_viewport(&mut self, area: Rect) {
        let gallery = ui::gallery_area(area);
        let card_height = self.config.card_display_config().card_height();
        self.grid = GridLayout::fit(gallery.width, gallery.height, card_height, self.config.appearance.columns);
    }

    pub fn select_up(&mut self) {
        self.selected = self.grid.move_up(self.selected);
    }

    pub fn select_down(&mut self) {
        self.selected = self.grid.move_down(self.selected, self.roster.len());
    }

    pub fn select_left(&mut self) {
        self.selected = self.grid.move_left(self.selected);
    }

    pub fn select_right(&mut self) {
        self.selected = self.grid.move_right(self.selected, self.roster.len());
    }

    pub fn select_next(&mut self) {
        self.selected = self.grid.tab_next(self.selected, self.roster.len());
    }

    pub fn select_prev(&mut self) {
        self.selected = self.grid.tab_prev(self.selected, self.roster.len());
    }

    pub fn page_up(&mut self) {
        self.selected = self.grid.page_up(self.selected);
    }

    pub fn page_down(&mut self) {
        self.selected = self.grid.page_down(self.selected, self.roster.len());
    }

    // -- Search bar -------------------------------------------------------

    pub fn is_searching(&self) -> bool {
        self.mode == InputMode::Search
    }

    pub fn start_search(&mut self) {
        self.mode = InputMode::Search;
    }

    /// Leave the search bar, keeping its text
    pub fn stop_search(&mut self) {
        self.mode = InputMode::Browse;
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    // -- Accessors --------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn photos(&self) -> Option<&Arc<Mutex<PhotoManager>>> {
        self.photos.as_ref()
    }
}
