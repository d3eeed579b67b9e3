//! Per-card fetch lifecycle.
//!
//! Every card owns one driver identifier and resolves it to a profile. Each
//! fetch is issued under a [`FetchTicket`]; completions that carry a ticket
//! other than the card's current one are dropped, so a slow response for an
//! old identifier can never overwrite a newer one.

use crate::openf1::{DriverProfile, LookupError};

/// The only message a card ever shows for a failed lookup
pub const LOAD_ERROR_MESSAGE: &str = "No se pudo cargar la informacion del piloto.";

/// Shown while a lookup is outstanding
pub const LOADING_MESSAGE: &str = "Cargando datos del piloto...";

/// Resolution state of one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Loading,
    Error(String),
    Ready(DriverProfile),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn profile(&self) -> Option<&DriverProfile> {
        match self {
            FetchState::Ready(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Identifies one fetch cycle of one card
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub identifier: String,
    pub generation: u64,
}

/// A single driver card
#[derive(Debug, Clone)]
pub struct DriverCard {
    identifier: String,
    generation: u64,
    state: FetchState,
    photo: Option<PhotoSource>,
}

impl DriverCard {
    /// Mount a card. It starts in `Loading` and the returned ticket must be
    /// used for the fetch it needs.
    pub fn mount(identifier: impl Into<String>, generation: u64) -> (Self, FetchTicket) {
        let card = Self {
            identifier: identifier.into(),
            generation,
            state: FetchState::Loading,
            photo: None,
        };
        let ticket = card.ticket();
        (card, ticket)
    }

    /// Point the card at another identifier.
    ///
    /// Returns a ticket for the new fetch, or `None` when the identifier is
    /// unchanged and nothing needs to happen.
    #[allow(dead_code)] // Used in tests
    pub fn on_identifier_change(&mut self, identifier: &str, generation: u64) -> Option<FetchTicket> {
        if identifier == self.identifier {
            return None;
        }
        self.identifier = identifier.to_string();
        self.generation = generation;
        self.state = FetchState::Loading;
        self.photo = None;
        Some(self.ticket())
    }

    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            identifier: self.identifier.clone(),
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && ticket.identifier == self.identifier
    }

    /// Apply a lookup result. Returns `false` if the result was dropped,
    /// either because the ticket is stale or the cycle already finished.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<DriverProfile, LookupError>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                driver = %ticket.identifier,
                generation = ticket.generation,
                "Dropping stale driver lookup"
            );
            return false;
        }
        if !self.state.is_loading() {
            return false;
        }

        self.state = match result {
            Ok(profile) => FetchState::Ready(profile),
            Err(e) => {
                tracing::warn!(driver = %self.identifier, "Driver lookup failed: {}", e);
                FetchState::Error(LOAD_ERROR_MESSAGE.to_string())
            }
        };
        true
    }

    /// Only a ready card offers its remove action
    pub fn is_removable(&self) -> bool {
        self.state.profile().is_some()
    }

    /// Hand this card's identifier to the owner's removal callback
    pub fn on_remove_clicked<F: FnOnce(String)>(&self, remove: F) {
        remove(self.identifier.clone());
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn photo_mut(&mut self) -> Option<&mut PhotoSource> {
        self.photo.as_mut()
    }

    /// Attach the photo rule once the card is ready
    pub fn set_photo(&mut self, photo: PhotoSource) {
        if self.state.profile().is_some() {
            self.photo = Some(photo);
        }
    }
}

/// Which photo URL a card is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhotoStage {
    Primary,
    Placeholder,
    Detached,
}

/// Photo with a one-shot fallback.
///
/// The headshot is tried first. If it fails to load the placeholder is used,
/// and if that fails as well the rule detaches and nothing else is tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSource {
    primary: Option<String>,
    placeholder: String,
    stage: PhotoStage,
}

impl PhotoSource {
    pub fn new(primary: Option<String>, placeholder: String) -> Self {
        let stage = if primary.is_some() {
            PhotoStage::Primary
        } else {
            PhotoStage::Placeholder
        };
        Self {
            primary,
            placeholder,
            stage,
        }
    }

    /// Build the rule for a profile from a placeholder URL template
    pub fn for_profile(profile: &DriverProfile, placeholder_template: &str) -> Self {
        Self::new(
            profile.headshot_url.clone(),
            placeholder_url(placeholder_template, profile.number),
        )
    }

    /// URL that should currently be displayed
    pub fn current(&self) -> Option<&str> {
        match self.stage {
            PhotoStage::Primary => self.primary.as_deref(),
            PhotoStage::Placeholder => Some(&self.placeholder),
            PhotoStage::Detached => None,
        }
    }

    /// Record that the current URL failed to load and return the next one
    pub fn on_load_error(&mut self) -> Option<&str> {
        self.stage = match self.stage {
            PhotoStage::Primary => PhotoStage::Placeholder,
            PhotoStage::Placeholder | PhotoStage::Detached => PhotoStage::Detached,
        };
        self.current()
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_placeholder(&self) -> bool {
        self.stage == PhotoStage::Placeholder
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_detached(&self) -> bool {
        self.stage == PhotoStage::Detached
    }
}

/// Expand `{number}` in a placeholder template
pub fn placeholder_url(template: &str, number: u32) -> String {
    template.replace("{number}", &number.to_string())
}
