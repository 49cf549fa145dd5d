use crate::db::CardStore;
use crate::services::CardService;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState<S> {
    pub service: CardService<S>,
}

impl<S: CardStore> AppState<S> {
    pub fn new(service: CardService<S>) -> Self {
        Self { service }
    }
}
