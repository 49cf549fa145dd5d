// API module - HTTP endpoints

pub mod cards;
pub mod health;
pub mod metrics;
pub mod state;
pub mod subscribe;

use axum::{routing::get, Router};

use crate::db::CardStore;
use state::AppState;

pub fn router<S: CardStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health::health_check::<S>))
        .merge(cards::router())
        .merge(metrics::router())
        .merge(subscribe::router())
}
