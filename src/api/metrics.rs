use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::{cards::parse_card_id, state::AppState};
use crate::db::CardStore;
use crate::error::Result;
use crate::services::metrics_tier::MetricsReport;

/// Scan metrics; detail rows only for subscribed owners
async fn card_metrics<S: CardStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MetricsReport>> {
    let card_id = parse_card_id(&raw_id)?;
    let report = state.service.metrics(card_id).await?;
    Ok(Json(report))
}

pub fn router<S: CardStore>() -> Router<AppState<S>> {
    Router::new().route("/metrics/:card_id", get(card_metrics::<S>))
}
