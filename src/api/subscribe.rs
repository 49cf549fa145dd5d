use askama::Template;
use axum::{routing::get, Router};

use crate::api::state::AppState;
use crate::db::CardStore;
use crate::services::metrics_tier::UPSELL_MESSAGE;

#[derive(Template)]
#[template(path = "subscribe.html")]
struct SubscribeTemplate {
    message: &'static str,
}

async fn subscribe_info() -> SubscribeTemplate {
    SubscribeTemplate {
        message: UPSELL_MESSAGE,
    }
}

pub fn router<S: CardStore>() -> Router<AppState<S>> {
    Router::new().route("/subscribe", get(subscribe_info))
}
