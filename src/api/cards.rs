use askama::Template;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    routing::get,
    Router,
};
use std::net::{IpAddr, SocketAddr};

use crate::api::state::AppState;
use crate::db::CardStore;
use crate::error::{AppError, Result};
use crate::services::{CardView, Visitor};

/// How long the page waits for the native app before opening the web profile
const SOCIAL_FALLBACK_DELAY_MS: u32 = 1500;

#[derive(Template)]
#[template(path = "card.html")]
struct CardTemplate {
    card: CardView,
    fallback_delay_ms: u32,
}

/// Shows a card and records the visit
async fn show_card<S: CardStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<CardTemplate> {
    let card_id = parse_card_id(&raw_id)?;
    let visitor = visitor_from_request(&headers, peer.map(|ConnectInfo(addr)| addr));

    let card = state.service.show_card(card_id, &visitor).await?;

    tracing::info!(card_id, "Card viewed");

    Ok(CardTemplate {
        card,
        fallback_delay_ms: SOCIAL_FALLBACK_DELAY_MS,
    })
}

/// Card ids that are not an `i32` cannot exist, so they are reported as not
/// found rather than as a malformed request.
pub fn parse_card_id(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::card_not_found())
}

/// Client address from the first `X-Forwarded-For` hop, else the TCP peer
pub fn visitor_from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Visitor {
    let forwarded = header_value(headers, "x-forwarded-for", 256).and_then(|value| {
        value
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(strip_port)
    });

    Visitor {
        ip: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
        user_agent: header_value(headers, "user-agent", 512),
    }
}

/// Drops a port or IPv6 brackets from a proxy-reported address
fn strip_port(raw: &str) -> String {
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return ip.to_string();
    }
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    raw.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn header_value(headers: &HeaderMap, name: &str, max_len: usize) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.chars().take(max_len).collect())
}

pub fn router<S: CardStore>() -> Router<AppState<S>> {
    Router::new().route("/card/:card_id", get(show_card::<S>))
}
