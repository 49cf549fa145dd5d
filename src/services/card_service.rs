use serde::Serialize;

use crate::db::{CardRepository, CardStore};
use crate::error::{AppError, Result};
use crate::models::{Card, NewCard};
use crate::services::metrics_tier::{MetricsReport, Tier};
use crate::services::scan_recorder::{ScanRecorder, Visitor};
use crate::services::social_links::{social_links, SocialLinks};

/// Everything the card page needs, independent of how it is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub card_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub social: Option<SocialLinks>,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        let social = social_links(card.social_handle.as_deref());
        Self {
            card_id: card.id,
            name: card.name,
            email: card.email,
            phone: card.phone,
            social,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardService<S> {
    store: S,
    recorder: ScanRecorder,
    base_url: String,
}

impl<S: CardStore> CardService<S> {
    pub fn new(store: S, recorder: ScanRecorder, base_url: impl Into<String>) -> Self {
        Self {
            store,
            recorder,
            base_url: base_url.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Card lookup without side effects
    pub async fn find_card(&self, card_id: i32) -> Result<Card> {
        let mut handle = self.store.acquire().await?;
        lookup(&mut handle, card_id).await
    }

    /// Looks the card up, records one scan and returns the page model.
    /// An unknown card writes nothing.
    pub async fn show_card(&self, card_id: i32, visitor: &Visitor) -> Result<CardView> {
        let mut handle = self.store.acquire().await?;

        let card = lookup(&mut handle, card_id).await?;
        self.recorder.record(&mut handle, card.id, visitor).await?;

        Ok(CardView::from(card))
    }

    /// Scan metrics for a card, shaped by the owner's current subscription
    pub async fn metrics(&self, card_id: i32) -> Result<MetricsReport> {
        let mut handle = self.store.acquire().await?;

        let card = lookup(&mut handle, card_id).await?;
        let tier = Tier::from_subscription(handle.subscription_flag(card.owner_id).await?);

        let report = match tier {
            Tier::Free => MetricsReport::free(card.id, handle.count_scans(card.id).await?),
            Tier::Subscribed => MetricsReport::subscribed(card.id, handle.list_scans(card.id).await?),
        };

        tracing::debug!(
            card_id = card.id,
            owner_id = card.owner_id,
            tier = ?tier,
            scan_count = report.scan_count(),
            "Metrics computed"
        );

        Ok(report)
    }

    /// Inserts the demo card unless its url is already taken.
    /// Returns whether a row was written.
    pub async fn seed_demo_card(&self) -> Result<bool> {
        let mut handle = self.store.acquire().await?;

        let inserted = handle.insert_card(&demo_card(&self.base_url)).await?;
        if inserted {
            tracing::info!("Demo card inserted");
        } else {
            tracing::debug!("Demo card already present");
        }

        Ok(inserted)
    }
}

pub fn demo_card(base_url: &str) -> NewCard {
    NewCard {
        owner_id: 1,
        name: "Juan Perez".to_string(),
        email: "juan@example.com".to_string(),
        phone: "123-456-7890".to_string(),
        social_handle: None,
        url: format!("{}/card/1", base_url.trim_end_matches('/')),
    }
}

async fn lookup<R>(repo: &mut R, card_id: i32) -> Result<Card>
where
    R: CardRepository + Send,
{
    if card_id <= 0 {
        return Err(AppError::card_not_found());
    }

    repo.find_card(card_id)
        .await?
        .ok_or_else(AppError::card_not_found)
}
