use crate::db::CardRepository;
use crate::models::{NewScan, Scan};
use crate::services::device_classifier::{self, DeviceDescriptor};
use crate::services::enrichment::Enrichment;
use crate::services::geo_resolver::{GeoLocation, GeoResolver};

/// Which columns a scan row carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Card id only
    Minimal,
    /// Card id plus ip, device and location
    Enriched,
}

/// Request facts about whoever tapped the card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visitor {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScanRecorder {
    geo: GeoResolver,
    mode: ScanMode,
}

impl ScanRecorder {
    pub fn new(geo: GeoResolver, mode: ScanMode) -> Self {
        Self { geo, mode }
    }

    /// Appends one scan for an existing card.
    ///
    /// Enrichment problems are logged and replaced by unknown values; only a
    /// storage failure aborts.
    pub async fn record<R>(
        &self,
        repo: &mut R,
        card_id: i32,
        visitor: &Visitor,
    ) -> Result<Scan, sqlx::Error>
    where
        R: CardRepository + Send,
    {
        let data = match self.mode {
            ScanMode::Minimal => NewScan::minimal(card_id),
            ScanMode::Enriched => self.enrich(card_id, visitor).await,
        };

        let scan = repo.append_scan(&data).await?;

        tracing::debug!(
            card_id,
            scan_id = scan.id,
            device = ?scan.device,
            country = ?scan.country,
            "Scan recorded"
        );

        Ok(scan)
    }

    async fn enrich(&self, card_id: i32, visitor: &Visitor) -> NewScan {
        let device = device_classifier::classify(visitor.user_agent.as_deref());
        let geo = self.geo.resolve(visitor.ip.as_deref()).await;

        if let Enrichment::Degraded { reason, .. } = &geo {
            tracing::warn!(card_id, reason = %reason, "Geolocation unavailable, recording unknown location");
        }

        enriched_scan(card_id, visitor.ip.clone(), &device, geo.into_value())
    }
}

pub fn enriched_scan(
    card_id: i32,
    ip: Option<String>,
    device: &DeviceDescriptor,
    location: GeoLocation,
) -> NewScan {
    NewScan {
        card_id,
        ip,
        device: Some(device.to_string()),
        city: Some(location.city),
        region: Some(location.region),
        country: Some(location.country),
    }
}
