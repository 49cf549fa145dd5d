use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Scan;

pub const UPSELL_MESSAGE: &str =
    "Suscríbete para ver el detalle de cada escaneo: ubicación, dispositivo y fecha.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Subscribed,
}

impl Tier {
    /// A missing subscription row counts as not subscribed
    pub fn from_subscription(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Tier::Subscribed,
            Some(false) | None => Tier::Free,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanDetail {
    pub ip: Option<String>,
    pub device: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

impl From<Scan> for ScanDetail {
    fn from(scan: Scan) -> Self {
        Self {
            ip: scan.ip,
            device: scan.device,
            city: scan.city,
            region: scan.region,
            country: scan.country,
            scanned_at: scan.scanned_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum MetricsReport {
    Free {
        card_id: i32,
        scan_count: i64,
        upsell_message: String,
    },
    Subscribed {
        card_id: i32,
        scan_count: i64,
        details: Vec<ScanDetail>,
    },
}

impl MetricsReport {
    pub fn free(card_id: i32, scan_count: i64) -> Self {
        MetricsReport::Free {
            card_id,
            scan_count,
            upsell_message: UPSELL_MESSAGE.to_string(),
        }
    }

    /// `scans` must already be ordered most recent first. The count is taken
    /// from the same snapshot so it always matches the detail list.
    pub fn subscribed(card_id: i32, scans: Vec<Scan>) -> Self {
        let details: Vec<ScanDetail> = scans.into_iter().map(ScanDetail::from).collect();
        MetricsReport::Subscribed {
            card_id,
            scan_count: details.len() as i64,
            details,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            MetricsReport::Free { .. } => Tier::Free,
            MetricsReport::Subscribed { .. } => Tier::Subscribed,
        }
    }

    pub fn scan_count(&self) -> i64 {
        match self {
            MetricsReport::Free { scan_count, .. } | MetricsReport::Subscribed { scan_count, .. } => {
                *scan_count
            }
        }
    }
}
