use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::enrichment::{Enrichment, UNKNOWN};

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid lookup URL: {0}")]
    InvalidUrl(String),

    #[error("Geolocation API error: {0}")]
    ApiError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub city: String,
    pub region: String,
    pub country: String,
}

impl GeoLocation {
    pub fn unknown() -> Self {
        Self {
            city: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
        }
    }
}

/// Client for an ip-api.com compatible JSON endpoint
#[derive(Debug, Clone)]
pub struct GeoResolver {
    client: Client,
    base_url: Url,
}

impl GeoResolver {
    /// `timeout` bounds the whole lookup, connect included
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeoError> {
        let base_url = Url::parse(base_url).map_err(|e| GeoError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Resolves a visitor address to a location. Never fails: any problem
    /// yields the all-unknown location tagged with the reason.
    pub async fn resolve(&self, ip: Option<&str>) -> Enrichment<GeoLocation> {
        let Some(raw) = ip.map(str::trim).filter(|s| !s.is_empty()) else {
            return Enrichment::degraded(GeoLocation::unknown(), "no client address");
        };

        let addr: IpAddr = match raw.parse() {
            Ok(addr) => addr,
            Err(_) => {
                return Enrichment::degraded(GeoLocation::unknown(), "unparseable client address")
            }
        };

        if !is_routable(&addr) {
            return Enrichment::degraded(GeoLocation::unknown(), "non-routable client address");
        }

        match self.lookup(addr).await {
            Ok(location) => Enrichment::Resolved(location),
            Err(e) => {
                tracing::debug!(ip = %addr, error = %e, "Geolocation lookup failed");
                Enrichment::degraded(GeoLocation::unknown(), e.to_string())
            }
        }
    }

    async fn lookup(&self, addr: IpAddr) -> Result<GeoLocation, GeoError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeoError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&addr.to_string());
        url.query_pairs_mut()
            .append_pair("fields", "status,message,country,regionName,city");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::ApiError(format!("HTTP {}", response.status())));
        }

        let body: IpApiResponse = response.json().await?;

        if body.status != "success" {
            return Err(GeoError::ApiError(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        Ok(GeoLocation {
            city: or_unknown(body.city),
            region: or_unknown(body.region_name),
            country: or_unknown(body.country),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    country: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
}

fn or_unknown(field: Option<String>) -> String {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn is_routable(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let unique_local = (first & 0xfe00) == 0xfc00;
            let link_local = (first & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}
