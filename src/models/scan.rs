use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Scan {
    pub id: i64,
    pub card_id: i32,
    pub ip: Option<String>,
    pub device: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

/// Scan data to append. The minimal variant carries only the card id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScan {
    pub card_id: i32,
    pub ip: Option<String>,
    pub device: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl NewScan {
    pub fn minimal(card_id: i32) -> Self {
        Self {
            card_id,
            ..Default::default()
        }
    }
}

impl Scan {
    /// Appends a scan row; the timestamp comes from the column default
    pub async fn create(conn: &mut PgConnection, data: &NewScan) -> Result<Self, sqlx::Error> {
        let scan = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO scans (card_id, ip, device, city, region, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.card_id)
        .bind(&data.ip)
        .bind(&data.device)
        .bind(&data.city)
        .bind(&data.region)
        .bind(&data.country)
        .fetch_one(&mut *conn)
        .await?;

        Ok(scan)
    }

    /// Count scans recorded for a card
    pub async fn count_by_card(conn: &mut PgConnection, card_id: i32) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM scans WHERE card_id = $1
            "#,
        )
        .bind(card_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }

    /// List scans for a card, most recent first
    pub async fn list_by_card(conn: &mut PgConnection, card_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        let scans = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM scans
            WHERE card_id = $1
            ORDER BY scanned_at DESC, id DESC
            "#,
        )
        .bind(card_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(scans)
    }
}
