use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// Subscription flag per card owner. Written by the billing side only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub user_id: i32,
    pub subscribed: bool,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Returns the flag for a user, or `None` when the user has no row
    pub async fn find_flag(conn: &mut PgConnection, user_id: i32) -> Result<Option<bool>, sqlx::Error> {
        let flag = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT subscribed FROM subscriptions WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(flag)
    }
}
