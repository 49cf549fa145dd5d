use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub social_handle: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub owner_id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub social_handle: Option<String>,
    pub url: String,
}

impl Card {
    /// Finds a card by its identifier
    pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM cards WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(card)
    }

    /// Inserts a card unless one with the same url already exists.
    /// Returns whether a row was written.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        data: &NewCard,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO cards (owner_id, name, email, phone, social_handle, url)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.social_handle)
        .bind(&data.url)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
