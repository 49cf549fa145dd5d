use secrecy::ExposeSecret;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Postgres,
};
use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::models::{Card, NewCard, NewScan, Scan, Subscription};

#[cfg(test)]
pub mod memory;

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .database(&config.db_name)
        .username(&config.db_user)
        .password(config.db_password.expose_secret());

    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Source of per-request storage handles.
///
/// A handle is acquired at request entry and released when dropped, so every
/// exit path (success, not found, error) gives the connection back.
pub trait CardStore: Clone + Send + Sync + 'static {
    type Handle: CardRepository + Send;

    fn acquire(&self) -> impl Future<Output = Result<Self::Handle, sqlx::Error>> + Send;
}

/// Queries available on an acquired storage handle
pub trait CardRepository {
    fn find_card(
        &mut self,
        card_id: i32,
    ) -> impl Future<Output = Result<Option<Card>, sqlx::Error>> + Send;

    /// Returns false when a card with the same url already exists
    fn insert_card(
        &mut self,
        data: &NewCard,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn append_scan(
        &mut self,
        data: &NewScan,
    ) -> impl Future<Output = Result<Scan, sqlx::Error>> + Send;

    fn count_scans(&mut self, card_id: i32) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Most recent first
    fn list_scans(
        &mut self,
        card_id: i32,
    ) -> impl Future<Output = Result<Vec<Scan>, sqlx::Error>> + Send;

    fn subscription_flag(
        &mut self,
        user_id: i32,
    ) -> impl Future<Output = Result<Option<bool>, sqlx::Error>> + Send;

    fn ping(&mut self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CardStore for PgStore {
    type Handle = PgHandle;

    async fn acquire(&self) -> Result<PgHandle, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgHandle { conn })
    }
}

/// A pooled connection held for the duration of one request
pub struct PgHandle {
    conn: PoolConnection<Postgres>,
}

impl CardRepository for PgHandle {
    async fn find_card(&mut self, card_id: i32) -> Result<Option<Card>, sqlx::Error> {
        Card::find_by_id(&mut self.conn, card_id).await
    }

    async fn insert_card(&mut self, data: &NewCard) -> Result<bool, sqlx::Error> {
        Card::insert_if_absent(&mut self.conn, data).await
    }

    async fn append_scan(&mut self, data: &NewScan) -> Result<Scan, sqlx::Error> {
        Scan::create(&mut self.conn, data).await
    }

    async fn count_scans(&mut self, card_id: i32) -> Result<i64, sqlx::Error> {
        Scan::count_by_card(&mut self.conn, card_id).await
    }

    async fn list_scans(&mut self, card_id: i32) -> Result<Vec<Scan>, sqlx::Error> {
        Scan::list_by_card(&mut self.conn, card_id).await
    }

    async fn subscription_flag(&mut self, user_id: i32) -> Result<Option<bool>, sqlx::Error> {
        Subscription::find_flag(&mut self.conn, user_id).await
    }

    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&mut *self.conn).await?;
        Ok(())
    }
}
