//! In-memory store used by service and HTTP tests.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use super::{CardRepository, CardStore};
use crate::models::{Card, NewCard, NewScan, Scan};

#[derive(Default)]
struct State {
    cards: Vec<Card>,
    scans: Vec<Scan>,
    subscriptions: HashMap<i32, bool>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    live_handles: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently checked out
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    /// Makes every subsequent scan insert fail like a lost connection
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stands in for the billing collaborator
    pub fn set_subscribed(&self, user_id: i32, subscribed: bool) {
        self.lock().subscriptions.insert(user_id, subscribed);
    }

    pub fn card_count(&self) -> usize {
        self.lock().cards.len()
    }

    pub fn scans_for(&self, card_id: i32) -> Vec<Scan> {
        self.lock()
            .scans
            .iter()
            .filter(|s| s.card_id == card_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

impl CardStore for MemoryStore {
    type Handle = MemoryHandle;

    async fn acquire(&self) -> Result<MemoryHandle, sqlx::Error> {
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryHandle {
            store: self.clone(),
        })
    }
}

pub struct MemoryHandle {
    store: MemoryStore,
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.store.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CardRepository for MemoryHandle {
    async fn find_card(&mut self, card_id: i32) -> Result<Option<Card>, sqlx::Error> {
        let state = self.store.lock();
        Ok(state.cards.iter().find(|c| c.id == card_id).cloned())
    }

    async fn insert_card(&mut self, data: &NewCard) -> Result<bool, sqlx::Error> {
        let mut state = self.store.lock();
        if state.cards.iter().any(|c| c.url == data.url) {
            return Ok(false);
        }

        let id = state.cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        state.cards.push(Card {
            id,
            owner_id: data.owner_id,
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            social_handle: data.social_handle.clone(),
            url: data.url.clone(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn append_scan(&mut self, data: &NewScan) -> Result<Scan, sqlx::Error> {
        if self.store.fail_writes.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }

        let mut state = self.store.lock();
        if !state.cards.iter().any(|c| c.id == data.card_id) {
            return Err(sqlx::Error::RowNotFound);
        }

        let scan = Scan {
            id: state.scans.len() as i64 + 1,
            card_id: data.card_id,
            ip: data.ip.clone(),
            device: data.device.clone(),
            city: data.city.clone(),
            region: data.region.clone(),
            country: data.country.clone(),
            scanned_at: Utc::now(),
        };
        state.scans.push(scan.clone());
        Ok(scan)
    }

    async fn count_scans(&mut self, card_id: i32) -> Result<i64, sqlx::Error> {
        let state = self.store.lock();
        Ok(state.scans.iter().filter(|s| s.card_id == card_id).count() as i64)
    }

    async fn list_scans(&mut self, card_id: i32) -> Result<Vec<Scan>, sqlx::Error> {
        let state = self.store.lock();
        let mut scans: Vec<Scan> = state
            .scans
            .iter()
            .filter(|s| s.card_id == card_id)
            .cloned()
            .collect();
        scans.sort_by(|a, b| (b.scanned_at, b.id).cmp(&(a.scanned_at, a.id)));
        Ok(scans)
    }

    async fn subscription_flag(&mut self, user_id: i32) -> Result<Option<bool>, sqlx::Error> {
        Ok(self.store.lock().subscriptions.get(&user_id).copied())
    }

    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
