use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::random::RandomSource;
use crate::error::AppError;
use crate::inspection::Classifier;
use crate::models::order::Order;
use crate::models::quote::Quote;
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

pub const DEFAULT_QUOTE_TTL_SECS: u32 = 15 * 60;

pub struct AppState {
    pub store: OrderStore,
    pub classifier: Arc<dyn Classifier>,
    pub random: Mutex<Box<dyn RandomSource>>,
    pub quotes: DashMap<Uuid, Quote>,
    /// Quotes older than this are dropped and can no longer be confirmed.
    pub quote_ttl: TimeDelta,
    pub order_events_tx: broadcast::Sender<Order>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: OrderStore,
        classifier: Arc<dyn Classifier>,
        random: Box<dyn RandomSource>,
        event_buffer_size: usize,
    ) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            store,
            classifier,
            random: Mutex::new(random),
            quotes: DashMap::new(),
            quote_ttl: TimeDelta::seconds(i64::from(DEFAULT_QUOTE_TTL_SECS)),
            order_events_tx,
            metrics: Metrics::new(),
        }
    }

    pub fn with_quote_ttl(mut self, ttl: TimeDelta) -> Self {
        self.quote_ttl = ttl;
        self
    }

    pub fn random(&self) -> Result<MutexGuard<'_, Box<dyn RandomSource>>, AppError> {
        self.random
            .lock()
            .map_err(|_| AppError::Internal("random source lock poisoned".to_string()))
    }

    fn is_expired(&self, quote: &Quote, now: DateTime<Utc>) -> bool {
        now - quote.created_at >= self.quote_ttl
    }

    fn sync_quote_gauge(&self) {
        self.metrics
            .pending_quotes
            .set(i64::try_from(self.quotes.len()).unwrap_or(i64::MAX));
    }

    /// Drops expired quotes and returns how many were removed.
    pub fn prune_quotes(&self, now: DateTime<Utc>) -> usize {
        let before = self.quotes.len();
        self.quotes.retain(|_, quote| !self.is_expired(quote, now));
        self.sync_quote_gauge();
        before.saturating_sub(self.quotes.len())
    }

    /// Stores a new quote, evicting expired ones first.
    pub fn insert_quote(&self, quote: Quote) {
        self.prune_quotes(Utc::now());
        self.quotes.insert(quote.id, quote);
        self.sync_quote_gauge();
    }

    pub fn quote(&self, id: Uuid) -> Result<Quote, AppError> {
        self.quotes
            .get(&id)
            .map(|entry| entry.value().clone())
            .filter(|quote| !self.is_expired(quote, Utc::now()))
            .ok_or_else(|| AppError::NotFound(format!("quote {} not found", id)))
    }

    /// Removes a live quote for confirmation.
    pub fn take_quote(&self, id: Uuid) -> Result<Quote, AppError> {
        let removed = self.quotes.remove(&id);
        self.sync_quote_gauge();

        match removed {
            Some((_, quote)) if !self.is_expired(&quote, Utc::now()) => Ok(quote),
            Some(_) => Err(AppError::NotFound(format!("quote {} expired", id))),
            None => Err(AppError::NotFound(format!("quote {} not found", id))),
        }
    }

    /// Puts back a quote whose confirmation failed.
    pub fn restore_quote(&self, quote: Quote) {
        self.quotes.insert(quote.id, quote);
        self.sync_quote_gauge();
    }
}
