//! Process-wide feed cache with per-feed freshness policies.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use parking_lot::Mutex;

use crate::fetch::Fetcher;
use crate::types::{CacheEntry, FeedDescriptor};

/// Source of the current instant, in the local offset.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the system's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

/// URL-keyed entries, each behind its own async lock.
///
/// The index lock is only held to look up or create a slot.
#[derive(Debug, Default)]
pub struct CacheStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, url: &str) -> Slot {
        let mut slots = self.slots.lock();
        slots.entry(url.to_string()).or_default().clone()
    }

    /// Snapshot of the entry for `url`, if one has been stored.
    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        let slot = self.slots.lock().get(url).cloned()?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of URLs holding an entry.
    ///
    /// Waits on every slot, so a refresh in flight delays the count until
    /// its fetch settles (at most the fetch timeout).
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Serves feed content from the store while fresh, refetching otherwise.
#[derive(Debug)]
pub struct CacheGateway<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    store: CacheStore,
}

impl<F: Fetcher> CacheGateway<F, SystemClock> {
    pub fn new(fetcher: F) -> Self {
        Self::with_clock(fetcher, SystemClock)
    }
}

impl<F: Fetcher, C: Clock> CacheGateway<F, C> {
    pub fn with_clock(fetcher: F, clock: C) -> Self {
        Self {
            fetcher,
            clock,
            store: CacheStore::new(),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Currently valid content for `feed`, or `None` if a refresh was needed and failed.
    ///
    /// A failed refresh leaves the previous entry in place but never returns it.
    pub async fn query(&self, feed: &FeedDescriptor) -> Option<String> {
        let slot = self.store.slot(&feed.url);
        let mut entry = slot.lock().await;

        let now = self.clock.now();
        if let Some(cached) = entry.as_ref() {
            if feed.policy.is_fresh(cached, now) {
                tracing::debug!("Using cached data for {}", feed.url);
                return Some(cached.content.clone());
            }
        }

        tracing::info!("Fetching fresh data for {}", feed.url);
        match self.fetcher.fetch(&feed.url).await {
            Some(content) => {
                *entry = Some(CacheEntry::new(content.clone(), now));
                Some(content)
            }
            None => {
                tracing::warn!(
                    "Refresh of {} failed (previous entry {})",
                    feed.url,
                    if entry.is_some() { "kept" } else { "absent" }
                );
                None
            }
        }
    }
}
