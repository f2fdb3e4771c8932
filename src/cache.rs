//! TTL-bounded cache of parsed CV documents.
//!
//! Unpacking and parsing a CV is the expensive step of every query, and a
//! page typically renders several sections of the same person. The cache
//! keeps the parsed [`Node`] per person for one TTL window (an hour by
//! default). Each person id owns an async slot lock, so concurrent misses
//! for the same id wait on a single fetch+parse instead of repeating it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::archive::{decode, unpack_single_entry};
use crate::error::Result;
use crate::traits::RecordSource;
use crate::tree::{parse_document, Node};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Time source, injectable so expiry can be tested deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    expires_at: DateTime<Utc>,
    document: Arc<Node>,
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

pub struct DocumentCache {
    source: Arc<dyn RecordSource>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    slots: Mutex<HashMap<i64, Slot>>,
}

impl DocumentCache {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            ttl: to_chrono(DEFAULT_TTL),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = to_chrono(ttl);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    fn slot(&self, person_id: i64) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(person_id).or_default())
    }

    /// Returns the parsed CV of a person, or `None` when there is no CV or
    /// it cannot be read. Failures are logged and never cached.
    pub async fn get_document(&self, person_id: i64) -> Option<Arc<Node>> {
        let slot = self.slot(person_id);
        let mut entry = slot.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if now < cached.expires_at {
                debug!(person_id, "CV cache hit");
                return Some(Arc::clone(&cached.document));
            }
            debug!(person_id, "CV cache entry expired");
        }

        match self.load(person_id).await {
            Some(document) => {
                let document = Arc::new(document);
                *entry = Some(CacheEntry {
                    expires_at: now
                        .checked_add_signed(self.ttl)
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                    document: Arc::clone(&document),
                });
                Some(document)
            }
            None => {
                *entry = None;
                drop(entry);
                self.release(person_id, &slot);
                None
            }
        }
    }

    /// Drops the slot of a person with no document unless another caller
    /// is already waiting on it.
    fn release(&self, person_id: i64, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let unshared = slots
            .get(&person_id)
            .is_some_and(|held| Arc::ptr_eq(held, slot) && Arc::strong_count(slot) == 2);
        if unshared {
            slots.remove(&person_id);
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    async fn load(&self, person_id: i64) -> Option<Node> {
        let blob = match self.source.fetch_blob(person_id).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                warn!(person_id, "no CV record for person");
                return None;
            }
            Err(e) => {
                error!(person_id, error = %e, "failed to fetch CV archive");
                return None;
            }
        };
        let Some(archive) = blob.archive else {
            warn!(person_id, "CV archive not on file");
            return None;
        };
        match parse_archive(&archive) {
            Ok(document) => {
                debug!(person_id, "parsed CV archive");
                Some(document)
            }
            Err(e) => {
                error!(person_id, error = %e, "failed to read CV archive");
                None
            }
        }
    }
}

/// Unpack → decode → parse, the uncached path.
pub fn parse_archive(archive: &[u8]) -> Result<Node> {
    let xml = unpack_single_entry(archive)?;
    parse_document(&decode(&xml))
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
}
