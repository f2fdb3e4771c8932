//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::archive::pack_single_entry;
use crate::cache::Clock;
use crate::models::RawBlob;
use crate::traits::{RankingSource, RecordSource};

#[derive(Default)]
pub struct MemorySource {
    rows: HashMap<i64, RawBlob>,
    fetches: AtomicUsize,
    delay_ms: u64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cv(self, person_id: i64, xml: &str) -> Self {
        let archive = pack_single_entry("curriculo.xml", xml.as_bytes()).unwrap();
        self.with_archive(person_id, archive)
    }

    pub fn with_archive(mut self, person_id: i64, archive: Vec<u8>) -> Self {
        self.rows.insert(
            person_id,
            RawBlob {
                person_id,
                archive: Some(archive),
                last_updated: None,
            },
        );
        self
    }

    pub fn with_missing_archive(mut self, person_id: i64) -> Self {
        self.rows.insert(
            person_id,
            RawBlob {
                person_id,
                archive: None,
                last_updated: None,
            },
        );
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_blob(&self, person_id: i64) -> Result<Option<RawBlob>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        Ok(self.rows.get(&person_id).cloned())
    }
}

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MemoryRankings {
    table: HashMap<String, String>,
    fail: bool,
    pub lookups: AtomicUsize,
    pub last_query: Mutex<Option<HashSet<String>>>,
}

impl MemoryRankings {
    pub fn with(mut self, issn: &str, ranking: &str) -> Self {
        self.table.insert(issn.to_string(), ranking.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RankingSource for MemoryRankings {
    async fn rankings(&self, issns: &HashSet<String>) -> Result<HashMap<String, String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(issns.clone());
        if self.fail {
            bail!("ranking table unavailable");
        }
        Ok(self
            .table
            .iter()
            .filter(|(issn, _)| issns.contains(*issn))
            .map(|(issn, ranking)| (issn.clone(), ranking.clone()))
            .collect())
    }
}
