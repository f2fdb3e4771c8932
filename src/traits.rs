//! Collaborator traits for the record store and the journal ranking table.
//!
//! The extraction core never talks to a database directly. It asks a
//! [`RecordSource`] for the archived CV of a person and a [`RankingSource`]
//! for journal rankings, so tests can substitute in-memory fakes and
//! deployments can back both with [`crate::store::SqliteStore`].
//!
//! ```text
//!  ┌──────────────┐  fetch_blob   ┌───────────────┐
//!  │ RecordSource │──────────────▶│ DocumentCache │──▶ extractors
//!  └──────────────┘               └───────────────┘
//!  ┌───────────────┐  rankings(issns)
//!  │ RankingSource │──────────────────▶ enrich::rank_articles
//!  └───────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::RawBlob;

// ═══════════════════════════════════════════════════════════════════════
// Record store
// ═══════════════════════════════════════════════════════════════════════

/// Source of archived CV blobs keyed by person identifier.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use lattes_harness::models::RawBlob;
/// use lattes_harness::traits::RecordSource;
///
/// struct NoCvs;
///
/// #[async_trait]
/// impl RecordSource for NoCvs {
///     async fn fetch_blob(&self, person_id: i64) -> Result<Option<RawBlob>> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Returns the archive row for a person, or `None` if there is no row.
    ///
    /// A row whose `archive` is `None` is a normal outcome: the person has
    /// no CV on file.
    async fn fetch_blob(&self, person_id: i64) -> Result<Option<RawBlob>>;

    /// Returns the national CV identifier linked to a person.
    async fn lattes_id(&self, _person_id: i64) -> Result<Option<String>> {
        Ok(None)
    }

    /// Reverse of [`lattes_id`](RecordSource::lattes_id).
    async fn person_id_for_lattes_id(&self, _lattes_id: &str) -> Result<Option<i64>> {
        Ok(None)
    }

    /// Last time the CV was updated, from the archive row.
    async fn last_updated(&self, person_id: i64) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .fetch_blob(person_id)
            .await?
            .and_then(|blob| blob.last_updated))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Ranking table
// ═══════════════════════════════════════════════════════════════════════

/// Journal ranking lookup keyed by ISSN without dashes (`"12345678"`).
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// One batched lookup. ISSNs absent from the table are absent from the map.
    async fn rankings(&self, issns: &HashSet<String>) -> Result<HashMap<String, String>>;
}
