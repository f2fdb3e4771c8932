//! Caller-facing facade over the cache, the extractors and the collaborators.
//!
//! Every query that needs the parsed CV goes through [`DocumentCache`], so a
//! page that renders several sections of one person parses the archive once.
//! The raw views ([`Lattes::archive`], [`Lattes::xml`], [`Lattes::save_archive`])
//! read the record store directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::archive::{decode, unpack_single_entry};
use crate::cache::DocumentCache;
use crate::config::Config;
use crate::enrich::{citation_metrics, rank_articles, RankedArticle};
use crate::filter::FilterCriteria;
use crate::models::{CitationMetrics, Extracted};
use crate::sections::{articles, Article, SectionQuery};
use crate::traits::{RankingSource, RecordSource};
use crate::tree::Node;

/// Display format of the last-update date.
const DATE_FORMAT: &str = "%d/%m/%Y";

pub struct Lattes {
    cache: DocumentCache,
    rankings: Arc<dyn RankingSource>,
}

impl Lattes {
    pub fn new(records: Arc<dyn RecordSource>, rankings: Arc<dyn RankingSource>) -> Self {
        Self::with_cache(DocumentCache::new(records), rankings)
    }

    pub fn with_cache(cache: DocumentCache, rankings: Arc<dyn RankingSource>) -> Self {
        Self { cache, rankings }
    }

    /// Wires one store as both collaborators, with the configured TTL.
    pub fn from_config<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: RecordSource + RankingSource + 'static,
    {
        let cache = DocumentCache::new(store.clone()).with_ttl(config.cache.ttl());
        Self::with_cache(cache, store)
    }

    fn records(&self) -> &Arc<dyn RecordSource> {
        self.cache.source()
    }

    /// Parsed CV, served from the cache.
    pub async fn document(&self, person_id: i64) -> Option<Arc<Node>> {
        self.cache.get_document(person_id).await
    }

    /// Runs `f` against the cached CV; `None` when there is no readable CV.
    pub async fn with_document<T>(&self, person_id: i64, f: impl FnOnce(&Node) -> T) -> Option<T> {
        let document = self.document(person_id).await?;
        Some(f(&*document))
    }

    pub async fn articles(&self, person_id: i64, filter: &FilterCriteria) -> Extracted<Article> {
        self.with_document(person_id, |doc| articles(doc, filter))
            .await
            .unwrap_or(Extracted::NotFound)
    }

    /// One runtime-selected section rendered as JSON.
    pub async fn section(
        &self,
        person_id: i64,
        query: &SectionQuery,
    ) -> Result<Option<serde_json::Value>> {
        match self.with_document(person_id, |doc| query.run(doc)).await {
            Some(value) => Ok(Some(value.context("Failed to serialize section")?)),
            None => Ok(None),
        }
    }

    /// The five most recent articles, each annotated with its journal ranking.
    pub async fn articles_with_ranking(&self, person_id: i64) -> Extracted<RankedArticle> {
        let found = self.articles(person_id, &FilterCriteria::default()).await;
        rank_articles(found, self.rankings.as_ref()).await
    }

    pub async fn citation_metrics(&self, person_id: i64) -> Option<CitationMetrics> {
        self.with_document(person_id, citation_metrics)
            .await
            .flatten()
    }

    /// Normalized CV as a JSON string.
    pub async fn json(&self, person_id: i64) -> Result<Option<String>> {
        let Some(document) = self.document(person_id).await else {
            return Ok(None);
        };
        Ok(Some(serde_json::to_string(&*document)?))
    }

    /// Raw zipped CV, bypassing the cache.
    pub async fn archive(&self, person_id: i64) -> Result<Option<Vec<u8>>> {
        Ok(self
            .records()
            .fetch_blob(person_id)
            .await?
            .and_then(|blob| blob.archive))
    }

    /// Decoded CV XML, bypassing the cache.
    pub async fn xml(&self, person_id: i64) -> Result<Option<String>> {
        let Some(archive) = self.archive(person_id).await? else {
            return Ok(None);
        };
        let bytes = unpack_single_entry(&archive)
            .with_context(|| format!("Failed to unpack CV archive of person {}", person_id))?;
        Ok(Some(decode(&bytes)))
    }

    /// Writes the raw archive to `<dir>/<person_id>.zip`.
    pub async fn save_archive(&self, person_id: i64, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(archive) = self.archive(person_id).await? else {
            warn!(person_id, "no CV archive to save");
            return Ok(None);
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{}.zip", person_id));
        std::fs::write(&path, &archive)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(person_id, path = %path.display(), "saved CV archive");
        Ok(Some(path))
    }

    /// Last update of the CV as `dd/mm/YYYY`.
    pub async fn last_updated(&self, person_id: i64) -> Result<Option<String>> {
        Ok(self
            .records()
            .last_updated(person_id)
            .await?
            .map(|date| date.format(DATE_FORMAT).to_string()))
    }

    pub async fn lattes_id(&self, person_id: i64) -> Result<Option<String>> {
        self.records().lattes_id(person_id).await
    }

    pub async fn person_id_for_lattes_id(&self, lattes_id: &str) -> Result<Option<i64>> {
        self.records().person_id_for_lattes_id(lattes_id).await
    }
}
