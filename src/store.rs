//! SQLite-backed record store and ranking table.
//!
//! [`SqliteStore`] implements both collaborator traits over the tables
//! created by [`crate::migrate`], plus the write side used by the CLI's
//! `import` and `ranking` commands.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::config::Config;
use crate::db;
use crate::enrich::normalize_issn;
use crate::migrate::create_tables;
use crate::models::RawBlob;
use crate::traits::{RankingSource, RecordSource};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database, creating tables if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        create_tables(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = db::open_in_memory().await?;
        create_tables(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Stores (or replaces) the zipped CV of a person.
    pub async fn import_cv(
        &self,
        person_id: i64,
        lattes_id: Option<&str>,
        archive: &[u8],
        last_updated: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO DIM_PESSOA_XMLUSP (codpes, idfpescpq, imgarqxml, dtaultalt)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(codpes) DO UPDATE SET
                idfpescpq = COALESCE(excluded.idfpescpq, idfpescpq),
                imgarqxml = excluded.imgarqxml,
                dtaultalt = excluded.dtaultalt
            "#,
        )
        .bind(person_id)
        .bind(lattes_id)
        .bind(archive)
        .bind(last_updated.timestamp())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to import CV for person {}", person_id))?;
        debug!(person_id, bytes = archive.len(), "imported CV archive");
        Ok(())
    }

    /// Inserts or updates one journal ranking. Dashes in the ISSN are dropped.
    pub async fn upsert_ranking(&self, issn: &str, ranking: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO QUALISPERIODICO (numisnprd, clsqliprd) VALUES (?, ?)
            ON CONFLICT(numisnprd) DO UPDATE SET clsqliprd = excluded.clsqliprd
            "#,
        )
        .bind(normalize_issn(issn))
        .bind(ranking)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSource for SqliteStore {
    async fn fetch_blob(&self, person_id: i64) -> Result<Option<RawBlob>> {
        let row = sqlx::query("SELECT imgarqxml, dtaultalt FROM DIM_PESSOA_XMLUSP WHERE codpes = ?")
            .bind(person_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let archive: Option<Vec<u8>> = row.try_get("imgarqxml")?;
        let updated: Option<i64> = row.try_get("dtaultalt")?;
        Ok(Some(RawBlob {
            person_id,
            archive,
            last_updated: updated.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }))
    }

    async fn lattes_id(&self, person_id: i64) -> Result<Option<String>> {
        let id: Option<Option<String>> =
            sqlx::query_scalar("SELECT idfpescpq FROM DIM_PESSOA_XMLUSP WHERE codpes = ?")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(id.flatten())
    }

    async fn person_id_for_lattes_id(&self, lattes_id: &str) -> Result<Option<i64>> {
        let person_id: Option<i64> =
            sqlx::query_scalar("SELECT codpes FROM DIM_PESSOA_XMLUSP WHERE idfpescpq = ?")
                .bind(lattes_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(person_id)
    }

    async fn last_updated(&self, person_id: i64) -> Result<Option<DateTime<Utc>>> {
        let updated: Option<Option<i64>> =
            sqlx::query_scalar("SELECT dtaultalt FROM DIM_PESSOA_XMLUSP WHERE codpes = ?")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(updated
            .flatten()
            .and_then(|ts| DateTime::from_timestamp(ts, 0)))
    }
}

#[async_trait]
impl RankingSource for SqliteStore {
    async fn rankings(&self, issns: &HashSet<String>) -> Result<HashMap<String, String>> {
        if issns.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; issns.len()].join(", ");
        let sql = format!(
            "SELECT numisnprd, clsqliprd FROM QUALISPERIODICO WHERE numisnprd IN ({})",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for issn in issns {
            query = query.bind(issn.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            table.insert(row.try_get("numisnprd")?, row.try_get("clsqliprd")?);
        }
        Ok(table)
    }
}
