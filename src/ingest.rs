//! Loading CVs and journal rankings into the store.
//!
//! `lattes import` accepts either the zipped CV as exported by the platform
//! or a bare `.xml` file, which is packed into a single-entry archive first
//! so the store only ever holds archives.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::path::Path;
use tracing::info;

use crate::archive::{pack_single_entry, unpack_single_entry};
use crate::config::Config;
use crate::store::SqliteStore;

/// Entry name used when packing a bare XML file.
const PACKED_ENTRY: &str = "curriculo.xml";

/// Reads a CV file and returns it as a single-entry archive.
pub fn read_archive(path: &Path) -> Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", path.display());
    }

    let is_xml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    if is_xml {
        return Ok(pack_single_entry(PACKED_ENTRY, &bytes)?);
    }

    // Reject anything the reader would later fail on
    unpack_single_entry(&bytes)
        .with_context(|| format!("{} is not a readable CV archive", path.display()))?;
    Ok(bytes)
}

/// Parses `YYYY-MM-DD` as midnight UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

pub async fn run_import(
    config: &Config,
    person_id: i64,
    path: &Path,
    lattes_id: Option<&str>,
    updated: Option<&str>,
) -> Result<()> {
    let archive = read_archive(path)?;
    let last_updated = match updated {
        Some(raw) => parse_date(raw)?,
        None => Utc::now(),
    };

    let store = SqliteStore::open(config).await?;
    store
        .import_cv(person_id, lattes_id, &archive, last_updated)
        .await?;
    store.close().await;

    info!(person_id, bytes = archive.len(), "CV imported");
    println!("Imported CV for person {} ({} bytes)", person_id, archive.len());
    Ok(())
}

pub async fn run_ranking(config: &Config, issn: &str, ranking: &str) -> Result<()> {
    if issn.replace('-', "").is_empty() {
        bail!("ISSN must not be empty");
    }
    let store = SqliteStore::open(config).await?;
    store.upsert_ranking(issn, ranking).await?;
    store.close().await;
    println!("Ranking {} set for ISSN {}", ranking, issn);
    Ok(())
}
