//! Read commands: sections, enriched articles, metrics and raw views.
//!
//! Structured results go to stdout as pretty JSON. A person without a
//! readable CV prints `null` and exits successfully, matching how the
//! library reports a missing CV.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::sections::SectionQuery;
use crate::service::Lattes;
use crate::store::SqliteStore;

/// Opens the configured store and wires the service over it.
pub async fn open_service(config: &Config) -> Result<Lattes> {
    let store = Arc::new(SqliteStore::open(config).await?);
    Ok(Lattes::from_config(store, config))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_section(config: &Config, person_id: i64, query: &SectionQuery) -> Result<()> {
    let lattes = open_service(config).await?;
    let value = lattes.section(person_id, query).await?;
    print_json(&value)
}

pub async fn run_articles_ranked(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    print_json(&lattes.articles_with_ranking(person_id).await)
}

pub async fn run_metrics(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    print_json(&lattes.citation_metrics(person_id).await)
}

pub async fn run_json(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    match lattes.json(person_id).await? {
        Some(json) => println!("{}", json),
        None => println!("null"),
    }
    Ok(())
}

pub async fn run_xml(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    match lattes.xml(person_id).await? {
        Some(xml) => println!("{}", xml),
        None => {
            eprintln!("No CV on file for person {}", person_id);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub async fn run_updated(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    match lattes.last_updated(person_id).await? {
        Some(date) => println!("{}", date),
        None => {
            eprintln!("No CV on file for person {}", person_id);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub async fn run_lattes_id(config: &Config, person_id: i64) -> Result<()> {
    let lattes = open_service(config).await?;
    print_json(&lattes.lattes_id(person_id).await?)
}

pub async fn run_person_id(config: &Config, lattes_id: &str) -> Result<()> {
    let lattes = open_service(config).await?;
    print_json(&lattes.person_id_for_lattes_id(lattes_id).await?)
}
