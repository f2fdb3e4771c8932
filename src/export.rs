//! Export a person's raw CV archive to disk.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::get::open_service;

/// Writes `<dir>/<person_id>.zip`. Exits non-zero when the person has no CV.
pub async fn run_export(config: &Config, person_id: i64, dir: &Path) -> Result<()> {
    let lattes = open_service(config).await?;
    match lattes.save_archive(person_id, dir).await? {
        Some(path) => {
            eprintln!("Exported CV of person {} to {}", person_id, path.display());
        }
        None => {
            eprintln!("No CV on file for person {}", person_id);
            std::process::exit(1);
        }
    }
    Ok(())
}
