use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_tables(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Idempotent schema setup for the CV archive and the journal ranking table.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    // One zipped CV per person; imgarqxml is NULL when no CV is on file
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS DIM_PESSOA_XMLUSP (
            codpes INTEGER PRIMARY KEY,
            idfpescpq TEXT,
            imgarqxml BLOB,
            dtaultalt INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Journal ranking keyed by ISSN without dashes
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS QUALISPERIODICO (
            numisnprd TEXT PRIMARY KEY,
            clsqliprd TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_pessoa_idfpescpq ON DIM_PESSOA_XMLUSP(idfpescpq)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
