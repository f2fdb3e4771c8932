//! # Lattes Harness CLI (`lattes`)
//!
//! The `lattes` binary loads zipped Lattes CVs and journal rankings into a
//! local SQLite store and prints normalized views of them.
//!
//! ## Usage
//!
//! ```bash
//! lattes --config ./config/lattes.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lattes init` | Create the SQLite database and its tables |
//! | `lattes import <person> <file>` | Store a CV (`.zip` or bare `.xml`) for a person |
//! | `lattes ranking <issn> <class>` | Set the ranking class of a journal |
//! | `lattes section <person> <kind>` | Print one CV section as JSON |
//! | `lattes articles-ranked <person>` | Recent articles with journal rankings |
//! | `lattes metrics <person>` | Citation totals and h-index |
//! | `lattes json <person>` | The whole CV as JSON |
//! | `lattes xml <person>` | The decoded CV XML |
//! | `lattes export <person> <dir>` | Write the raw archive to `<dir>/<person>.zip` |
//! | `lattes updated <person>` | Last update date (`dd/mm/YYYY`) |
//! | `lattes lattes-id <person>` | Lattes identifier of a person |
//! | `lattes person-id <lattes-id>` | Person number for a Lattes identifier |
//!
//! ## Examples
//!
//! ```bash
//! lattes init
//! lattes import 123456 ./cv/123456.zip --lattes-id 4231401219133612
//! lattes section 123456 articles --mode anual --limit-start 3
//! lattes section 123456 theses --level mestrado --lang en
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lattes_harness::config;
use lattes_harness::filter::FilterMode;
use lattes_harness::sections::{Language, SectionKind, SectionQuery, ThesisLevel};
use lattes_harness::{export, get, ingest, migrate};

/// Lattes Harness CLI: normalized, queryable views over Lattes CV archives.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/lattes.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "lattes",
    about = "Normalized, queryable views over Lattes curriculum archives",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lattes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Store a person's CV.
    ///
    /// Accepts the zipped CV as exported by the Lattes platform, or a bare
    /// `.xml` file which is zipped before storing. Replaces any earlier CV.
    Import {
        /// Institutional person number.
        person_id: i64,

        /// Path to the `.zip` or `.xml` file.
        path: PathBuf,

        /// 16-digit Lattes identifier of the person.
        #[arg(long)]
        lattes_id: Option<String>,

        /// Last update date (YYYY-MM-DD). Defaults to now.
        #[arg(long)]
        updated: Option<String>,
    },

    /// Set the ranking class of a journal, keyed by ISSN.
    Ranking {
        /// ISSN, with or without the dash.
        issn: String,

        /// Ranking class, e.g. `A1`.
        class: String,
    },

    /// Print one section of a person's CV as JSON.
    ///
    /// Prints `null` when the person has no readable CV or the section is
    /// absent, and `[]` when the section exists but nothing passes the filter.
    Section {
        person_id: i64,

        /// Section to extract (e.g. articles, books, theses, awards, resume).
        kind: SectionKind,

        /// Filter mode: registros, anual, or periodo. Defaults to the config.
        #[arg(long)]
        mode: Option<FilterMode>,

        /// Count of records, years back, or first year. -1 disables filtering.
        #[arg(long, allow_negative_numbers = true)]
        limit_start: Option<i64>,

        /// Last year of a `periodo` filter.
        #[arg(long)]
        limit_end: Option<i64>,

        /// Degree level for `theses`: mestrado or doutorado.
        #[arg(long, default_value = "doutorado")]
        level: ThesisLevel,

        /// Resume language: pt or en.
        #[arg(long, default_value = "pt")]
        lang: Language,
    },

    /// The five most recent articles, annotated with journal rankings.
    ArticlesRanked { person_id: i64 },

    /// Citation totals and h-index across all citation databases.
    Metrics { person_id: i64 },

    /// The whole CV as JSON.
    Json { person_id: i64 },

    /// The decoded CV XML.
    Xml { person_id: i64 },

    /// Write the raw CV archive to `<dir>/<person_id>.zip`.
    Export {
        person_id: i64,

        /// Output directory, created if missing.
        dir: PathBuf,
    },

    /// Last update date of a person's CV.
    Updated { person_id: i64 },

    /// Lattes identifier stored for a person.
    LattesId { person_id: i64 },

    /// Person number stored for a Lattes identifier.
    PersonId { lattes_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized at {}", cfg.db.path.display());
        }
        Commands::Import {
            person_id,
            path,
            lattes_id,
            updated,
        } => {
            ingest::run_import(
                &cfg,
                person_id,
                &path,
                lattes_id.as_deref(),
                updated.as_deref(),
            )
            .await?;
        }
        Commands::Ranking { issn, class } => {
            ingest::run_ranking(&cfg, &issn, &class).await?;
        }
        Commands::Section {
            person_id,
            kind,
            mode,
            limit_start,
            limit_end,
            level,
            lang,
        } => {
            let filter = cfg
                .filter
                .with_overrides(mode, limit_start, limit_end)
                .criteria()?;
            let query = SectionQuery {
                kind,
                filter,
                level,
                language: lang,
            };
            get::run_section(&cfg, person_id, &query).await?;
        }
        Commands::ArticlesRanked { person_id } => {
            get::run_articles_ranked(&cfg, person_id).await?;
        }
        Commands::Metrics { person_id } => {
            get::run_metrics(&cfg, person_id).await?;
        }
        Commands::Json { person_id } => {
            get::run_json(&cfg, person_id).await?;
        }
        Commands::Xml { person_id } => {
            get::run_xml(&cfg, person_id).await?;
        }
        Commands::Export { person_id, dir } => {
            export::run_export(&cfg, person_id, &dir).await?;
        }
        Commands::Updated { person_id } => {
            get::run_updated(&cfg, person_id).await?;
        }
        Commands::LattesId { person_id } => {
            get::run_lattes_id(&cfg, person_id).await?;
        }
        Commands::PersonId { lattes_id } => {
            get::run_person_id(&cfg, &lattes_id).await?;
        }
    }

    Ok(())
}
