//! # Lattes Harness
//!
//! Normalized, queryable views over Lattes curriculum archives.
//!
//! A person's CV is stored as a zipped XML export. The harness unpacks and
//! decodes it, parses it into a generic [`tree::Node`], caches the parsed
//! document per person, and runs section extractors that turn the tree into
//! typed, filtered, ordered records ready to serialize as JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//! │ RecordSource │──▶│   archive   │──▶│ DocumentCache │──▶│  sections  │
//! │  (SQLite)    │   │ unzip+decode│   │  tree::Node   │   │ + enrich   │
//! └──────────────┘   └─────────────┘   └──────────────┘   └─────┬──────┘
//!                                                              │
//!                                  RankingSource ─────────────▶│
//!                                                              ▼
//!                                                        ┌──────────┐
//!                                                        │  Lattes  │
//!                                                        │ service  │
//!                                                        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lattes init
//! lattes import 123456 ./cv/123456.zip
//! lattes section 123456 articles --mode anual --limit-start 3
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`archive`] | Single-entry zip handling and text decoding |
//! | [`tree`] | XML parsing into a generic tree and dot-path lookup |
//! | [`models`] | Shared result types |
//! | [`filter`] | Inclusion filter (`registros`, `anual`, `periodo`) |
//! | [`authors`] | Author list formatting |
//! | [`sections`] | Per-section extractors |
//! | [`enrich`] | Journal rankings and citation metrics |
//! | [`cache`] | Per-person parsed document cache |
//! | [`traits`] | Record and ranking source abstractions |
//! | [`store`] | SQLite implementation of both sources |
//! | [`service`] | Caller-facing facade |
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema setup |
//! | [`ingest`], [`get`], [`export`] | CLI command handlers |

pub mod archive;
pub mod authors;
pub mod cache;
pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod sections;
pub mod service;
pub mod store;
pub mod traits;
pub mod tree;

#[cfg(test)]
mod testing;
