//! Core data types shared by the extractors.
//!
//! Output records serialize with the CV schema's own field names
//! (`NOME-COMPLETO-DO-AUTOR`, `TITULO-DO-ARTIGO`, ...) because downstream
//! consumers index the JSON by those keys.

use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;

/// Archive row fetched from the record store.
#[derive(Debug, Clone)]
pub struct RawBlob {
    pub person_id: i64,
    /// Absent when the person has no CV on file.
    pub archive: Option<Vec<u8>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Three-state extractor result.
///
/// `NotFound` means the section does not exist in the document; `Empty`
/// means it exists but nothing qualified (or it holds no items).
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    NotFound,
    Empty,
    Found(Vec<T>),
}

impl<T> Extracted<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Extracted::Empty
        } else {
            Extracted::Found(items)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Extracted::NotFound)
    }

    pub fn items(&self) -> &[T] {
        match self {
            Extracted::Found(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Extracted::Found(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Extracted<U> {
        match self {
            Extracted::NotFound => Extracted::NotFound,
            Extracted::Empty => Extracted::Empty,
            Extracted::Found(items) => Extracted::Found(items.into_iter().map(f).collect()),
        }
    }
}

/// `NotFound` renders as `null`, `Empty` as `[]`.
impl<T: Serialize> Serialize for Extracted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Extracted::NotFound => serializer.serialize_none(),
            Extracted::Empty => serializer.collect_seq(std::iter::empty::<&T>()),
            Extracted::Found(items) => serializer.collect_seq(items),
        }
    }
}

/// A co-author entry of a production.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    #[serde(rename = "NOME-COMPLETO-DO-AUTOR")]
    pub full_name: Option<String>,
    #[serde(rename = "NOME-PARA-CITACAO")]
    pub citation_name: Option<String>,
    /// Declared position, kept verbatim.
    #[serde(rename = "ORDEM-DE-AUTORIA")]
    pub order: Option<String>,
}

/// Citation counts reduced over every citation-index source in the CV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CitationMetrics {
    #[serde(rename = "qtdcitpes")]
    pub total_citations: u64,
    #[serde(rename = "clsinh")]
    pub h_index: u64,
}
