//! Bibliographic production: journal articles, books, book chapters,
//! conference papers and the catch-all "other" bibliographic types.

use serde::Serialize;

use super::{block_attr, section_items, select, Ordering, Production};
use crate::authors::normalize_authors;
use crate::filter::FilterCriteria;
use crate::models::{Author, Extracted};
use crate::tree::Node;

const ARTICLES_PATH: &str = "PRODUCAO-BIBLIOGRAFICA.ARTIGOS-PUBLICADOS.ARTIGO-PUBLICADO";
const BOOKS_PATH: &str =
    "PRODUCAO-BIBLIOGRAFICA.LIVROS-E-CAPITULOS.LIVROS-PUBLICADOS-OU-ORGANIZADOS.LIVRO-PUBLICADO-OU-ORGANIZADO";
const CHAPTERS_PATH: &str =
    "PRODUCAO-BIBLIOGRAFICA.LIVROS-E-CAPITULOS.CAPITULOS-DE-LIVROS-PUBLICADOS.CAPITULO-DE-LIVRO-PUBLICADO";
const CONFERENCE_PATH: &str = "PRODUCAO-BIBLIOGRAFICA.TRABALHOS-EM-EVENTOS.TRABALHO-EM-EVENTOS";
const OTHER_PATH: &str = "PRODUCAO-BIBLIOGRAFICA.DEMAIS-TIPOS-DE-PRODUCAO-BIBLIOGRAFICA";

const SEQUENCE: &str = "SEQUENCIA-PRODUCAO";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "TITULO-DO-ARTIGO")]
    pub title: String,
    #[serde(rename = "TITULO-DO-PERIODICO-OU-REVISTA")]
    pub journal: String,
    #[serde(rename = "VOLUME")]
    pub volume: String,
    #[serde(rename = "PAGINA-INICIAL")]
    pub first_page: String,
    #[serde(rename = "PAGINA-FINAL")]
    pub last_page: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "ISSN")]
    pub issn: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

impl Article {
    fn from_node(item: &Node) -> Self {
        let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-ARTIGO", key);
        let detail = |key: &str| block_attr(item, "DETALHAMENTO-DO-ARTIGO", key);
        Self {
            sequence: item.attr_or_empty(SEQUENCE),
            title: basic("TITULO-DO-ARTIGO"),
            journal: detail("TITULO-DO-PERIODICO-OU-REVISTA"),
            volume: detail("VOLUME"),
            first_page: detail("PAGINA-INICIAL"),
            last_page: detail("PAGINA-FINAL"),
            year: basic("ANO-DO-ARTIGO"),
            issn: detail("ISSN"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }
}

impl Production for Article {
    fn year(&self) -> &str {
        &self.year
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    #[serde(skip)]
    pub sequence: String,
    #[serde(rename = "TITULO-DO-LIVRO")]
    pub title: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "NUMERO-DE-PAGINAS")]
    pub pages: String,
    #[serde(rename = "NOME-DA-EDITORA")]
    pub publisher: String,
    #[serde(rename = "CIDADE-DA-EDITORA")]
    pub publisher_city: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

impl Book {
    fn from_node(item: &Node) -> Self {
        let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-LIVRO", key);
        let detail = |key: &str| block_attr(item, "DETALHAMENTO-DO-LIVRO", key);
        Self {
            sequence: item.attr_or_empty(SEQUENCE),
            title: basic("TITULO-DO-LIVRO"),
            year: basic("ANO"),
            pages: detail("NUMERO-DE-PAGINAS"),
            publisher: detail("NOME-DA-EDITORA"),
            publisher_city: detail("CIDADE-DA-EDITORA"),
            isbn: detail("ISBN"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }
}

impl Production for Book {
    fn year(&self) -> &str {
        &self.year
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    #[serde(skip)]
    pub sequence: String,
    #[serde(rename = "TITULO-DO-CAPITULO-DO-LIVRO")]
    pub title: String,
    #[serde(rename = "TITULO-DO-LIVRO")]
    pub book_title: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "NUMERO-DE-VOLUMES")]
    pub volumes: String,
    #[serde(rename = "PAGINA-INICIAL")]
    pub first_page: String,
    #[serde(rename = "PAGINA-FINAL")]
    pub last_page: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "NOME-DA-EDITORA")]
    pub publisher: String,
    #[serde(rename = "CIDADE-DA-EDITORA")]
    pub publisher_city: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

impl Chapter {
    fn from_node(item: &Node) -> Self {
        let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-CAPITULO", key);
        let detail = |key: &str| block_attr(item, "DETALHAMENTO-DO-CAPITULO", key);
        Self {
            sequence: item.attr_or_empty(SEQUENCE),
            title: basic("TITULO-DO-CAPITULO-DO-LIVRO"),
            book_title: detail("TITULO-DO-LIVRO"),
            isbn: detail("ISBN"),
            volumes: detail("NUMERO-DE-VOLUMES"),
            first_page: detail("PAGINA-INICIAL"),
            last_page: detail("PAGINA-FINAL"),
            year: basic("ANO"),
            publisher: detail("NOME-DA-EDITORA"),
            publisher_city: detail("CIDADE-DA-EDITORA"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }
}

impl Production for Chapter {
    fn year(&self) -> &str {
        &self.year
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// A paper published in conference proceedings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferencePaper {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "TIPO")]
    pub kind: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "NOME-DO-EVENTO")]
    pub event: String,
    #[serde(rename = "TITULO-DOS-ANAIS-OU-PROCEEDINGS")]
    pub proceedings: String,
    #[serde(rename = "CIDADE-DO-EVENTO")]
    pub event_city: String,
    #[serde(rename = "CIDADE-DA-EDITORA")]
    pub publisher_city: String,
    #[serde(rename = "NOME-DA-EDITORA")]
    pub publisher: String,
    #[serde(rename = "ANO-DE-REALIZACAO")]
    pub event_year: String,
    #[serde(rename = "PAGINA-INICIAL")]
    pub first_page: String,
    #[serde(rename = "PAGINA-FINAL")]
    pub last_page: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

impl ConferencePaper {
    fn from_node(item: &Node) -> Self {
        let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-TRABALHO", key);
        let detail = |key: &str| block_attr(item, "DETALHAMENTO-DO-TRABALHO", key);
        Self {
            title: basic("TITULO-DO-TRABALHO"),
            kind: basic("NATUREZA"),
            sequence: item.attr_or_empty(SEQUENCE),
            year: basic("ANO-DO-TRABALHO"),
            event: detail("NOME-DO-EVENTO"),
            proceedings: detail("TITULO-DOS-ANAIS-OU-PROCEEDINGS"),
            event_city: detail("CIDADE-DO-EVENTO"),
            publisher_city: detail("CIDADE-DA-EDITORA"),
            publisher: detail("NOME-DA-EDITORA"),
            event_year: detail("ANO-DE-REALIZACAO"),
            first_page: detail("PAGINA-INICIAL"),
            last_page: detail("PAGINA-FINAL"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }
}

impl Production for ConferencePaper {
    fn year(&self) -> &str {
        &self.year
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Any production under `DEMAIS-TIPOS-DE-PRODUCAO-BIBLIOGRAFICA`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherBibliographic {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "TIPO")]
    pub kind: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "EDITORA")]
    pub publisher: String,
    #[serde(rename = "CIDADE-DA-EDITORA")]
    pub publisher_city: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

impl Production for OtherBibliographic {
    fn year(&self) -> &str {
        &self.year
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Typed sub-sections of the "other" block: (child tag, block suffix, label).
const SPECIAL_TYPES: [(&str, &str, &str); 3] = [
    ("TRADUCAO", "DA-TRADUCAO", "Tradução"),
    ("PREFACIO-POSFACIO", "DO-PREFACIO-POSFACIO", "Prefácio, Pósfacio"),
    ("PARTITURA-MUSICAL", "DA-PARTITURA", "Partitura Musical"),
];

impl OtherBibliographic {
    fn from_generic(item: &Node) -> Self {
        let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DE-OUTRA-PRODUCAO", key);
        let detail = |key: &str| block_attr(item, "DETALHAMENTO-DE-OUTRA-PRODUCAO", key);
        Self {
            title: basic("TITULO"),
            kind: basic("NATUREZA"),
            sequence: item.attr_or_empty(SEQUENCE),
            year: basic("ANO"),
            publisher: detail("EDITORA"),
            publisher_city: detail("CIDADE-DA-EDITORA"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }

    fn from_special(item: &Node, suffix: &str, label: &str) -> Self {
        let basic_block = format!("DADOS-BASICOS-{suffix}");
        let detail_block = format!("DETALHAMENTO-{suffix}");
        let basic = |key: &str| block_attr(item, &basic_block, key);
        let detail = |key: &str| block_attr(item, &detail_block, key);

        let subtype = basic("TIPO");
        let kind = if subtype.is_empty() {
            label.to_string()
        } else {
            format!("{label}/{}", capitalize(&subtype))
        };

        Self {
            title: basic("TITULO"),
            kind,
            sequence: item.attr_or_empty(SEQUENCE),
            year: basic("ANO"),
            publisher: detail(&format!("EDITORA-{suffix}")),
            publisher_city: detail("CIDADE-DA-EDITORA"),
            authors: normalize_authors(item.child("AUTORES")),
        }
    }
}

/// First letter upper-cased, the rest lower-cased.
fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ── Extractors ──────────────────────────────────────────────────────────

/// Journal articles, most recent year first; the filter counts positions
/// after that ordering.
pub fn articles(doc: &Node, filter: &FilterCriteria) -> Extracted<Article> {
    let Some(items) = section_items(doc, ARTICLES_PATH) else {
        return Extracted::NotFound;
    };
    let records = items.iter().map(Article::from_node).collect();
    Extracted::from_items(select(records, filter, Ordering::YearDescBeforeFilter))
}

pub fn books(doc: &Node, filter: &FilterCriteria) -> Extracted<Book> {
    let Some(items) = section_items(doc, BOOKS_PATH) else {
        return Extracted::NotFound;
    };
    let records = items.iter().map(Book::from_node).collect();
    Extracted::from_items(select(records, filter, Ordering::SequenceDescBeforeFilter))
}

pub fn chapters(doc: &Node, filter: &FilterCriteria) -> Extracted<Chapter> {
    let Some(items) = section_items(doc, CHAPTERS_PATH) else {
        return Extracted::NotFound;
    };
    let records = items.iter().map(Chapter::from_node).collect();
    Extracted::from_items(select(records, filter, Ordering::SequenceDescBeforeFilter))
}

pub fn conference_papers(doc: &Node, filter: &FilterCriteria) -> Extracted<ConferencePaper> {
    let Some(items) = section_items(doc, CONFERENCE_PATH) else {
        return Extracted::NotFound;
    };
    let records = items.iter().map(ConferencePaper::from_node).collect();
    Extracted::from_items(select(records, filter, Ordering::SequenceDescAfterFilter))
}

/// Generic "other" productions followed by translations, prefaces and
/// scores. All sub-types share one position counter.
pub fn other_bibliographic(doc: &Node, filter: &FilterCriteria) -> Extracted<OtherBibliographic> {
    let Some([block]) = section_items(doc, OTHER_PATH) else {
        return Extracted::NotFound;
    };

    let items_of = |tag: &str| block.child(tag).map(|child| child.nodes()).unwrap_or_default();

    let mut records: Vec<OtherBibliographic> = items_of("OUTRA-PRODUCAO-BIBLIOGRAFICA")
        .iter()
        .filter(|item| item.as_element().is_some())
        .map(OtherBibliographic::from_generic)
        .collect();
    for (tag, suffix, label) in SPECIAL_TYPES {
        records.extend(
            items_of(tag)
                .iter()
                .filter(|item| item.as_element().is_some())
                .map(|item| OtherBibliographic::from_special(item, suffix, label)),
        );
    }

    Extracted::from_items(select(records, filter, Ordering::SequenceDescAfterFilter))
}
