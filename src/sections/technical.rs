//! Technical production.

use serde::Serialize;

use super::{block_attr, section_items, select, Ordering, Production};
use crate::authors::normalize_authors;
use crate::filter::FilterCriteria;
use crate::models::{Author, Extracted};
use crate::tree::Node;

const TECHNICAL_WORKS_PATH: &str = "PRODUCAO-TECNICA.TRABALHO-TECNICO";
const OTHER_TYPES: &str = "PRODUCAO-TECNICA.DEMAIS-TIPOS-DE-PRODUCAO-TECNICA";

const SEQUENCE: &str = "SEQUENCIA-PRODUCAO";

/// Builds records from the items at `path` and applies ordering and filter.
fn extract<T: Production>(
    doc: &Node,
    path: &str,
    filter: &FilterCriteria,
    ordering: Ordering,
    build: impl Fn(&Node) -> T,
) -> Extracted<T> {
    let Some(items) = section_items(doc, path) else {
        return Extracted::NotFound;
    };
    let records = items.iter().map(build).collect();
    Extracted::from_items(select(records, filter, ordering))
}

fn other_type_path(tag: &str) -> String {
    format!("{OTHER_TYPES}.{tag}")
}

macro_rules! production {
    ($ty:ty) => {
        impl Production for $ty {
            fn year(&self) -> &str {
                &self.year
            }
            fn sequence(&self) -> &str {
                &self.sequence
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalWork {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "TIPO")]
    pub kind: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "INSTITUICAO-FINANCIADORA")]
    pub funding_institution: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Talk {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "TIPO")]
    pub kind: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOrganization {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "TIPO")]
    pub kind: String,
    #[serde(rename = "INSTITUICAO-PROMOTORA")]
    pub promoter: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherTechnical {
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "NATUREZA")]
    pub nature: String,
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

/// A short course taught by the person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortCourse {
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "NIVEL-DO-CURSO")]
    pub level: String,
    #[serde(rename = "INSTITUICAO-PROMOTORA-DO-CURSO")]
    pub promoter: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchReport {
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeachingMaterial {
    #[serde(rename = "SEQUENCIA-PRODUCAO")]
    pub sequence: String,
    #[serde(rename = "TITULO")]
    pub title: String,
    #[serde(rename = "ANO")]
    pub year: String,
    #[serde(rename = "NATUREZA")]
    pub nature: String,
    #[serde(rename = "AUTORES")]
    pub authors: Extracted<Author>,
}

production!(TechnicalWork);
production!(Talk);
production!(EventOrganization);
production!(OtherTechnical);
production!(ShortCourse);
production!(ResearchReport);
production!(TeachingMaterial);

pub fn technical_works(doc: &Node, filter: &FilterCriteria) -> Extracted<TechnicalWork> {
    extract(
        doc,
        TECHNICAL_WORKS_PATH,
        filter,
        Ordering::SequenceDescAfterFilter,
        |item| {
            let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-TRABALHO-TECNICO", key);
            TechnicalWork {
                title: basic("TITULO-DO-TRABALHO-TECNICO"),
                kind: basic("NATUREZA"),
                sequence: item.attr_or_empty(SEQUENCE),
                year: basic("ANO"),
                funding_institution: block_attr(
                    item,
                    "DETALHAMENTO-DO-TRABALHO-TECNICO",
                    "INSTITUICAO-FINANCIADORA",
                ),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

/// Talks and presentations.
pub fn talks(doc: &Node, filter: &FilterCriteria) -> Extracted<Talk> {
    extract(
        doc,
        &other_type_path("APRESENTACAO-DE-TRABALHO"),
        filter,
        Ordering::SequenceDescAfterFilter,
        |item| {
            let basic =
                |key: &str| block_attr(item, "DADOS-BASICOS-DA-APRESENTACAO-DE-TRABALHO", key);
            Talk {
                title: basic("TITULO"),
                kind: basic("NATUREZA"),
                sequence: item.attr_or_empty(SEQUENCE),
                year: basic("ANO"),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

pub fn event_organizations(doc: &Node, filter: &FilterCriteria) -> Extracted<EventOrganization> {
    extract(
        doc,
        &other_type_path("ORGANIZACAO-DE-EVENTO"),
        filter,
        Ordering::Document,
        |item| {
            let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DA-ORGANIZACAO-DE-EVENTO", key);
            EventOrganization {
                title: basic("TITULO"),
                year: basic("ANO"),
                kind: basic("TIPO"),
                promoter: block_attr(
                    item,
                    "DETALHAMENTO-DA-ORGANIZACAO-DE-EVENTO",
                    "INSTITUICAO-PROMOTORA",
                ),
                sequence: item.attr_or_empty(SEQUENCE),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

pub fn other_technical(doc: &Node, filter: &FilterCriteria) -> Extracted<OtherTechnical> {
    extract(
        doc,
        &other_type_path("OUTRA-PRODUCAO-TECNICA"),
        filter,
        Ordering::Document,
        |item| {
            let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DE-OUTRA-PRODUCAO-TECNICA", key);
            OtherTechnical {
                title: basic("TITULO"),
                nature: basic("NATUREZA"),
                sequence: item.attr_or_empty(SEQUENCE),
                year: basic("ANO"),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

pub fn short_courses(doc: &Node, filter: &FilterCriteria) -> Extracted<ShortCourse> {
    extract(
        doc,
        &other_type_path("CURSO-DE-CURTA-DURACAO-MINISTRADO"),
        filter,
        Ordering::Document,
        |item| {
            let basic =
                |key: &str| block_attr(item, "DADOS-BASICOS-DE-CURSOS-CURTA-DURACAO-MINISTRADO", key);
            ShortCourse {
                sequence: item.attr_or_empty(SEQUENCE),
                title: basic("TITULO"),
                year: basic("ANO"),
                level: basic("NIVEL-DO-CURSO"),
                promoter: block_attr(
                    item,
                    "DETALHAMENTO-DE-CURSOS-CURTA-DURACAO-MINISTRADO",
                    "INSTITUICAO-PROMOTORA-DO-CURSO",
                ),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

pub fn research_reports(doc: &Node, filter: &FilterCriteria) -> Extracted<ResearchReport> {
    extract(
        doc,
        &other_type_path("RELATORIO-DE-PESQUISA"),
        filter,
        Ordering::Document,
        |item| {
            let basic = |key: &str| block_attr(item, "DADOS-BASICOS-DO-RELATORIO-DE-PESQUISA", key);
            ResearchReport {
                sequence: item.attr_or_empty(SEQUENCE),
                title: basic("TITULO"),
                year: basic("ANO"),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

pub fn teaching_materials(doc: &Node, filter: &FilterCriteria) -> Extracted<TeachingMaterial> {
    extract(
        doc,
        &other_type_path("DESENVOLVIMENTO-DE-MATERIAL-DIDATICO-OU-INSTRUCIONAL"),
        filter,
        Ordering::Document,
        |item| {
            let basic = |key: &str| {
                block_attr(item, "DADOS-BASICOS-DO-MATERIAL-DIDATICO-OU-INSTRUCIONAL", key)
            };
            TeachingMaterial {
                sequence: item.attr_or_empty(SEQUENCE),
                title: basic("TITULO"),
                year: basic("ANO"),
                nature: basic("NATUREZA"),
                authors: normalize_authors(item.child("AUTORES")),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn doc(body: &str) -> Node {
        parse_document(&format!(
            "<CURRICULO-VITAE><PRODUCAO-TECNICA>{body}</PRODUCAO-TECNICA></CURRICULO-VITAE>"
        ))
        .unwrap()
    }

    fn other_types(body: &str) -> Node {
        doc(&format!(
            "<DEMAIS-TIPOS-DE-PRODUCAO-TECNICA>{body}</DEMAIS-TIPOS-DE-PRODUCAO-TECNICA>"
        ))
    }

    #[test]
    fn technical_work_title_and_funding() {
        let doc = doc(
            r#"<TRABALHO-TECNICO SEQUENCIA-PRODUCAO="1">
                <DADOS-BASICOS-DO-TRABALHO-TECNICO TITULO-DO-TRABALHO-TECNICO="Tecnico A" ANO="2023" NATUREZA="PARECER"/>
                <DETALHAMENTO-DO-TRABALHO-TECNICO INSTITUICAO-FINANCIADORA="FAPESP"/>
            </TRABALHO-TECNICO>"#,
        );
        let found = technical_works(&doc, &FilterCriteria::default());
        assert_eq!(found.len(), 1);
        let work = &found.items()[0];
        assert_eq!(work.title, "Tecnico A");
        assert_eq!(work.kind, "PARECER");
        assert_eq!(work.funding_institution, "FAPESP");
        assert!(work.authors.is_not_found());
    }

    #[test]
    fn talks_are_sorted_by_sequence_descending() {
        let doc = other_types(
            r#"<APRESENTACAO-DE-TRABALHO SEQUENCIA-PRODUCAO="4">
                <DADOS-BASICOS-DA-APRESENTACAO-DE-TRABALHO TITULO="Older" ANO="2021" NATUREZA="CONFERENCIA"/>
            </APRESENTACAO-DE-TRABALHO>
            <APRESENTACAO-DE-TRABALHO SEQUENCIA-PRODUCAO="11">
                <DADOS-BASICOS-DA-APRESENTACAO-DE-TRABALHO TITULO="Newer" ANO="2022" NATUREZA="PALESTRA"/>
            </APRESENTACAO-DE-TRABALHO>"#,
        );
        let found = talks(&doc, &FilterCriteria::all());
        let titles: Vec<_> = found.items().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[test]
    fn events_keep_document_order_and_annual_filter() {
        let doc = other_types(
            r#"<ORGANIZACAO-DE-EVENTO SEQUENCIA-PRODUCAO="1">
                <DADOS-BASICOS-DA-ORGANIZACAO-DE-EVENTO TITULO="Workshop" ANO="2023" TIPO="CONGRESSO"/>
                <DETALHAMENTO-DA-ORGANIZACAO-DE-EVENTO INSTITUICAO-PROMOTORA="USP"/>
            </ORGANIZACAO-DE-EVENTO>
            <ORGANIZACAO-DE-EVENTO SEQUENCIA-PRODUCAO="2">
                <DADOS-BASICOS-DA-ORGANIZACAO-DE-EVENTO TITULO="Old" ANO="2010"/>
            </ORGANIZACAO-DE-EVENTO>
            <ORGANIZACAO-DE-EVENTO SEQUENCIA-PRODUCAO="3">
                <DADOS-BASICOS-DA-ORGANIZACAO-DE-EVENTO TITULO="School" ANO="2024"/>
            </ORGANIZACAO-DE-EVENTO>"#,
        );
        let filter = FilterCriteria::annual(5).with_reference_year(2024);
        let found = event_organizations(&doc, &filter);
        let titles: Vec<_> = found.items().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Workshop", "School"]);
        assert_eq!(found.items()[0].promoter, "USP");
        assert_eq!(found.items()[0].kind, "CONGRESSO");
    }

    #[test]
    fn short_courses_read_level_and_promoter() {
        let doc = other_types(
            r#"<CURSO-DE-CURTA-DURACAO-MINISTRADO SEQUENCIA-PRODUCAO="7">
                <DADOS-BASICOS-DE-CURSOS-CURTA-DURACAO-MINISTRADO TITULO="Rust" ANO="2022" NIVEL-DO-CURSO="EXTENSAO"/>
                <DETALHAMENTO-DE-CURSOS-CURTA-DURACAO-MINISTRADO INSTITUICAO-PROMOTORA-DO-CURSO="IME"/>
                <AUTORES NOME-COMPLETO-DO-AUTOR="Ana" ORDEM-DE-AUTORIA="1"/>
            </CURSO-DE-CURTA-DURACAO-MINISTRADO>"#,
        );
        let found = short_courses(&doc, &FilterCriteria::default());
        let course = &found.items()[0];
        assert_eq!(course.level, "EXTENSAO");
        assert_eq!(course.promoter, "IME");
        assert_eq!(course.authors.len(), 1);
    }

    #[test]
    fn reports_materials_and_other_productions() {
        let doc = other_types(
            r#"<RELATORIO-DE-PESQUISA SEQUENCIA-PRODUCAO="1">
                <DADOS-BASICOS-DO-RELATORIO-DE-PESQUISA TITULO="Relatorio" ANO="2020"/>
            </RELATORIO-DE-PESQUISA>
            <DESENVOLVIMENTO-DE-MATERIAL-DIDATICO-OU-INSTRUCIONAL SEQUENCIA-PRODUCAO="2">
                <DADOS-BASICOS-DO-MATERIAL-DIDATICO-OU-INSTRUCIONAL TITULO="Apostila" ANO="2021" NATUREZA="TEXTO"/>
            </DESENVOLVIMENTO-DE-MATERIAL-DIDATICO-OU-INSTRUCIONAL>
            <OUTRA-PRODUCAO-TECNICA SEQUENCIA-PRODUCAO="3">
                <DADOS-BASICOS-DE-OUTRA-PRODUCAO-TECNICA TITULO="Software" ANO="2022" NATUREZA="OUTRA"/>
            </OUTRA-PRODUCAO-TECNICA>"#,
        );
        let filter = FilterCriteria::all();
        assert_eq!(research_reports(&doc, &filter).items()[0].title, "Relatorio");
        assert_eq!(teaching_materials(&doc, &filter).items()[0].nature, "TEXTO");
        assert_eq!(other_technical(&doc, &filter).items()[0].title, "Software");
        assert!(talks(&doc, &filter).is_not_found());
    }

    #[test]
    fn missing_technical_section_is_not_found() {
        let doc = parse_document("<CURRICULO-VITAE><DADOS-GERAIS/></CURRICULO-VITAE>").unwrap();
        assert!(technical_works(&doc, &FilterCriteria::default()).is_not_found());
        assert!(short_courses(&doc, &FilterCriteria::default()).is_not_found());
    }
}
