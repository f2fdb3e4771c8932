//! Personal and complementary data: awards, résumé text, degrees,
//! examination committees, research projects and areas of expertise.
//!
//! None of these take a [`FilterCriteria`](crate::filter::FilterCriteria);
//! they return every qualifying entry in document order.

use std::fmt;
use std::str::FromStr;

use quick_xml::escape;
use serde::Serialize;
use tracing::debug;

use super::{block, block_attr, section_items};
use crate::models::Extracted;
use crate::tree::Node;

const AWARDS_PATH: &str = "DADOS-GERAIS.PREMIOS-TITULOS.PREMIO-TITULO";
const RESUME_PATH: &str = "DADOS-GERAIS.RESUMO-CV.@attributes.TEXTO-RESUMO-CV-RH";
const DEGREES_PATH: &str = "DADOS-GERAIS.FORMACAO-ACADEMICA-TITULACAO";
const POSITIONS_PATH: &str = "DADOS-GERAIS.ATUACOES-PROFISSIONAIS.ATUACAO-PROFISSIONAL";
const AREAS_PATH: &str = "DADOS-GERAIS.AREAS-DE-ATUACAO.AREA-DE-ATUACAO";
const COMMITTEES_PATH: &str = "DADOS-COMPLEMENTARES.PARTICIPACAO-EM-BANCA-TRABALHOS-CONCLUSAO";

const KEYWORD_SLOTS: usize = 6;

/// Résumé language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Portuguese,
    English,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt" => Ok(Language::Portuguese),
            "en" => Ok(Language::English),
            other => Err(format!("unknown language '{}'. Must be pt or en.", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Portuguese => "pt",
            Language::English => "en",
        })
    }
}

/// Degree level read by [`theses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThesisLevel {
    Masters,
    Doctorate,
}

impl ThesisLevel {
    pub fn tag(self) -> &'static str {
        match self {
            ThesisLevel::Masters => "MESTRADO",
            ThesisLevel::Doctorate => "DOUTORADO",
        }
    }
}

impl FromStr for ThesisLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MESTRADO" => Ok(ThesisLevel::Masters),
            "DOUTORADO" => Ok(ThesisLevel::Doctorate),
            other => Err(format!(
                "unknown degree level '{}'. Must be MESTRADO or DOUTORADO.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thesis {
    #[serde(rename = "TITULO")]
    pub title: String,
    /// Up to six keywords joined with `"; "`.
    #[serde(rename = "PALAVRAS-CHAVE")]
    pub keywords: String,
    #[serde(rename = "ANO-DE-OBTENCAO-DO-TITULO")]
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDoc {
    pub ano_inicio: Option<String>,
    pub ano_conclusao: Option<String>,
    pub instituicao: Option<String>,
    pub status: Option<String>,
    pub agencia_fomento: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchProject {
    pub ano_inicio: Option<String>,
    pub ano_fim: Option<String>,
    pub nome_projeto: Option<String>,
    pub descricao: Option<String>,
    pub situacao: Option<String>,
    pub natureza: Option<String>,
    /// Full names of every team member, in document order.
    pub integrantes: Vec<String>,
}

/// `"{name} - Ano: {year}"` per award.
///
/// If any entry lacks a name the whole section is treated as unreadable
/// and `NotFound` is returned.
pub fn awards(doc: &Node) -> Extracted<String> {
    let Some(items) = section_items(doc, AWARDS_PATH) else {
        return Extracted::NotFound;
    };
    let mut awards = Vec::with_capacity(items.len());
    for item in items {
        let Some(name) = item.attr("NOME-DO-PREMIO-OU-TITULO") else {
            debug!("award without a name, discarding section");
            return Extracted::NotFound;
        };
        let year = item.attr("ANO-DA-PREMIACAO").unwrap_or_default();
        awards.push(format!("{name} - Ano: {year}"));
    }
    Extracted::from_items(awards)
}

/// Free-text résumé, with HTML entities left over from the CV editor resolved.
///
/// Returns the empty string when the CV has no résumé in that language.
pub fn resume(doc: &Node, language: Language) -> String {
    let path = match language {
        Language::Portuguese => RESUME_PATH.to_string(),
        Language::English => format!("{RESUME_PATH}-EN"),
    };
    unescape_html(doc.text_at(&path).unwrap_or_default())
}

/// One pass of HTML entity resolution. Entities that do not resolve are
/// kept verbatim and the rest of the text is still processed.
fn unescape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity_len = tail[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .filter(|&end| tail.as_bytes()[end + 1] == b';')
            .map(|end| end + 2);
        let Some(len) = entity_len else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[..len];
        match escape::unescape_with(entity, escape::resolve_html5_entity) {
            Ok(text) => out.push_str(&text),
            Err(_) => out.push_str(entity),
        }
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

/// Dissertations or theses at one degree level. Entries without a title
/// are skipped.
pub fn theses(doc: &Node, level: ThesisLevel) -> Extracted<Thesis> {
    let path = format!("{DEGREES_PATH}.{}", level.tag());
    let Some(items) = section_items(doc, &path) else {
        return Extracted::NotFound;
    };
    let theses = items
        .iter()
        .filter_map(|item| {
            let title = item.attr("TITULO-DA-DISSERTACAO-TESE").filter(|t| !t.is_empty())?;
            let keywords: Vec<String> = (1..=KEYWORD_SLOTS)
                .map(|slot| block_attr(item, "PALAVRAS-CHAVE", &format!("PALAVRA-CHAVE-{slot}")))
                .filter(|keyword| !keyword.is_empty())
                .collect();
            Some(Thesis {
                title: title.to_string(),
                keywords: keywords.join("; "),
                year: item.attr_or_empty("ANO-DE-OBTENCAO-DO-TITULO"),
            })
        })
        .collect();
    Extracted::from_items(theses)
}

/// Titles of habilitation (livre-docência) works.
pub fn habilitation(doc: &Node) -> Extracted<String> {
    let Some(items) = section_items(doc, &format!("{DEGREES_PATH}.LIVRE-DOCENCIA")) else {
        return Extracted::NotFound;
    };
    Extracted::from_items(
        items
            .iter()
            .filter_map(|item| item.attr("TITULO-DO-TRABALHO"))
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn postdocs(doc: &Node) -> Extracted<PostDoc> {
    let Some(items) = section_items(doc, &format!("{DEGREES_PATH}.POS-DOUTORADO")) else {
        return Extracted::NotFound;
    };
    let owned = |item: &Node, key: &str| item.attr(key).map(str::to_string);
    Extracted::from_items(
        items
            .iter()
            .map(|item| PostDoc {
                ano_inicio: owned(item, "ANO-DE-INICIO"),
                ano_conclusao: owned(item, "ANO-DE-CONCLUSAO"),
                instituicao: owned(item, "NOME-INSTITUICAO"),
                status: owned(item, "STATUS-DO-CURSO"),
                agencia_fomento: owned(item, "NOME-AGENCIA"),
            })
            .collect(),
    )
}

/// Titles of master's examination committees the person sat on.
pub fn masters_committees(doc: &Node) -> Extracted<String> {
    let path = format!("{COMMITTEES_PATH}.PARTICIPACAO-EM-BANCA-DE-MESTRADO");
    let Some(items) = section_items(doc, &path) else {
        return Extracted::NotFound;
    };
    Extracted::from_items(
        items
            .iter()
            .map(|item| {
                block_attr(item, "DADOS-BASICOS-DA-PARTICIPACAO-EM-BANCA-DE-MESTRADO", "TITULO")
            })
            .filter(|title| !title.is_empty())
            .collect(),
    )
}

/// Doctoral committees as `"{title}\n{candidate}"`, or just the title when
/// no candidate is recorded.
pub fn doctoral_committees(doc: &Node) -> Extracted<String> {
    let path = format!("{COMMITTEES_PATH}.PARTICIPACAO-EM-BANCA-DE-DOUTORADO");
    let Some(items) = section_items(doc, &path) else {
        return Extracted::NotFound;
    };
    Extracted::from_items(
        items
            .iter()
            .filter_map(|item| {
                let title = block_attr(
                    item,
                    "DADOS-BASICOS-DA-PARTICIPACAO-EM-BANCA-DE-DOUTORADO",
                    "TITULO",
                );
                if title.is_empty() {
                    return None;
                }
                let candidate = block_attr(
                    item,
                    "DETALHAMENTO-DA-PARTICIPACAO-EM-BANCA-DE-DOUTORADO",
                    "NOME-DO-CANDIDATO",
                );
                Some(if candidate.is_empty() {
                    title
                } else {
                    format!("{title}\n{candidate}")
                })
            })
            .collect(),
    )
}

/// Research projects across every professional position.
///
/// Projects are read both directly under the participation block and
/// nested one level down in `PARTICIPACAO-EM-PROJETO`, which is where
/// exported CVs usually place them.
pub fn research_projects(doc: &Node) -> Extracted<ResearchProject> {
    let Some(positions) = section_items(doc, POSITIONS_PATH) else {
        return Extracted::NotFound;
    };

    let mut projects = Vec::new();
    for position in positions {
        let Some(activities) = block(position, "ATIVIDADES-DE-PARTICIPACAO-EM-PROJETO") else {
            continue;
        };
        let direct = children(activities, "PROJETO-DE-PESQUISA");
        let nested = children(activities, "PARTICIPACAO-EM-PROJETO")
            .iter()
            .flat_map(|participation| children(participation, "PROJETO-DE-PESQUISA"));
        projects.extend(
            direct
                .iter()
                .chain(nested)
                .filter(|project| project.as_element().is_some())
                .map(ResearchProject::from_node),
        );
    }
    Extracted::from_items(projects)
}

impl ResearchProject {
    fn from_node(project: &Node) -> Self {
        let owned = |key: &str| project.attr(key).map(str::to_string);
        let integrantes = children(project, "EQUIPE-DO-PROJETO")
            .iter()
            .flat_map(|team| children(team, "INTEGRANTES-DO-PROJETO"))
            .filter(|member| member.as_element().is_some())
            .map(|member| member.attr_or_empty("NOME-COMPLETO"))
            .collect();
        Self {
            ano_inicio: owned("ANO-INICIO"),
            ano_fim: owned("ANO-FIM"),
            nome_projeto: owned("NOME-DO-PROJETO"),
            descricao: owned("DESCRICAO-DO-PROJETO"),
            situacao: owned("SITUACAO"),
            natureza: owned("NATUREZA"),
            integrantes,
        }
    }
}

/// Research line titles across every professional position.
pub fn research_lines(doc: &Node) -> Extracted<String> {
    let Some(positions) = section_items(doc, POSITIONS_PATH) else {
        return Extracted::NotFound;
    };
    let lines = positions
        .iter()
        .filter_map(|position| {
            position.nodes_at("ATIVIDADES-DE-PESQUISA-E-DESENVOLVIMENTO.PESQUISA-E-DESENVOLVIMENTO")
        })
        .flatten()
        .flat_map(|research| children(research, "LINHA-DE-PESQUISA"))
        .filter_map(|line| line.attr("TITULO-DA-LINHA-DE-PESQUISA"))
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect();
    Extracted::from_items(lines)
}

/// Names of the knowledge areas the person declares.
pub fn knowledge_areas(doc: &Node) -> Extracted<String> {
    let Some(areas) = section_items(doc, AREAS_PATH) else {
        return Extracted::NotFound;
    };
    Extracted::from_items(
        areas
            .iter()
            .filter_map(|area| area.attr("NOME-DA-AREA-DO-CONHECIMENTO"))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn children<'a>(node: &'a Node, name: &str) -> &'a [Node] {
    node.child(name).map(|child| child.nodes()).unwrap_or_default()
}
