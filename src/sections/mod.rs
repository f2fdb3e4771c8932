//! Section extractors.
//!
//! Every extractor follows one template: resolve a fixed dot path, iterate
//! the single-or-many child uniformly, build one record per item with the
//! "attribute or empty string" helper, normalize its authors, and keep the
//! items the [`FilterCriteria`] accepts. A position counter advances for
//! every item, kept or not.
//!
//! Extractors differ in where they sort. Articles are ordered by year and
//! books/chapters by production sequence *before* the filter counts
//! positions; conference papers, technical works, talks and other
//! bibliographic productions are ordered by sequence *after* filtering; the
//! rest keep document order. Consumers depend on each of these orders, so
//! they are kept per extractor rather than unified (see [`Ordering`]).
//!
//! | Module | Sections |
//! |--------|----------|
//! | [`bibliographic`] | articles, books, chapters, conference papers, other bibliographic |
//! | [`technical`] | technical works, talks, events, courses, reports, teaching material |
//! | [`general`] | awards, résumé, theses, post-docs, committees, projects, research lines, areas |

pub mod bibliographic;
pub mod general;
pub mod technical;

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::filter::{parse_int, FilterCriteria};
use crate::tree::Node;

pub use bibliographic::{
    articles, books, chapters, conference_papers, other_bibliographic, Article, Book, Chapter,
    ConferencePaper, OtherBibliographic,
};
pub use general::{
    awards, doctoral_committees, habilitation, knowledge_areas, masters_committees, postdocs,
    research_lines, research_projects, resume, theses, Language, PostDoc, ResearchProject,
    Thesis, ThesisLevel,
};
pub use technical::{
    event_organizations, other_technical, research_reports, short_courses, talks,
    teaching_materials, technical_works, EventOrganization, OtherTechnical, ResearchReport,
    ShortCourse, TeachingMaterial, TechnicalWork, Talk,
};

/// A filtered production record.
pub trait Production {
    /// Raw year field the filter reads.
    fn year(&self) -> &str;
    /// Raw `SEQUENCIA-PRODUCAO` attribute of the item.
    fn sequence(&self) -> &str;
}

/// Where an extractor orders its items relative to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Document,
    YearDescBeforeFilter,
    SequenceDescBeforeFilter,
    SequenceDescAfterFilter,
}

/// Applies the ordering and the filter to records built in document order.
pub(crate) fn select<T: Production>(
    mut records: Vec<T>,
    filter: &FilterCriteria,
    ordering: Ordering,
) -> Vec<T> {
    match ordering {
        Ordering::YearDescBeforeFilter => records.sort_by_key(|r| Reverse(parse_int(r.year()))),
        Ordering::SequenceDescBeforeFilter => {
            records.sort_by_key(|r| Reverse(parse_int(r.sequence())))
        }
        Ordering::Document | Ordering::SequenceDescAfterFilter => {}
    }

    let mut kept: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter(|(index, record)| filter.passes(record.year(), index + 1))
        .map(|(_, record)| record)
        .collect();

    if ordering == Ordering::SequenceDescAfterFilter {
        kept.sort_by_key(|r| Reverse(parse_int(r.sequence())));
    }
    kept
}

/// Items under `path`, or `None` when the section is absent. An empty
/// `<TAG/>` at the path counts as absent.
pub(crate) fn section_items<'a>(doc: &'a Node, path: &str) -> Option<&'a [Node]> {
    let items = doc.nodes_at(path)?;
    match items {
        [Node::Leaf(text)] if text.is_empty() => None,
        _ => Some(items),
    }
}

/// First occurrence of sub-block `name` of an item.
pub(crate) fn block<'a>(item: &'a Node, name: &str) -> Option<&'a Node> {
    item.child(name)?.nodes().first()
}

/// Attribute `key` of sub-block `name`, or the empty string.
pub(crate) fn block_attr(item: &Node, name: &str, key: &str) -> String {
    block(item, name)
        .and_then(|node| node.attr(key))
        .unwrap_or_default()
        .to_string()
}

/// Every extractor addressable by name, for callers that pick sections at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Articles,
    Books,
    Chapters,
    ConferencePapers,
    OtherBibliographic,
    TechnicalWorks,
    Talks,
    EventOrganizations,
    OtherTechnical,
    ShortCourses,
    ResearchReports,
    TeachingMaterials,
    Theses,
    Habilitation,
    Postdocs,
    MastersCommittees,
    DoctoralCommittees,
    ResearchProjects,
    ResearchLines,
    KnowledgeAreas,
    Awards,
    Resume,
}

impl SectionKind {
    pub const ALL: [SectionKind; 22] = [
        SectionKind::Articles,
        SectionKind::Books,
        SectionKind::Chapters,
        SectionKind::ConferencePapers,
        SectionKind::OtherBibliographic,
        SectionKind::TechnicalWorks,
        SectionKind::Talks,
        SectionKind::EventOrganizations,
        SectionKind::OtherTechnical,
        SectionKind::ShortCourses,
        SectionKind::ResearchReports,
        SectionKind::TeachingMaterials,
        SectionKind::Theses,
        SectionKind::Habilitation,
        SectionKind::Postdocs,
        SectionKind::MastersCommittees,
        SectionKind::DoctoralCommittees,
        SectionKind::ResearchProjects,
        SectionKind::ResearchLines,
        SectionKind::KnowledgeAreas,
        SectionKind::Awards,
        SectionKind::Resume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Articles => "articles",
            SectionKind::Books => "books",
            SectionKind::Chapters => "chapters",
            SectionKind::ConferencePapers => "conference-papers",
            SectionKind::OtherBibliographic => "other-bibliographic",
            SectionKind::TechnicalWorks => "technical-works",
            SectionKind::Talks => "talks",
            SectionKind::EventOrganizations => "events",
            SectionKind::OtherTechnical => "other-technical",
            SectionKind::ShortCourses => "short-courses",
            SectionKind::ResearchReports => "research-reports",
            SectionKind::TeachingMaterials => "teaching-materials",
            SectionKind::Theses => "theses",
            SectionKind::Habilitation => "habilitation",
            SectionKind::Postdocs => "postdocs",
            SectionKind::MastersCommittees => "masters-committees",
            SectionKind::DoctoralCommittees => "doctoral-committees",
            SectionKind::ResearchProjects => "projects",
            SectionKind::ResearchLines => "research-lines",
            SectionKind::KnowledgeAreas => "areas",
            SectionKind::Awards => "awards",
            SectionKind::Resume => "resume",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = SectionKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown section '{}'. Available: {}", s, names.join(", "))
            })
    }
}

/// Runtime-selected extraction rendered as JSON.
#[derive(Debug, Clone, Copy)]
pub struct SectionQuery {
    pub kind: SectionKind,
    pub filter: FilterCriteria,
    pub level: ThesisLevel,
    pub language: Language,
}

impl SectionQuery {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            filter: FilterCriteria::default(),
            level: ThesisLevel::Doctorate,
            language: Language::Portuguese,
        }
    }

    pub fn run(&self, doc: &Node) -> serde_json::Result<serde_json::Value> {
        let f = &self.filter;
        match self.kind {
            SectionKind::Articles => serde_json::to_value(articles(doc, f)),
            SectionKind::Books => serde_json::to_value(books(doc, f)),
            SectionKind::Chapters => serde_json::to_value(chapters(doc, f)),
            SectionKind::ConferencePapers => serde_json::to_value(conference_papers(doc, f)),
            SectionKind::OtherBibliographic => serde_json::to_value(other_bibliographic(doc, f)),
            SectionKind::TechnicalWorks => serde_json::to_value(technical_works(doc, f)),
            SectionKind::Talks => serde_json::to_value(talks(doc, f)),
            SectionKind::EventOrganizations => serde_json::to_value(event_organizations(doc, f)),
            SectionKind::OtherTechnical => serde_json::to_value(other_technical(doc, f)),
            SectionKind::ShortCourses => serde_json::to_value(short_courses(doc, f)),
            SectionKind::ResearchReports => serde_json::to_value(research_reports(doc, f)),
            SectionKind::TeachingMaterials => serde_json::to_value(teaching_materials(doc, f)),
            SectionKind::Theses => serde_json::to_value(theses(doc, self.level)),
            SectionKind::Habilitation => serde_json::to_value(habilitation(doc)),
            SectionKind::Postdocs => serde_json::to_value(postdocs(doc)),
            SectionKind::MastersCommittees => serde_json::to_value(masters_committees(doc)),
            SectionKind::DoctoralCommittees => serde_json::to_value(doctoral_committees(doc)),
            SectionKind::ResearchProjects => serde_json::to_value(research_projects(doc)),
            SectionKind::ResearchLines => serde_json::to_value(research_lines(doc)),
            SectionKind::KnowledgeAreas => serde_json::to_value(knowledge_areas(doc)),
            SectionKind::Awards => serde_json::to_value(awards(doc)),
            SectionKind::Resume => serde_json::to_value(resume(doc, self.language)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        year: &'static str,
        seq: &'static str,
    }

    impl Production for Item {
        fn year(&self) -> &str {
            self.year
        }
        fn sequence(&self) -> &str {
            self.seq
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item { year: "2019", seq: "2" },
            Item { year: "2023", seq: "1" },
            Item { year: "2021", seq: "3" },
        ]
    }

    fn seqs(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.seq).collect()
    }

    #[test]
    fn sort_before_filter_changes_which_items_are_counted() {
        let filter = FilterCriteria::records(2);
        let before = select(items(), &filter, Ordering::SequenceDescBeforeFilter);
        let after = select(items(), &filter, Ordering::SequenceDescAfterFilter);
        assert_eq!(seqs(&before), vec!["3", "2"]);
        assert_eq!(seqs(&after), vec!["2", "1"]);
    }

    #[test]
    fn year_ordering_is_descending() {
        let sorted = select(items(), &FilterCriteria::all(), Ordering::YearDescBeforeFilter);
        let years: Vec<&str> = sorted.iter().map(|i| i.year).collect();
        assert_eq!(years, vec!["2023", "2021", "2019"]);
    }

    #[test]
    fn document_order_is_preserved() {
        let kept = select(items(), &FilterCriteria::period(2020, None), Ordering::Document);
        assert_eq!(seqs(&kept), vec!["1", "3"]);
    }

    #[test]
    fn ties_keep_document_order() {
        let tied = vec![
            Item { year: "2020", seq: "a" },
            Item { year: "2020", seq: "b" },
            Item { year: "", seq: "c" },
        ];
        let sorted = select(tied, &FilterCriteria::all(), Ordering::YearDescBeforeFilter);
        assert_eq!(seqs(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn section_kind_names_parse_back() {
        for kind in SectionKind::ALL {
            assert_eq!(kind.name().parse::<SectionKind>(), Ok(kind));
        }
        assert!("patents".parse::<SectionKind>().is_err());
    }
}
