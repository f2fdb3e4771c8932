//! Co-author list normalization shared by every production extractor.

use crate::models::{Author, Extracted};
use crate::tree::{Child, Node};

/// Sort position for authors whose declared order is missing or not a number.
const UNORDERED: u32 = u32::MAX;

impl Author {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_element()?;
        let owned = |key: &str| node.field(key).map(str::to_string);
        Some(Self {
            full_name: owned("NOME-COMPLETO-DO-AUTOR"),
            citation_name: owned("NOME-PARA-CITACAO"),
            order: owned("ORDEM-DE-AUTORIA"),
        })
    }

    /// Numeric declared order, or a sentinel that sorts after every real position.
    pub fn sort_key(&self) -> u32 {
        self.order
            .as_deref()
            .and_then(|order| order.trim().parse().ok())
            .unwrap_or(UNORDERED)
    }
}

/// Builds the ordered author list of a production from its `AUTORES` child.
///
/// `None` input gives [`Extracted::NotFound`]; a present child with no
/// author elements gives [`Extracted::Empty`].
pub fn normalize_authors(authors: Option<&Child>) -> Extracted<Author> {
    let Some(child) = authors else {
        return Extracted::NotFound;
    };
    let mut list: Vec<Author> = child.nodes().iter().filter_map(Author::from_node).collect();
    list.sort_by_key(Author::sort_key);
    Extracted::from_items(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_document;

    fn authors_of(xml: &str) -> Extracted<Author> {
        let doc = parse_document(xml).unwrap();
        normalize_authors(doc.child("AUTORES"))
    }

    fn names(authors: &Extracted<Author>) -> Vec<&str> {
        authors
            .items()
            .iter()
            .map(|a| a.full_name.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn sorts_by_declared_order() {
        let authors = authors_of(
            r#"<P>
                <AUTORES NOME-COMPLETO-DO-AUTOR="C" ORDEM-DE-AUTORIA="3"/>
                <AUTORES NOME-COMPLETO-DO-AUTOR="A" ORDEM-DE-AUTORIA="1"/>
                <AUTORES NOME-COMPLETO-DO-AUTOR="B" ORDEM-DE-AUTORIA="2"/>
            </P>"#,
        );
        assert_eq!(names(&authors), vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_or_garbled_order_sorts_last() {
        let authors = authors_of(
            r#"<P>
                <AUTORES NOME-COMPLETO-DO-AUTOR="X"/>
                <AUTORES NOME-COMPLETO-DO-AUTOR="Y" ORDEM-DE-AUTORIA="primeiro"/>
                <AUTORES NOME-COMPLETO-DO-AUTOR="A" ORDEM-DE-AUTORIA="10"/>
            </P>"#,
        );
        assert_eq!(names(&authors), vec!["A", "X", "Y"]);
    }

    #[test]
    fn single_author_is_not_special() {
        let authors = authors_of(
            r#"<P><AUTORES NOME-COMPLETO-DO-AUTOR="Solo" NOME-PARA-CITACAO="SOLO" ORDEM-DE-AUTORIA="1"/></P>"#,
        );
        assert_eq!(authors.len(), 1);
        assert_eq!(authors.items()[0].citation_name.as_deref(), Some("SOLO"));
    }

    #[test]
    fn fields_may_be_child_elements() {
        let authors = authors_of(
            "<P><AUTORES><NOME-COMPLETO-DO-AUTOR>Ana</NOME-COMPLETO-DO-AUTOR>\
             <ORDEM-DE-AUTORIA>2</ORDEM-DE-AUTORIA></AUTORES></P>",
        );
        assert_eq!(names(&authors), vec!["Ana"]);
        assert_eq!(authors.items()[0].order.as_deref(), Some("2"));
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        assert_eq!(authors_of(r#"<P X="1"/>"#), Extracted::NotFound);
        assert_eq!(authors_of("<P><AUTORES/></P>"), Extracted::Empty);
    }
}
