//! Generic document tree built from CV XML.
//!
//! The CV schema is irregular: a tag may appear once as a bare element or
//! several times at the same level, and most data lives in attributes. The
//! tree keeps that shape but makes the ambiguity explicit: every child entry
//! is either [`Child::Single`] or [`Child::Many`], and consumers iterate
//! both through [`Child::nodes`].
//!
//! Attributes are addressed with the reserved `@attributes` segment, both in
//! dot paths (`"DADOS-GERAIS.RESUMO-CV.@attributes.TEXTO-RESUMO-CV-RH"`) and
//! in the JSON rendering produced by the [`Serialize`] impl.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{LattesError, Result};

/// Reserved key under which an element's attributes are reported.
pub const ATTRIBUTES_KEY: &str = "@attributes";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Element without attributes or children: its trimmed text.
    Leaf(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub attributes: BTreeMap<String, String>,
    pub children: BTreeMap<String, Child>,
}

/// All occurrences of one tag name under a parent, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Single(Node),
    Many(Vec<Node>),
}

/// Result of a dot-path lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Node(&'a Node),
    Many(&'a [Node]),
    Attributes(&'a BTreeMap<String, String>),
    Text(&'a str),
}

impl Child {
    /// Uniform view over one or many occurrences.
    pub fn nodes(&self) -> &[Node] {
        match self {
            Child::Single(node) => std::slice::from_ref(node),
            Child::Many(nodes) => nodes,
        }
    }

    fn push(self, node: Node) -> Child {
        match self {
            Child::Single(first) => Child::Many(vec![first, node]),
            Child::Many(mut nodes) => {
                nodes.push(node);
                Child::Many(nodes)
            }
        }
    }

    fn as_lookup(&self) -> Lookup<'_> {
        match self {
            Child::Single(node) => Lookup::Node(node),
            Child::Many(nodes) => Lookup::Many(nodes),
        }
    }
}

impl Element {
    fn step(&self, segment: &str) -> Option<Lookup<'_>> {
        if segment == ATTRIBUTES_KEY {
            if self.attributes.is_empty() {
                return None;
            }
            return Some(Lookup::Attributes(&self.attributes));
        }
        self.children.get(segment).map(Child::as_lookup)
    }
}

impl<'a> Lookup<'a> {
    /// The nodes reached by the path; a single node becomes a one-element slice.
    pub fn nodes(self) -> Option<&'a [Node]> {
        match self {
            Lookup::Node(node) => Some(std::slice::from_ref(node)),
            Lookup::Many(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn text(self) -> Option<&'a str> {
        match self {
            Lookup::Text(text) => Some(text),
            Lookup::Node(Node::Leaf(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Leaf(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.as_element()?.children.get(name)
    }

    /// Attribute value, if this node is an element carrying it.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.as_element()?.attributes.get(key).map(String::as_str)
    }

    /// Attribute value or the empty string.
    pub fn attr_or_empty(&self, key: &str) -> String {
        self.attr(key).unwrap_or_default().to_string()
    }

    /// Reads a field that is normally an attribute but may appear as a leaf
    /// child on nodes that carry no attributes at all.
    pub fn field(&self, key: &str) -> Option<&str> {
        let element = self.as_element()?;
        if !element.attributes.is_empty() {
            return element.attributes.get(key).map(String::as_str);
        }
        match element.children.get(key)? {
            Child::Single(Node::Leaf(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Walks a dot-delimited path. Returns `None` as soon as a segment is
    /// missing or the current value is not an element.
    pub fn lookup(&self, path: &str) -> Option<Lookup<'_>> {
        let mut current = Lookup::Node(self);
        for segment in path.split('.') {
            current = match current {
                Lookup::Node(Node::Element(element)) => element.step(segment)?,
                Lookup::Attributes(attributes) => Lookup::Text(attributes.get(segment)?.as_str()),
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn lookup_or<'a>(&'a self, path: &str, default: Lookup<'a>) -> Lookup<'a> {
        self.lookup(path).unwrap_or(default)
    }

    pub fn nodes_at(&self, path: &str) -> Option<&[Node]> {
        self.lookup(path)?.nodes()
    }

    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.lookup(path)?.text()
    }
}

// ── Normalizer ──────────────────────────────────────────────────────────

struct Builder {
    name: String,
    attributes: BTreeMap<String, String>,
    children: BTreeMap<String, Child>,
    text: String,
}

impl Builder {
    fn open(start: &BytesStart<'_>, position: u64) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(position, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(position, e))?
                .into_owned();
            attributes.insert(key, value);
        }
        Ok(Self {
            name,
            attributes,
            children: BTreeMap::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, node: Node) {
        let entry = match self.children.remove(&name) {
            Some(existing) => existing.push(node),
            None => Child::Single(node),
        };
        self.children.insert(name, entry);
    }

    fn finish(self) -> (String, Node) {
        if self.attributes.is_empty() && self.children.is_empty() {
            let text = self.text.trim().to_string();
            return (self.name, Node::Leaf(text));
        }
        let element = Element {
            attributes: self.attributes,
            children: self.children,
        };
        (self.name, Node::Element(element))
    }
}

fn xml_error(position: u64, err: impl std::fmt::Display) -> LattesError {
    LattesError::Xml {
        position,
        message: err.to_string(),
    }
}

fn attach(stack: &mut [Builder], root: &mut Option<Node>, name: String, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.add_child(name, node);
        return Ok(());
    }
    if root.is_some() {
        return Err(LattesError::Structure(format!(
            "second root element <{}>",
            name
        )));
    }
    *root = Some(node);
    Ok(())
}

/// Parses CV XML into a [`Node`]. The root element's own tag is dropped:
/// the returned node holds its attributes and sections.
pub fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Builder> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Builder::open(&e, position)?),
            Ok(Event::Empty(e)) => {
                let (name, node) = Builder::open(&e, position)?.finish();
                attach(&mut stack, &mut root, name, node)?;
            }
            Ok(Event::End(_)) => {
                let builder = stack
                    .pop()
                    .ok_or_else(|| LattesError::Structure("unbalanced end tag".to_string()))?;
                let (name, node) = builder.finish();
                attach(&mut stack, &mut root, name, node)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| xml_error(position, e))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(reader.buffer_position() as u64, e)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(LattesError::Structure(format!(
            "element <{}> is never closed",
            open.name
        )));
    }
    root.ok_or_else(|| LattesError::Structure("document has no root element".to_string()))
}

// ── JSON rendering ──────────────────────────────────────────────────────

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(text) => serializer.serialize_str(text),
            Node::Element(element) => element.serialize(serializer),
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let has_attributes = !self.attributes.is_empty();
        let len = self.children.len() + usize::from(has_attributes);
        let mut map = serializer.serialize_map(Some(len))?;
        if has_attributes {
            map.serialize_entry(ATTRIBUTES_KEY, &self.attributes)?;
        }
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

impl Serialize for Child {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Child::Single(node) => node.serialize(serializer),
            Child::Many(nodes) => nodes.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Node {
        parse_document(xml).unwrap()
    }

    #[test]
    fn text_only_element_becomes_leaf() {
        let doc = parse("<CV><NOME>  Maria da Silva  </NOME></CV>");
        assert_eq!(
            doc.child("NOME"),
            Some(&Child::Single(Node::Leaf("Maria da Silva".to_string())))
        );
    }

    #[test]
    fn empty_element_becomes_empty_leaf() {
        let doc = parse("<CV><VAZIO/></CV>");
        assert_eq!(
            doc.child("VAZIO"),
            Some(&Child::Single(Node::Leaf(String::new())))
        );
    }

    #[test]
    fn single_occurrence_is_not_wrapped() {
        let doc = parse(r#"<CV><AUTORES ORDEM-DE-AUTORIA="1"/></CV>"#);
        match doc.child("AUTORES") {
            Some(Child::Single(node)) => assert_eq!(node.attr("ORDEM-DE-AUTORIA"), Some("1")),
            other => panic!("expected single child, got {:?}", other),
        }
    }

    #[test]
    fn repeated_tags_keep_document_order() {
        let doc = parse(
            r#"<CV>
                <AUTORES ORDEM-DE-AUTORIA="3"/>
                <OUTRO/>
                <AUTORES ORDEM-DE-AUTORIA="1"/>
                <AUTORES ORDEM-DE-AUTORIA="2"/>
            </CV>"#,
        );
        let authors = doc.child("AUTORES").unwrap();
        assert!(matches!(authors, Child::Many(_)));
        let orders: Vec<_> = authors
            .nodes()
            .iter()
            .map(|n| n.attr("ORDEM-DE-AUTORIA").unwrap())
            .collect();
        assert_eq!(orders, vec!["3", "1", "2"]);
    }

    #[test]
    fn root_attributes_are_kept_and_root_tag_dropped() {
        let doc = parse(r#"<CURRICULO-VITAE NUMERO-IDENTIFICADOR="123"><DADOS-GERAIS/></CURRICULO-VITAE>"#);
        assert_eq!(doc.attr("NUMERO-IDENTIFICADOR"), Some("123"));
        assert!(doc.child("DADOS-GERAIS").is_some());
        assert!(doc.child("CURRICULO-VITAE").is_none());
    }

    #[test]
    fn attribute_entities_are_unescaped() {
        let doc = parse(r#"<CV><R T="P&amp;D &lt;x&gt;"/></CV>"#);
        assert_eq!(doc.text_at("R.@attributes.T"), Some("P&D <x>"));
    }

    #[test]
    fn lookup_resolves_terminal_values() {
        let doc = parse(
            r#"<CV><DADOS-GERAIS><RESUMO-CV TEXTO-RESUMO-CV-RH="Resumo"/></DADOS-GERAIS></CV>"#,
        );
        assert_eq!(
            doc.text_at("DADOS-GERAIS.RESUMO-CV.@attributes.TEXTO-RESUMO-CV-RH"),
            Some("Resumo")
        );
        let node = doc.lookup("DADOS-GERAIS.RESUMO-CV").unwrap();
        assert!(matches!(node, Lookup::Node(n) if n.attr("TEXTO-RESUMO-CV-RH") == Some("Resumo")));
    }

    #[test]
    fn lookup_returns_default_for_missing_segments() {
        let doc = parse(r#"<CV><A><B X="1"/></A><L>texto</L></CV>"#);
        assert_eq!(doc.lookup("A.C.D"), None);
        assert_eq!(doc.lookup("Z"), None);
        // descending through a leaf or an attribute value
        assert_eq!(doc.lookup("L.X"), None);
        assert_eq!(doc.lookup("A.B.@attributes.X.Y"), None);
        // element without attributes
        assert_eq!(doc.lookup("A.@attributes"), None);
        assert_eq!(doc.lookup_or("A.C", Lookup::Text("padrão")), Lookup::Text("padrão"));
    }

    #[test]
    fn lookup_does_not_descend_into_lists() {
        let doc = parse(r#"<CV><A><B X="1"/><B X="2"/></A></CV>"#);
        assert_eq!(doc.nodes_at("A.B").map(<[Node]>::len), Some(2));
        assert_eq!(doc.lookup("A.B.@attributes"), None);
    }

    #[test]
    fn field_reads_attributes_or_leaf_children() {
        let with_attrs = parse(r#"<CV><P NOME="Ana"/></CV>"#);
        let without_attrs = parse("<CV><P><NOME>Ana</NOME></P></CV>");
        let a = &with_attrs.nodes_at("P").unwrap()[0];
        let b = &without_attrs.nodes_at("P").unwrap()[0];
        assert_eq!(a.field("NOME"), Some("Ana"));
        assert_eq!(b.field("NOME"), Some("Ana"));
        assert_eq!(b.field("OUTRO"), None);
    }

    #[test]
    fn serializes_with_attributes_key_and_lists() {
        let doc = parse(r#"<CV V="1"><A X="a"/><A X="b"/><T>texto</T></CV>"#);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "@attributes": {"V": "1"},
                "A": [{"@attributes": {"X": "a"}}, {"@attributes": {"X": "b"}}],
                "T": "texto"
            })
        );
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            parse_document("<CV><A></B></CV>"),
            Err(LattesError::Xml { .. })
        ));
        assert!(parse_document("<CV><A>").is_err());
        assert!(matches!(
            parse_document("   "),
            Err(LattesError::Structure(_))
        ));
    }
}
