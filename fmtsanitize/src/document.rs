//! A minimal owned XML tree for Android values resources.
//!
//! Nodes keep the source markup they were parsed from, so writing an
//! untouched document back produces the same bytes: a leading BOM and the
//! XML declaration are emitted only if the source had them, and indentation,
//! comments, attribute quoting and whitespace inside end tags are left as
//! they were.

use quick_xml::{
    Reader, Writer,
    escape::partial_escape,
    events::{BytesCData, BytesStart, BytesText, Event},
};
use std::io::Write;

use crate::error::Error;

const BOM: &str = "\u{feff}";

/// Deepest element nesting accepted by [`Document::parse`].
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(BytesText<'static>),
    CData(BytesCData<'static>),
    /// Declaration, comment, processing instruction or doctype.
    Other { event: Event<'static>, raw: String },
}

#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    /// Source text of the end tag; `None` for self-closing elements.
    end: Option<String>,
}

impl Element {
    fn new(start: BytesStart<'static>) -> Self {
        Element {
            start,
            children: Vec::new(),
            end: None,
        }
    }

    /// Qualified element name, including any namespace prefix.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(self.start.name().as_ref()).into_owned()
    }

    /// Returns the unescaped value of the attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .find(|attr| attr.key.as_ref() == key.as_bytes())
            .and_then(|attr| attr.unescape_value().ok())
            .map(|value| value.into_owned())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn is_self_closing(&self) -> bool {
        self.end.is_none()
    }

    /// Concatenated text of all descendants.
    ///
    /// Entities in text nodes are resolved, CDATA is taken literally, nested
    /// elements are flattened and comments are skipped.
    pub fn text_content(&self) -> Result<String, Error> {
        let mut out = String::new();
        collect_text(&self.children, &mut out)?;
        Ok(out)
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        let escaped = partial_escape(text).into_owned();
        self.children = vec![Node::Text(BytesText::from_escaped(escaped))];
        if self.end.is_none() {
            self.end = Some(format!("</{}>", self.name()));
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) -> Result<(), Error> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.unescape()?),
            Node::CData(cdata) => out.push_str(&String::from_utf8_lossy(cdata)),
            Node::Element(element) => collect_text(&element.children, out)?,
            Node::Other { .. } => {}
        }
    }
    Ok(())
}

/// A parsed resource document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    bom: bool,
    nodes: Vec<Node>,
}

impl Document {
    /// Parses `xml` into a tree.
    ///
    /// Fails on any XML syntax error, on unbalanced or unclosed elements and
    /// on elements nested deeper than [`MAX_DEPTH`].
    pub fn parse(xml: &str) -> Result<Self, Error> {
        let (bom, xml) = match xml.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, xml),
        };
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut nodes = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let raw = || {
                let after = reader.buffer_position() as usize;
                xml.get(before..after).map(str::to_owned).ok_or_else(|| {
                    Error::malformed(format!("markup at byte {} is not on a char boundary", before))
                })
            };
            let node = match event {
                Event::Start(start) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::malformed(format!(
                            "nesting too deep (more than {} elements)",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(Element::new(start.into_owned()));
                    continue;
                }
                Event::End(_) => {
                    let end = raw()?;
                    let mut element = stack.pop().ok_or_else(|| {
                        Error::malformed(format!("unexpected closing tag at byte {}", before))
                    })?;
                    element.end = Some(end);
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(Element::new(start.into_owned())),
                Event::Text(text) => Node::Text(text.into_owned()),
                Event::CData(cdata) => Node::CData(cdata.into_owned()),
                Event::Eof => break,
                other => Node::Other {
                    raw: raw()?,
                    event: other.into_owned(),
                },
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::malformed(format!(
                "unclosed element <{}>",
                open.name()
            )));
        }
        Ok(Document { bom, nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    /// Whether the source started with a UTF-8 byte order mark.
    pub fn has_bom(&self) -> bool {
        self.bom
    }

    /// Whether the document starts with an `<?xml ...?>` declaration.
    pub fn has_declaration(&self) -> bool {
        self.nodes.iter().any(|node| {
            matches!(
                node,
                Node::Other {
                    event: Event::Decl(_),
                    ..
                }
            )
        })
    }

    /// Writes the document to any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new(writer);
        if self.bom {
            write_raw(&mut xml_writer, BOM)?;
        }
        for node in &self.nodes {
            write_node(&mut xml_writer, node)?;
        }
        Ok(())
    }

    /// Serializes the document to a string.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        String::from_utf8(out).map_err(|e| Error::Serialization(e.to_string()))
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), Error> {
    match node {
        Node::Element(element) => match &element.end {
            None => write_event(writer, Event::Empty(element.start.clone()))?,
            Some(end) => {
                write_event(writer, Event::Start(element.start.clone()))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                write_raw(writer, end)?;
            }
        },
        Node::Text(text) => write_event(writer, Event::Text(text.clone()))?,
        Node::CData(cdata) => write_event(writer, Event::CData(cdata.clone()))?,
        Node::Other { raw, .. } => write_raw(writer, raw)?,
    }
    Ok(())
}

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), Error> {
    writer
        .write_event(event)
        .map_err(|e| Error::Serialization(e.to_string()))
}

fn write_raw<W: Write>(writer: &mut Writer<W>, raw: &str) -> Result<(), Error> {
    writer
        .get_mut()
        .write_all(raw.as_bytes())
        .map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn first_element(document: &Document) -> &Element {
        document
            .nodes()
            .iter()
            .find_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_markup() {
        let xml = indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <!-- generated -->
            <resources xmlns:xliff="urn:oasis:names:tc:xliff:document:1.2">
                <string name="a" translatable='false'>Hello &amp; welcome</string>
                <item name="b" type="string"/>
                <string name="c"><![CDATA[<b>bold</b>]]></string>
            </resources>
        "#};
        let document = Document::parse(xml).unwrap();
        assert!(document.has_declaration());
        assert_eq!(document.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_missing_declaration_stays_missing() {
        let xml = "<resources>\n  <string name=\"a\">A</string>\n</resources>\n";
        let document = Document::parse(xml).unwrap();
        assert!(!document.has_declaration());
        assert_eq!(document.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_text_content_flattens_inline_markup() {
        let xml = indoc! {r#"
            <string name="a">Hi <xliff:g id="u">{us<b>er</b>}</xliff:g> &amp; <![CDATA[<ok>]]><!-- note --></string>
        "#};
        let document = Document::parse(xml).unwrap();
        let element = first_element(&document);
        assert_eq!(element.name(), "string");
        assert_eq!(element.text_content().unwrap(), "Hi {user} & <ok>");
    }

    #[test]
    fn test_attribute_lookup() {
        let document =
            Document::parse(r#"<item name="a &amp; b" type="string">x</item>"#).unwrap();
        let element = first_element(&document);
        assert_eq!(element.name(), "item");
        assert_eq!(element.attribute("name").as_deref(), Some("a & b"));
        assert_eq!(element.attribute("type").as_deref(), Some("string"));
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn test_set_text_replaces_children_and_escapes() {
        let mut document =
            Document::parse(r#"<string name="a">old <b>markup</b></string>"#).unwrap();
        if let Some(Node::Element(element)) = document.nodes_mut().first_mut() {
            element.set_text("%1$s & <more> \"quoted\"");
        }
        assert_eq!(
            document.to_xml().unwrap(),
            r#"<string name="a">%1$s &amp; &lt;more&gt; "quoted"</string>"#
        );
    }

    #[test]
    fn test_set_text_on_self_closing_element() {
        let mut document = Document::parse(r#"<string name="a"/>"#).unwrap();
        if let Some(Node::Element(element)) = document.nodes_mut().first_mut() {
            assert!(element.is_self_closing());
            element.set_text("x");
            assert!(!element.is_self_closing());
        }
        assert_eq!(document.to_xml().unwrap(), r#"<string name="a">x</string>"#);
    }

    #[test]
    fn test_round_trip_preserves_end_tag_whitespace_and_bom() {
        let xml = "\u{feff}<!DOCTYPE  resources>\n<resources >\n<string name=\"a\">A</string >\n</resources\n>\n";
        let document = Document::parse(xml).unwrap();
        assert!(document.has_bom());
        assert_eq!(document.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_prefixed_name_is_kept() {
        let document = Document::parse(r#"<tools:string name="a">x</tools:string>"#).unwrap();
        assert_eq!(first_element(&document).name(), "tools:string");
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        assert!(Document::parse(&at_limit).is_ok());

        let too_deep = format!("{}{}", "<a>".repeat(20_000), "</a>".repeat(20_000));
        let err = Document::parse(&too_deep).unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("nesting too deep"));
    }

    #[test]
    fn test_unclosed_element_is_rejected() {
        let err = Document::parse("<resources><string name=\"a\">x</string>").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_mismatched_end_is_rejected() {
        let err = Document::parse("<resources><string>x</item></resources>").unwrap_err();
        assert!(err.is_parse_error());
    }
}
