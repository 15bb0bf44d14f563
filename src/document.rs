//! In-memory XML tree for converted code lists.

use crate::error::{Error, Result};
use crate::record::CodeRecord;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Tag of the document root.
pub(crate) const ROOT_TAG: &str = "root";
/// Tag of the per-record element.
pub(crate) const DIAG_TAG: &str = "diag";
/// Tag holding the record's code.
pub(crate) const NAME_TAG: &str = "name";
/// Tag holding the record's description.
pub(crate) const DESC_TAG: &str = "desc";

const DECLARATION: &str = "xml version='1.0' encoding='utf-8'";

/// Whitespace layout of serialized XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlLayout {
    /// Declaration, newline, then the whole tree on one line
    #[default]
    Compact,
    /// One element per line, indented by the given number of spaces
    Indented(usize),
}

/// A single XML element with optional text and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates an element holding only text.
    #[must_use]
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Appends a child, keeping insertion order.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Returns the tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns the first child with the given tag.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> &str {
        self.child(name).and_then(Self::text).unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }
}

/// A converted code list: a `root` element with one `diag` per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with an empty root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Element::new(ROOT_TAG),
        }
    }

    /// Appends a `diag` element for the record.
    pub fn push_record(&mut self, record: &CodeRecord) {
        let mut diag = Element::new(DIAG_TAG);
        diag.push(Element::with_text(NAME_TAG, record.code.as_str()));
        diag.push(Element::with_text(DESC_TAG, record.description.as_str()));
        self.root.push(diag);
    }

    /// Returns the root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Number of `diag` elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.children.len()
    }

    /// Returns true if the document holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Collects the records back out of the tree, in document order.
    #[must_use]
    pub fn records(&self) -> Vec<CodeRecord> {
        self.root
            .children
            .iter()
            .map(|diag| CodeRecord::new(diag.child_text(NAME_TAG), diag.child_text(DESC_TAG)))
            .collect()
    }

    /// Convert to XML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_xml_string(&self, layout: XmlLayout) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output, layout)?;
        String::from_utf8(output).map_err(|e| Error::xml(e.to_string()))
    }

    /// Write XML, declaration first, to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_xml<W: Write>(&self, writer: W, layout: XmlLayout) -> Result<()> {
        let mut xml_writer = match layout {
            XmlLayout::Compact => quick_xml::Writer::new(writer),
            XmlLayout::Indented(width) => quick_xml::Writer::new_with_indent(writer, b' ', width),
        };

        let decl = BytesDecl::from_start(BytesStart::from_content(DECLARATION, 3));
        xml_writer
            .write_event(Event::Decl(decl))
            .map_err(|e| Error::xml(e.to_string()))?;

        // Indented writers break the line themselves.
        if layout == XmlLayout::Compact {
            xml_writer
                .get_mut()
                .write_all(b"\n")
                .map_err(|e| Error::xml(e.to_string()))?;
        }

        write_element(&mut xml_writer, &self.root)
    }
}

/// Write a single element and its children.
fn write_element<W: Write>(writer: &mut quick_xml::Writer<W>, element: &Element) -> Result<()> {
    let name = element.name();

    if element.is_empty() {
        // `<tag />`, with the space before the slash
        let elem = BytesStart::from_content(format!("{name} "), name.len());
        return writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| Error::xml(e.to_string()))?;

    if let Some(text) = element.text().filter(|t| !t.is_empty()) {
        writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(|e| Error::xml(e.to_string()))?;
    }

    for child in element.children() {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::xml(e.to_string()))
}
