//! Reading converted documents back into records.

use crate::document::{DESC_TAG, DIAG_TAG, NAME_TAG};
use crate::error::{Error, Result};
use crate::record::CodeRecord;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Desc,
}

#[derive(Debug, Default)]
struct PendingDiag {
    name: Option<String>,
    desc: Option<String>,
}

impl PendingDiag {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Desc => &mut self.desc,
        }
    }

    fn finish(self, index: usize) -> Result<CodeRecord> {
        match (self.name, self.desc) {
            (Some(name), Some(desc)) => Ok(CodeRecord::new(name, desc)),
            _ => Err(Error::xml(format!(
                "diag element {index} is missing its name or desc child"
            ))),
        }
    }
}

fn field_for(tag: &[u8]) -> Option<Field> {
    match tag {
        t if t == NAME_TAG.as_bytes() => Some(Field::Name),
        t if t == DESC_TAG.as_bytes() => Some(Field::Desc),
        _ => None,
    }
}

/// Extracts every `diag` element's `name`/`desc` pair, in document order.
///
/// Text is unescaped; `diag` elements may appear at any depth.
///
/// # Errors
///
/// Returns [`Error::Xml`] if the document is not well-formed or a `diag`
/// element lacks either child.
pub fn read_records(xml: &str) -> Result<Vec<CodeRecord>> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut pending: Option<PendingDiag> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = e.name();
                if tag.as_ref() == DIAG_TAG.as_bytes() {
                    pending = Some(PendingDiag::default());
                } else if let Some(diag) = pending.as_mut() {
                    field = field_for(tag.as_ref());
                    if let Some(f) = field {
                        diag.slot(f).get_or_insert_with(String::new);
                    }
                }
            }
            Event::Empty(e) => {
                let tag = e.name();
                if let (Some(diag), Some(f)) = (pending.as_mut(), field_for(tag.as_ref())) {
                    diag.slot(f).get_or_insert_with(String::new);
                }
            }
            Event::Text(e) => {
                if let (Some(diag), Some(f)) = (pending.as_mut(), field) {
                    let text = e.unescape()?;
                    diag.slot(f).get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == DIAG_TAG.as_bytes() {
                    if let Some(diag) = pending.take() {
                        records.push(diag.finish(records.len() + 1)?);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Reads a converted XML file and extracts its records.
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] or [`Error::Io`] if the file cannot be
/// read, and [`Error::Xml`] under the same conditions as [`read_records`].
pub fn load_records(path: &Path) -> Result<Vec<CodeRecord>> {
    let xml = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    read_records(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_read_compact_document() {
        let xml = "<?xml version='1.0' encoding='utf-8'?>\n\
                   <root><diag><name>A01</name><desc>Abdomen</desc></diag>\
                   <diag><name>B02</name><desc>Brain, stereotactic</desc></diag></root>";

        let records = read_records(xml).unwrap();

        assert_eq!(
            records,
            vec![
                CodeRecord::new("A01", "Abdomen"),
                CodeRecord::new("B02", "Brain, stereotactic"),
            ]
        );
    }

    #[test]
    fn test_read_unescapes_text() {
        let xml = "<root><diag><name>X&amp;1</name><desc>a &lt; b &gt; c</desc></diag></root>";
        let records = read_records(xml).unwrap();
        assert_eq!(records, vec![CodeRecord::new("X&1", "a < b > c")]);
    }

    #[test]
    fn test_read_indented_document_ignores_layout_whitespace() {
        let xml = "<root>\n  <diag>\n    <name>A01</name>\n    <desc>Abdomen</desc>\n  </diag>\n</root>";
        let records = read_records(xml).unwrap();
        assert_eq!(records, vec![CodeRecord::new("A01", "Abdomen")]);
    }

    #[test]
    fn test_read_empty_root() {
        let records = read_records("<?xml version='1.0' encoding='utf-8'?>\n<root />").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_desc_is_an_error() {
        let err = read_records("<root><diag><name>A01</name></diag></root>").unwrap_err();
        assert!(matches!(err, Error::Xml { .. }));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(read_records("<root><diag></root>").is_err());
    }

    #[test]
    fn test_load_records_from_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("codes.xml");
        file.write_str("<?xml version='1.0' encoding='utf-8'?>\n<root><diag><name>A01</name><desc>Abdomen</desc></diag></root>")
            .unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records, vec![CodeRecord::new("A01", "Abdomen")]);
    }

    #[test]
    fn test_load_records_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = load_records(&temp.path().join("missing.xml")).unwrap_err();
        assert!(err.is_input_not_found());
    }
}
