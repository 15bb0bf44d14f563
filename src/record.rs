use crate::error::{Error, Result};
use serde::Serialize;

const FIELD_SEPARATOR: u8 = b'\t';

/// How a line with more than one tab is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Exactly two tab-separated fields; anything else is malformed.
    #[default]
    Strict,
    /// Two or more fields; everything after the first tab is the description.
    JoinTrailing,
}

/// A parsed (code, description) pair from one input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRecord {
    /// Diagnostic code, e.g. `A01`
    pub code: String,

    /// Human-readable description
    pub description: String,
}

impl CodeRecord {
    /// Creates a record from its two fields.
    #[must_use]
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Parses one raw line.
    ///
    /// The line is stripped of surrounding whitespace (including its
    /// terminator) before it is split on tab, and each field is stripped
    /// again afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] carrying `line_no` if the field
    /// count does not satisfy `policy`.
    pub fn parse(line_no: usize, raw: &str, policy: FieldPolicy) -> Result<Self> {
        let stripped = raw.trim();
        let fields = memchr::memchr_iter(FIELD_SEPARATOR, stripped.as_bytes()).count() + 1;

        let accepted = match policy {
            FieldPolicy::Strict => fields == 2,
            FieldPolicy::JoinTrailing => fields >= 2,
        };

        let split = if accepted {
            stripped.split_once(char::from(FIELD_SEPARATOR))
        } else {
            None
        };

        let Some((code, description)) = split else {
            return Err(Error::malformed(
                line_no,
                raw.trim_end_matches(['\r', '\n']),
                fields,
            ));
        };

        Ok(Self::new(code.trim(), description.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let record = CodeRecord::parse(1, "A01\tAbdomen\n", FieldPolicy::Strict).unwrap();
        assert_eq!(record, CodeRecord::new("A01", "Abdomen"));
    }

    #[test]
    fn test_parse_strips_fields() {
        let record =
            CodeRecord::parse(1, "  B02 \t Brain, stereotactic  \r\n", FieldPolicy::Strict)
                .unwrap();
        assert_eq!(record.code, "B02");
        assert_eq!(record.description, "Brain, stereotactic");
    }

    #[test]
    fn test_parse_trailing_tab_is_stripped() {
        let record = CodeRecord::parse(1, "A01\tAbdomen\t\n", FieldPolicy::Strict).unwrap();
        assert_eq!(record.description, "Abdomen");
    }

    #[test]
    fn test_parse_no_tab_is_malformed() {
        let err = CodeRecord::parse(4, "A01 Abdomen\n", FieldPolicy::Strict).unwrap_err();
        match err {
            Error::MalformedRecord {
                line,
                content,
                fields,
            } => {
                assert_eq!(line, 4);
                assert_eq!(content, "A01 Abdomen");
                assert_eq!(fields, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_extra_tab_is_malformed_when_strict() {
        let err = CodeRecord::parse(2, "A01\tAbdomen\tupper\n", FieldPolicy::Strict).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_parse_blank_line_is_malformed() {
        let err = CodeRecord::parse(7, "\n", FieldPolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_join_trailing_keeps_inner_tabs() {
        let record =
            CodeRecord::parse(1, "A01\tAbdomen\tupper\n", FieldPolicy::JoinTrailing).unwrap();
        assert_eq!(record.code, "A01");
        assert_eq!(record.description, "Abdomen\tupper");
    }

    #[test]
    fn test_join_trailing_still_needs_a_tab() {
        let result = CodeRecord::parse(1, "A01", FieldPolicy::JoinTrailing);
        assert!(result.is_err());
    }
}
