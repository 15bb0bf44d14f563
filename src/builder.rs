use crate::{
    document::Document,
    error::Result,
    record::{CodeRecord, FieldPolicy},
};
use tracing::{debug, trace};

/// Options controlling how raw lines become records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Field-count rule applied to each line
    pub field_policy: FieldPolicy,

    /// Skip lines that are empty after stripping instead of rejecting them
    pub skip_blank_lines: bool,
}

/// Builds a document from raw lines, one `diag` element per line.
///
/// Line numbers in errors are 1-based positions in `lines`. The build
/// stops at the first malformed line and returns no partial document.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedRecord`] for the first line that does
/// not satisfy `options.field_policy`.
///
/// # Examples
///
/// ```
/// use diag_xml::{build_document, BuildOptions};
///
/// let doc = build_document(["A01\tAbdomen\n", "B02\tBrain\n"], BuildOptions::default())?;
/// assert_eq!(doc.len(), 2);
/// # Ok::<(), diag_xml::Error>(())
/// ```
pub fn build_document<I, S>(lines: I, options: BuildOptions) -> Result<Document>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut document = Document::new();
    let mut skipped = 0usize;

    for (index, line) in lines.into_iter().enumerate() {
        let raw = line.as_ref();
        let line_no = index + 1;

        if options.skip_blank_lines && raw.trim().is_empty() {
            trace!("Skipping blank line {}", line_no);
            skipped += 1;
            continue;
        }

        let record = CodeRecord::parse(line_no, raw, options.field_policy)?;
        trace!("Line {}: {} -> {:?}", line_no, record.code, record.description);
        document.push_record(&record);
    }

    debug!(
        "Built document with {} records ({} blank lines skipped)",
        document.len(),
        skipped
    );

    Ok(document)
}
