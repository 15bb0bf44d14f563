use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

const BOM: char = '\u{feff}';

/// Reads a text file into lines, keeping each line's terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Lines are returned in
/// file order. A leading UTF-8 byte order mark is dropped; nothing else
/// is altered.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist ([`Error::InputNotFound`])
/// - The content is not valid UTF-8 ([`Error::InvalidUtf8`])
/// - Any other read failure occurs ([`Error::Io`])
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let lines = split_lines(content.strip_prefix(BOM).unwrap_or(&content));

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Splits on universal newlines, leaving the terminator on each line.
fn split_lines(content: &str) -> Vec<String> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    while let Some(offset) = memchr::memchr2(b'\n', b'\r', &bytes[start..]) {
        let mut end = start + offset + 1;
        if bytes[end - 1] == b'\r' && bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        lines.push(content[start..end].to_owned());
        start = end;
    }

    if start < bytes.len() {
        lines.push(content[start..].to_owned());
    }

    lines
}
