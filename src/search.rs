//! Word search over converted code lists.

use crate::record::CodeRecord;
use tracing::debug;

/// Maximum number of matches returned when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Shortcut filters that add fixed words to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Malignant neoplasms
    Malignant,
    /// Neoplasms in situ
    InSitu,
    /// Benign neoplasms
    Benign,
    /// Personal history of neoplasm (Z codes)
    PersonalHistory,
}

impl Category {
    /// Returns the words this category adds to a query.
    #[must_use]
    pub const fn words(self) -> &'static str {
        match self {
            Self::Malignant => "malignant",
            Self::InSitu => "in situ",
            Self::Benign => "benign",
            Self::PersonalHistory => "personal history neoplasm",
        }
    }
}

/// Lowercased words a record must contain, query first then categories.
#[must_use]
pub fn search_terms(query: &str, categories: &[Category]) -> Vec<String> {
    query
        .split_whitespace()
        .chain(categories.iter().flat_map(|c| c.words().split_whitespace()))
        .map(str::to_lowercase)
        .collect()
}

/// Returns true if every term is a substring of the code or description.
///
/// Matching is case-insensitive; `terms` must already be lowercase.
#[must_use]
pub fn is_match(record: &CodeRecord, terms: &[String]) -> bool {
    let code = record.code.to_lowercase();
    let description = record.description.to_lowercase();

    terms
        .iter()
        .all(|term| code.contains(term.as_str()) || description.contains(term.as_str()))
}

/// Finds records matching all words of `query` plus the category words.
///
/// Results keep document order and stop at `limit` matches. An empty
/// query with no categories matches every record.
///
/// # Examples
///
/// ```
/// use diag_xml::{search, Category, CodeRecord};
///
/// let records = vec![
///     CodeRecord::new("C50.9", "Malignant neoplasm of breast"),
///     CodeRecord::new("D24.9", "Benign neoplasm of breast"),
/// ];
///
/// let hits = search(&records, "Breast", &[Category::Benign], 10);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].code, "D24.9");
/// ```
#[must_use]
pub fn search<'a>(
    records: &'a [CodeRecord],
    query: &str,
    categories: &[Category],
    limit: usize,
) -> Vec<&'a CodeRecord> {
    let terms = search_terms(query, categories);

    let hits: Vec<_> = records
        .iter()
        .filter(|record| is_match(record, &terms))
        .take(limit)
        .collect();

    debug!(
        "Search {:?} matched {} of {} records",
        terms,
        hits.len(),
        records.len()
    );

    hits
}
