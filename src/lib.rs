//! # diag-xml
//!
//! Converts tab-delimited diagnostic code lists into XML documents.
//!
//! Each input line `CODE<TAB>DESCRIPTION` becomes one element:
//!
//! ```text
//! <?xml version='1.0' encoding='utf-8'?>
//! <root><diag><name>A01</name><desc>Abdomen</desc></diag></root>
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use diag_xml::{Config, Converter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .input_path("./codes.txt")
//!     .output_path("./codes.xml")
//!     .build()?;
//!
//! Converter::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! A conversion is a single linear pass:
//! 1. **Reader**: Loads the input file as ordered lines
//! 2. **Builder**: Parses each line into a record and appends a `diag` element
//! 3. **Writer**: Serializes the tree and atomically replaces the output file
//!
//! Any malformed line aborts the whole conversion before the output is touched.
//!
//! Converted files can be loaded back with [`load_records`] and queried with
//! [`search`], which keeps records containing every query word.

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod builder;
mod config;
mod converter;
mod document;
mod error;
mod readback;
mod reader;
mod record;
mod search;
mod writer;

pub use builder::{BuildOptions, build_document};
pub use config::{Config, ConfigBuilder, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
pub use converter::{ConversionStats, Converter};
pub use document::{Document, Element, XmlLayout};
pub use error::{Error, Result};
pub use readback::{load_records, read_records};
pub use reader::read_lines;
pub use record::{CodeRecord, FieldPolicy};
pub use search::{Category, DEFAULT_SEARCH_LIMIT, is_match, search, search_terms};

/// Runs a complete conversion with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The input file doesn't exist or is unreadable
/// - A line does not hold exactly one code and one description
/// - The output file cannot be written
///
/// # Examples
///
/// ```no_run
/// use diag_xml::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .input_path("codes.txt")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<ConversionStats> {
    Converter::new(config)?.run()
}
