use crate::builder::BuildOptions;
use crate::document::XmlLayout;
use crate::error::{Error, Result};
use crate::record::FieldPolicy;
use std::path::PathBuf;

/// Input path used when none is given.
pub const DEFAULT_INPUT_PATH: &str = "./convert_to_xml/imrt_codes.txt";
/// Output path used when none is given.
pub const DEFAULT_OUTPUT_PATH: &str = "imrt_codes.xml";

const MAX_INDENT: usize = 16;

/// Configuration for a single conversion.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Tab-delimited source file
    pub input_path: PathBuf,

    /// Destination XML file
    pub output_path: PathBuf,

    /// Whitespace layout of the written XML
    pub layout: XmlLayout,

    /// Field-count rule for each line
    pub field_policy: FieldPolicy,

    /// Skip blank lines instead of rejecting them
    pub skip_blank_lines: bool,

    /// Create backups of an existing output file
    pub backup_existing: bool,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// Read the output back after writing and compare records
    pub verify: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use diag_xml::Config;
    ///
    /// let config = Config::builder()
    ///     .input_path("codes.txt")
    ///     .output_path("codes.xml")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// A missing input file is not a configuration error; it surfaces when
    /// the conversion reads it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either path is empty
    /// - Input and output refer to the same file
    /// - The indent width is unreasonably large
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::config("input path must not be empty"));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::config("output path must not be empty"));
        }

        if self.same_file() {
            return Err(Error::config(format!(
                "input and output refer to the same file: {}",
                self.input_path.display()
            )));
        }

        if let XmlLayout::Indented(width) = self.layout {
            if width > MAX_INDENT {
                return Err(Error::config(format!(
                    "indent width ({width}) must be at most {MAX_INDENT}"
                )));
            }
        }

        Ok(())
    }

    /// Returns the options passed to the tree builder.
    #[must_use]
    pub const fn build_options(&self) -> BuildOptions {
        BuildOptions {
            field_policy: self.field_policy,
            skip_blank_lines: self.skip_blank_lines,
        }
    }

    fn same_file(&self) -> bool {
        if self.input_path == self.output_path {
            return true;
        }

        match (
            self.input_path.canonicalize(),
            self.output_path.canonicalize(),
        ) {
            (Ok(input), Ok(output)) => input == output,
            _ => false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            layout: XmlLayout::Compact,
            field_policy: FieldPolicy::Strict,
            skip_blank_lines: false,
            backup_existing: false,
            dry_run: false,
            verify: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    layout: Option<XmlLayout>,
    field_policy: Option<FieldPolicy>,
    skip_blank_lines: bool,
    backup_existing: bool,
    dry_run: bool,
    verify: bool,
}

impl ConfigBuilder {
    /// Sets the tab-delimited source file.
    #[must_use]
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Sets the destination XML file.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the XML layout.
    #[must_use]
    pub fn layout(mut self, layout: XmlLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the field-count rule.
    #[must_use]
    pub fn field_policy(mut self, policy: FieldPolicy) -> Self {
        self.field_policy = Some(policy);
        self
    }

    /// Enables or disables skipping of blank lines.
    #[must_use]
    pub fn skip_blank_lines(mut self, enabled: bool) -> Self {
        self.skip_blank_lines = enabled;
        self
    }

    /// Enables or disables backup creation.
    #[must_use]
    pub fn backup_existing(mut self, enabled: bool) -> Self {
        self.backup_existing = enabled;
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables read-back verification of the written file.
    #[must_use]
    pub fn verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            layout: self.layout.unwrap_or_default(),
            field_policy: self.field_policy.unwrap_or_default(),
            skip_blank_lines: self.skip_blank_lines,
            backup_existing: self.backup_existing,
            dry_run: self.dry_run,
            verify: self.verify,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().build().unwrap();

        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.layout, XmlLayout::Compact);
        assert_eq!(config.field_policy, FieldPolicy::Strict);
        assert!(!config.backup_existing);
    }

    #[test]
    fn test_missing_input_is_not_a_config_error() {
        let result = Config::builder()
            .input_path("/nonexistent/path/that/should/not/exist.txt")
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn test_same_path_rejected() {
        let result = Config::builder()
            .input_path("codes.txt")
            .output_path("codes.txt")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_same_file_through_different_paths_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("codes.txt");
        file.touch().unwrap();

        let result = Config::builder()
            .input_path(file.path())
            .output_path(temp.path().join(".").join("codes.txt"))
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_path_rejected() {
        let result = Config::builder().output_path("").build();
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_indent_limit() {
        assert!(Config::builder().layout(XmlLayout::Indented(4)).build().is_ok());
        assert!(Config::builder().layout(XmlLayout::Indented(64)).build().is_err());
    }

    #[test]
    fn test_build_options() {
        let config = Config::builder()
            .field_policy(FieldPolicy::JoinTrailing)
            .skip_blank_lines(true)
            .build()
            .unwrap();

        let options = config.build_options();
        assert_eq!(options.field_policy, FieldPolicy::JoinTrailing);
        assert!(options.skip_blank_lines);
    }
}
