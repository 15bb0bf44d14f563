use crate::{
    builder::build_document,
    config::Config,
    document::Document,
    error::{Error, Result},
    readback::read_records,
    reader::read_lines,
    record::CodeRecord,
    writer::Writer,
};
use serde::Serialize;
use std::fs;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during a conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStats {
    /// Lines read from the input
    pub lines_read: usize,

    /// Records written as `diag` elements
    pub records: usize,

    /// Bytes of XML produced (zero on dry run)
    pub bytes_written: usize,

    /// Whether the output file was written
    pub written: bool,

    /// Whether the output was read back and checked
    pub verified: bool,

    /// Input file path
    pub input_path: String,

    /// Output file path
    pub output_path: String,

    /// Backup of the previous output, if one was made
    pub backup_path: Option<String>,

    /// Total execution time
    pub duration: Duration,

    /// Time spent reading
    pub read_duration: Duration,

    /// Time spent building the tree
    pub build_duration: Duration,

    /// Time spent writing and verifying
    pub write_duration: Duration,

    /// Completion timestamp
    pub generated_at: String,
}

impl ConversionStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║              Conversion Summary                       ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Lines Read:           {:>8}                        ║",
            self.lines_read
        );
        println!(
            "║ Records:              {:>8}                        ║",
            self.records
        );
        println!(
            "║ Bytes Written:        {:>8}                        ║",
            self.bytes_written
        );
        println!(
            "║ Verified:             {:>8}                        ║",
            if self.verified { "yes" } else { "no" }
        );
        println!("║                                                       ║");
        println!("║ Input:  {}", self.input_path);
        println!("║ Output: {}", self.output_path);
        if let Some(backup) = &self.backup_path {
            println!("║ Backup: {backup}");
        }
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Reading:          {:>8.3}s                     ║",
            self.read_duration.as_secs_f64()
        );
        println!(
            "║   - Building:         {:>8.3}s                     ║",
            self.build_duration.as_secs_f64()
        );
        println!(
            "║   - Writing:          {:>8.3}s                     ║",
            self.write_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.3}s                     ║",
            self.duration.as_secs_f64()
        );
        if !self.written {
            println!("║                                                       ║");
            println!("║ ⚠ No files were written (dry run mode)               ║");
        }
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Runs read → build → write for one input file.
pub struct Converter {
    config: Config,
    writer: Writer,
}

impl Converter {
    /// Creates a new converter with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let writer = Writer::new(&config);

        Ok(Self { config, writer })
    }

    /// Executes the conversion and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Read**: Loads the input lines
    /// 2. **Build**: Parses each line into a `diag` element
    /// 3. **Write**: Serializes the tree to the output file
    ///
    /// Any failure aborts the run; no partial document is ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing or unreadable, a line is
    /// malformed, the output cannot be written, or verification fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use diag_xml::{Config, Converter};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .input_path("codes.txt")
    ///     .output_path("codes.xml")
    ///     .build()?;
    ///
    /// let stats = Converter::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(input = %self.config.input_path.display()))]
    pub fn run(self) -> Result<ConversionStats> {
        let start_time = Instant::now();

        info!("Stage 1/3: Reading {}", self.config.input_path.display());
        let read_start = Instant::now();
        let lines = read_lines(&self.config.input_path)?;
        let read_duration = read_start.elapsed();

        info!("Stage 2/3: Building document from {} lines", lines.len());
        let build_start = Instant::now();
        let document = build_document(&lines, self.config.build_options())?;
        let build_duration = build_start.elapsed();

        let write_start = Instant::now();
        let (bytes_written, backup_path, verified) = if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
            (0, None, false)
        } else {
            info!("Stage 3/3: Writing {}", self.config.output_path.display());
            let outcome = self.writer.write(&document)?;
            if self.config.verify {
                self.verify(&document)?;
            }
            (outcome.bytes, outcome.backup, self.config.verify)
        };
        let write_duration = write_start.elapsed();

        let duration = start_time.elapsed();

        info!(
            "✓ Converted {} records in {:.3}s",
            document.len(),
            duration.as_secs_f64()
        );

        Ok(ConversionStats {
            lines_read: lines.len(),
            records: document.len(),
            bytes_written,
            written: !self.config.dry_run,
            verified,
            input_path: self.config.input_path.display().to_string(),
            output_path: self.config.output_path.display().to_string(),
            backup_path: backup_path.map(|p| p.display().to_string()),
            duration,
            read_duration,
            build_duration,
            write_duration,
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
    }

    /// Reads the written file back and compares its records to the document.
    fn verify(&self, document: &Document) -> Result<()> {
        let path = &self.config.output_path;
        let xml = fs::read_to_string(path).map_err(|e| Error::io_write(path, e))?;
        let actual = read_records(&xml)?;
        compare_records(&document.records(), &actual)?;

        debug!("Verified {} records in {}", actual.len(), path.display());
        Ok(())
    }
}

/// Checks that records read back from the output match the built ones.
fn compare_records(expected: &[CodeRecord], actual: &[CodeRecord]) -> Result<()> {
    if actual.len() != expected.len() {
        return Err(Error::verification(format!(
            "wrote {} records but read back {}",
            expected.len(),
            actual.len()
        )));
    }

    if let Some(index) = expected.iter().zip(actual).position(|(e, a)| e != a) {
        return Err(Error::verification(format!(
            "record {} differs after read-back",
            index + 1
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XmlLayout;
    use assert_fs::prelude::*;

    const SCENARIO: &str = "A01\tAbdomen\nB02\tBrain, stereotactic\n";

    fn create_test_config(root: &std::path::Path) -> Config {
        Config::builder()
            .input_path(root.join("codes.txt"))
            .output_path(root.join("codes.xml"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_converter_concrete_scenario() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt").write_str(SCENARIO).unwrap();

        let stats = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let xml = fs::read_to_string(temp.child("codes.xml").path()).unwrap();
        assert_eq!(
            xml,
            "<?xml version='1.0' encoding='utf-8'?>\n\
             <root><diag><name>A01</name><desc>Abdomen</desc></diag>\
             <diag><name>B02</name><desc>Brain, stereotactic</desc></diag></root>"
        );
        assert_eq!(stats.records, 2);
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.bytes_written, xml.len());
        assert!(stats.written);
    }

    #[test]
    fn test_converter_lone_carriage_return_endings() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt")
            .write_str("A01\tAbdomen\rB02\tBrain\r")
            .unwrap();

        let stats = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let xml = fs::read_to_string(temp.child("codes.xml").path()).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(
            read_records(&xml).unwrap(),
            vec![CodeRecord::new("A01", "Abdomen"), CodeRecord::new("B02", "Brain")]
        );
    }

    #[test]
    fn test_converter_empty_input() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt").touch().unwrap();

        let stats = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let xml = fs::read_to_string(temp.child("codes.xml").path()).unwrap();
        assert_eq!(xml, "<?xml version='1.0' encoding='utf-8'?>\n<root />");
        assert_eq!(stats.records, 0);
    }

    #[test]
    fn test_converter_escaping_round_trip() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt")
            .write_str("R&D\tLeft < right > center & more\n")
            .unwrap();

        Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let xml = fs::read_to_string(temp.child("codes.xml").path()).unwrap();
        assert!(xml.contains("<desc>Left &lt; right &gt; center &amp; more</desc>"));

        let records = read_records(&xml).unwrap();
        assert_eq!(records[0].code, "R&D");
        assert_eq!(records[0].description, "Left < right > center & more");
    }

    #[test]
    fn test_converter_missing_input() {
        let temp = assert_fs::TempDir::new().unwrap();

        let err = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap_err();

        assert!(err.is_input_not_found());
        assert!(!temp.child("codes.xml").exists());
    }

    #[test]
    fn test_converter_malformed_line_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt")
            .write_str("A01\tAbdomen\nB02 Brain\n")
            .unwrap();

        let err = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap_err();

        assert!(err.is_malformed());
        assert!(!temp.child("codes.xml").exists());
    }

    #[test]
    fn test_converter_malformed_line_leaves_existing_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt")
            .write_str("A01\tAbdomen\textra\n")
            .unwrap();
        temp.child("codes.xml").write_str("previous").unwrap();

        let result = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run();

        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(temp.child("codes.xml").path()).unwrap(),
            "previous"
        );
    }

    #[test]
    fn test_converter_dry_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt").write_str(SCENARIO).unwrap();

        let config = Config::builder()
            .input_path(temp.path().join("codes.txt"))
            .output_path(temp.path().join("out").join("codes.xml"))
            .dry_run(true)
            .build()
            .unwrap();

        let stats = Converter::new(config).unwrap().run().unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes_written, 0);
        assert!(!stats.written);
        assert!(!temp.child("out").exists());
    }

    #[test]
    fn test_converter_verify_indented() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt").write_str(SCENARIO).unwrap();

        let config = Config::builder()
            .input_path(temp.path().join("codes.txt"))
            .output_path(temp.path().join("codes.xml"))
            .layout(XmlLayout::Indented(2))
            .verify(true)
            .build()
            .unwrap();

        let stats = Converter::new(config).unwrap().run().unwrap();

        assert!(stats.verified);
        let xml = fs::read_to_string(temp.child("codes.xml").path()).unwrap();
        assert!(xml.contains("\n  <diag>\n    <name>A01</name>"));
    }

    #[test]
    fn test_stats_serialize() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("codes.txt").write_str(SCENARIO).unwrap();

        let stats = Converter::new(create_test_config(temp.path()))
            .unwrap()
            .run()
            .unwrap();

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["records"], 2);
        assert_eq!(json["written"], true);
    }

    #[test]
    fn test_compare_records_count_mismatch() {
        let expected = vec![CodeRecord::new("A01", "Abdomen"), CodeRecord::new("B02", "Brain")];
        let actual = vec![CodeRecord::new("A01", "Abdomen")];

        let err = compare_records(&expected, &actual).unwrap_err();

        assert!(matches!(err, Error::Verification { .. }));
        assert!(err.to_string().contains("wrote 2 records but read back 1"));
    }

    #[test]
    fn test_compare_records_content_mismatch() {
        let expected = vec![CodeRecord::new("A01", "Abdomen"), CodeRecord::new("B02", "Brain")];
        let actual = vec![CodeRecord::new("A01", "Abdomen"), CodeRecord::new("B02", "Bone")];

        let err = compare_records(&expected, &actual).unwrap_err();

        assert!(matches!(err, Error::Verification { .. }));
        assert!(err.to_string().contains("record 2 differs"));
    }

    #[test]
    fn test_compare_records_match() {
        let records = vec![CodeRecord::new("A01", "Abdomen")];
        assert!(compare_records(&records, &records).is_ok());
    }
}
