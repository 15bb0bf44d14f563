use crate::{
    config::Config,
    document::{Document, XmlLayout},
    error::{Error, Result},
};
use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info, warn};

/// Result of writing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WriteOutcome {
    /// Number of bytes written
    pub bytes: usize,

    /// Backup created for a previous output, if any
    pub backup: Option<PathBuf>,
}

/// Writes documents to the output file with atomic operations.
pub(crate) struct Writer {
    output_path: PathBuf,
    layout: XmlLayout,
    backup_existing: bool,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_path: config.output_path.clone(),
            layout: config.layout,
            backup_existing: config.backup_existing,
        }
    }

    /// Serializes the document and writes it to the output path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Serialization fails
    /// - File write operations fail
    pub(crate) fn write(&self, document: &Document) -> Result<WriteOutcome> {
        let mut content = Vec::new();
        document.write_xml(&mut content, self.layout)?;

        if let Some(parent) = self
            .output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|e| Error::io_write(parent, e))?;
        }

        let backup = if self.backup_existing && self.output_path.exists() {
            Some(self.backup_file(&self.output_path)?)
        } else {
            None
        };

        self.write_file_atomic(&self.output_path, &content)?;

        info!(
            "Wrote {} records ({} bytes) to {}",
            document.len(),
            content.len(),
            self.output_path.display()
        );

        Ok(WriteOutcome {
            bytes: content.len(),
            backup,
        })
    }

    /// Writes a file atomically.
    ///
    /// # Process
    ///
    /// 1. Writes content to a temporary sibling file
    /// 2. Syncs the temporary file to disk
    /// 3. Atomically renames the temporary file to the target path
    ///
    /// The target is either left untouched or fully replaced.
    fn write_file_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        let temp_path = temp_path_for(path)?;

        let result = Self::write_temp(&temp_path, content)
            .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io_write(path, e)));

        if result.is_err() && temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!("Failed to remove {}: {}", temp_path.display(), e);
            }
        }

        result
    }

    fn write_temp(temp_path: &Path, content: &[u8]) -> Result<()> {
        let mut temp_file =
            fs::File::create(temp_path).map_err(|e| Error::io_write(temp_path, e))?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io_write(temp_path, e))?;

        // Ensure data is flushed to disk
        temp_file
            .sync_all()
            .map_err(|e| Error::io_write(temp_path, e))
    }

    /// Creates a timestamped backup of an existing file.
    fn backup_file(&self, path: &Path) -> Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| Error::config(format!("system clock before epoch: {e}")))?
            .as_nanos();

        let mut backup_name = file_name(path)?;
        backup_name.push(format!(".backup.{timestamp}"));
        let backup_path = path.with_file_name(backup_name);

        fs::copy(path, &backup_path).map_err(|e| Error::io_write(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(backup_path)
    }
}

fn file_name(path: &Path) -> Result<OsString> {
    path.file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::config(format!("Invalid output path: {}", path.display())))
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let mut name = file_name(path)?;
    name.push(".tmp");
    Ok(path.with_file_name(name))
}
