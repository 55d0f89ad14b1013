use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use harvester_core::{AddressScheme, ContentRecord, SectionAddress};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("record at {path} is unreadable: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes a file by filling a temp file next to the target and renaming it
/// over, so readers see either the old content or the new, never a prefix.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// The on-disk tree of harvested sections.
#[derive(Debug, Clone)]
pub struct RecordStore {
    scheme: AddressScheme,
}

impl RecordStore {
    pub fn new(scheme: AddressScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &AddressScheme {
        &self.scheme
    }

    /// A section counts as harvested when its file exists. With `validate`
    /// the file must also parse and hold at least one sub-unit.
    pub fn is_harvested(&self, address: &SectionAddress, validate: bool) -> bool {
        let path = self.scheme.locate(address);
        if !validate {
            return path.is_file();
        }
        matches!(self.read(address), Ok(Some(record)) if !record.content.is_empty())
    }

    pub fn read(&self, address: &SectionAddress) -> Result<Option<ContentRecord>, PersistError> {
        let path = self.scheme.locate(address);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        ContentRecord::from_json(&raw)
            .map(Some)
            .map_err(|err| PersistError::Unreadable {
                path,
                message: err.to_string(),
            })
    }

    pub fn write(
        &self,
        address: &SectionAddress,
        record: &ContentRecord,
    ) -> Result<PathBuf, PersistError> {
        let path = self.scheme.locate(address);
        let (Some(dir), Some(filename)) = (path.parent(), path.file_name()) else {
            return Err(PersistError::OutputDir(format!(
                "{} has no parent directory",
                path.display()
            )));
        };
        let json = record.to_compact_json().map_err(|err| PersistError::Unreadable {
            path: path.clone(),
            message: err.to_string(),
        })?;
        AtomicFileWriter::new(dir.to_path_buf()).write(&filename.to_string_lossy(), &json)
    }
}
