//! Scanning persisted records for the consistency report.

use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info, engine_warn};
use harvester_core::{AddressScheme, ContentRecord, CountTable, RECORD_EXTENSION};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("output root {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),
    #[error("walking {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

/// A record file the scan found but could not count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unreadable {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub counts: CountTable,
    pub unreadable: Vec<Unreadable>,
}

/// Counts the sub-units of every record below `root`. Files that are not
/// records are ignored; records that do not parse are reported, not fatal.
pub fn scan(root: &Path) -> Result<ScanOutcome, VerifyError> {
    if !root.is_dir() {
        return Err(VerifyError::MissingRoot(root.to_path_buf()));
    }
    let scheme = AddressScheme::new(root);
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root).min_depth(3).max_depth(3).sort_by_file_name() {
        let entry = entry.map_err(|source| VerifyError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION)
        {
            continue;
        }

        let address = match scheme.resolve(path) {
            Ok(address) => address,
            Err(err) => {
                engine_debug!("ignoring {}: {err}", path.display());
                continue;
            }
        };
        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|raw| ContentRecord::from_json(&raw).map_err(|err| err.to_string()));
        match parsed {
            Ok(record) => outcome.counts.insert(&address, record.content.len()),
            Err(reason) => {
                engine_warn!("unreadable record {}: {reason}", path.display());
                outcome.unreadable.push(Unreadable {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
    }

    engine_info!(
        "scanned {} section(s) across {} version(s), {} unreadable",
        outcome.counts.len(),
        outcome.counts.versions().count(),
        outcome.unreadable.len()
    );
    Ok(outcome)
}
