//! Identity of a harvested section and where it lives on disk.
//!
//! A section is addressed by `(version, work short code, section number)` and
//! stored at `{root}/{version}/{work}/{section}.json`. Catalog entries carry a
//! long-form slug; [`WorkMapping`] turns a slug into the short code used for
//! storage, honouring per-source overrides and split entries.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogEntry, Testament};

/// File extension of persisted content records.
pub const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("no short code for work slug {slug:?}")]
    UnknownSlug { slug: String },
    #[error("path {path:?} is not under the storage root")]
    OutsideRoot { path: PathBuf },
    #[error("path {path:?} is not of the form version/work/section.json")]
    Malformed { path: PathBuf },
    #[error("split of {slug:?} into {short_code:?} has an empty section range {first}..={last}")]
    EmptySplit {
        slug: String,
        short_code: String,
        first: u32,
        last: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionAddress {
    pub version: String,
    pub work: String,
    pub section: u32,
}

impl SectionAddress {
    pub fn new(version: impl Into<String>, work: impl Into<String>, section: u32) -> Self {
        Self {
            version: version.into(),
            work: work.into(),
            section,
        }
    }
}

impl std::fmt::Display for SectionAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.version, self.work, self.section)
    }
}

/// Maps section addresses to storage paths under a root directory and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressScheme {
    root: PathBuf,
}

impl AddressScheme {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locate(&self, address: &SectionAddress) -> PathBuf {
        self.root
            .join(&address.version)
            .join(&address.work)
            .join(format!("{}.{RECORD_EXTENSION}", address.section))
    }

    /// Inverse of [`AddressScheme::locate`]. The path must sit exactly three
    /// levels below the root and name a positive section number.
    pub fn resolve(&self, path: &Path) -> Result<SectionAddress, AddressError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| AddressError::OutsideRoot {
                path: path.to_path_buf(),
            })?;
        let malformed = || AddressError::Malformed {
            path: path.to_path_buf(),
        };

        let parts = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => part.to_str().ok_or_else(malformed),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [version, work, file] = parts.as_slice() else {
            return Err(malformed());
        };

        let stem = file
            .strip_suffix(RECORD_EXTENSION)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(malformed)?;
        let section = stem
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0 && n.to_string() == stem)
            .ok_or_else(malformed)?;

        Ok(SectionAddress::new(*version, *work, section))
    }
}

/// Project-wide slug to short-code table; lookups work in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCodeTable {
    by_slug: BTreeMap<String, String>,
}

impl ShortCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slug: impl Into<String>, short_code: impl Into<String>) {
        self.by_slug.insert(slug.into(), short_code.into());
    }

    pub fn short_code(&self, slug: &str) -> Option<&str> {
        self.by_slug.get(slug).map(String::as_str)
    }

    /// Reverse lookup. Several slugs may share a short code; the
    /// lexicographically first one wins.
    pub fn slug(&self, short_code: &str) -> Option<&str> {
        self.by_slug
            .iter()
            .find(|(_, code)| code.as_str() == short_code)
            .map(|(slug, _)| slug.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}

impl<S: Into<String>, C: Into<String>> FromIterator<(S, C)> for ShortCodeTable {
    fn from_iter<I: IntoIterator<Item = (S, C)>>(iter: I) -> Self {
        Self {
            by_slug: iter
                .into_iter()
                .map(|(slug, code)| (slug.into(), code.into()))
                .collect(),
        }
    }
}

/// Per-source deviations from the project tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeOverrides {
    /// slug -> short code used for storage, checked before the project table.
    #[serde(default)]
    pub short_codes: BTreeMap<String, String>,
    /// slug -> identifier the source expects in its requests.
    #[serde(default)]
    pub source_ids: BTreeMap<String, String>,
}

/// One destination of a catalog entry that the source serves as a single
/// work but the corpus stores as several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDestination {
    pub short_code: String,
    pub title: Option<String>,
    /// Stores into this version instead of the harvesting version.
    #[serde(default)]
    pub version: Option<String>,
    pub first_section: u32,
    pub last_section: u32,
}

/// Where a section is requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLocator {
    pub version: String,
    pub work_id: String,
    pub section: u32,
    pub testament: Option<Testament>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSection {
    pub locator: SectionLocator,
    pub address: SectionAddress,
}

/// The ordered section sequence of one destination work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPlan {
    pub title: String,
    pub short_code: String,
    pub sections: Vec<PlannedSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkMapping {
    pub short_codes: ShortCodeTable,
    pub overrides: CodeOverrides,
    pub splits: BTreeMap<String, Vec<SplitDestination>>,
}

impl WorkMapping {
    pub fn new(short_codes: ShortCodeTable) -> Self {
        Self {
            short_codes,
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: CodeOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_splits(mut self, splits: BTreeMap<String, Vec<SplitDestination>>) -> Self {
        self.splits = splits;
        self
    }

    pub fn short_code(&self, slug: &str) -> Result<&str, AddressError> {
        self.overrides
            .short_codes
            .get(slug)
            .map(String::as_str)
            .or_else(|| self.short_codes.short_code(slug))
            .ok_or_else(|| AddressError::UnknownSlug {
                slug: slug.to_string(),
            })
    }

    pub fn source_id<'a>(&'a self, slug: &'a str) -> &'a str {
        self.overrides
            .source_ids
            .get(slug)
            .map(String::as_str)
            .unwrap_or(slug)
    }

    /// Expands a catalog entry into the works it is stored as.
    ///
    /// `storage_version` names the directory records land in and
    /// `source_version` the version identifier the source is asked for.
    pub fn plan(
        &self,
        storage_version: &str,
        source_version: &str,
        entry: &CatalogEntry,
    ) -> Result<Vec<WorkPlan>, AddressError> {
        let work_id = self.source_id(&entry.slug).to_string();
        let locator = |section| SectionLocator {
            version: source_version.to_string(),
            work_id: work_id.clone(),
            section,
            testament: entry.testament,
        };

        let Some(destinations) = self.splits.get(&entry.slug) else {
            let short_code = self.short_code(&entry.slug)?.to_string();
            let sections = (1..=entry.sections)
                .map(|section| PlannedSection {
                    locator: locator(section),
                    address: SectionAddress::new(storage_version, short_code.as_str(), section),
                })
                .collect();
            return Ok(vec![WorkPlan {
                title: entry.title.clone(),
                short_code,
                sections,
            }]);
        };

        destinations
            .iter()
            .map(|dest| {
                let last = dest.last_section.min(entry.sections);
                if dest.first_section == 0 || dest.first_section > last {
                    return Err(AddressError::EmptySplit {
                        slug: entry.slug.clone(),
                        short_code: dest.short_code.clone(),
                        first: dest.first_section,
                        last: dest.last_section,
                    });
                }
                let version = dest.version.as_deref().unwrap_or(storage_version);
                let sections = (dest.first_section..=last)
                    .map(|section| PlannedSection {
                        locator: locator(section),
                        address: SectionAddress::new(
                            version,
                            dest.short_code.as_str(),
                            section - dest.first_section + 1,
                        ),
                    })
                    .collect();
                Ok(WorkPlan {
                    title: dest.title.clone().unwrap_or_else(|| entry.title.clone()),
                    short_code: dest.short_code.clone(),
                    sections,
                })
            })
            .collect()
    }
}
