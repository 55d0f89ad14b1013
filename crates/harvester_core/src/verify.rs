//! Cross-version sub-unit counts and the divergences between them.

use std::collections::{BTreeMap, BTreeSet};

use crate::SectionAddress;

/// `version -> work -> section -> sub-unit count`, as observed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: BTreeMap<String, BTreeMap<String, BTreeMap<u32, usize>>>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &SectionAddress, count: usize) {
        self.counts
            .entry(address.version.clone())
            .or_default()
            .entry(address.work.clone())
            .or_default()
            .insert(address.section, count);
    }

    pub fn get(&self, version: &str, work: &str, section: u32) -> Option<usize> {
        self.counts.get(version)?.get(work)?.get(&section).copied()
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Number of sections recorded across all versions.
    pub fn len(&self) -> usize {
        self.counts
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pairs(&self) -> BTreeSet<(&str, u32)> {
        self.counts
            .values()
            .flat_map(|works| works.iter())
            .flat_map(|(work, sections)| sections.keys().map(move |s| (work.as_str(), *s)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Count { count: usize, divergent: bool },
    Missing,
}

impl Cell {
    pub fn is_flagged(self) -> bool {
        matches!(self, Cell::Missing | Cell::Count { divergent: true, .. })
    }
}

/// One `(work, section)` row: a cell per version, in report column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceEntry {
    pub work: String,
    pub section: u32,
    /// Index into [`DivergenceReport::versions`] of the version compared against.
    pub reference: usize,
    pub cells: Vec<Cell>,
}

impl DivergenceEntry {
    pub fn reference_count(&self) -> Option<usize> {
        match self.cells.get(self.reference) {
            Some(Cell::Count { count, .. }) => Some(*count),
            _ => None,
        }
    }

    pub fn is_divergent(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_flagged())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivergenceReport {
    pub versions: Vec<String>,
    pub entries: Vec<DivergenceEntry>,
}

impl DivergenceReport {
    pub fn divergent(&self) -> impl Iterator<Item = &DivergenceEntry> {
        self.entries.iter().filter(|entry| entry.is_divergent())
    }

    pub fn is_consistent(&self) -> bool {
        self.divergent().next().is_none()
    }

    pub fn entry(&self, work: &str, section: u32) -> Option<&DivergenceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.work == work && entry.section == section)
    }

    pub fn cell(&self, work: &str, section: u32, version: &str) -> Option<Cell> {
        let column = self.versions.iter().position(|v| v == version)?;
        self.entry(work, section)?.cells.get(column).copied()
    }
}

/// Compares every observed `(work, section)` across versions.
///
/// Columns are ordered with `reference` first (when it is present in the
/// table), then lexicographically. For each row the reference is the first
/// column holding that section; every other column is flagged when its count
/// differs or the section is missing.
pub fn report(counts: &CountTable, reference: Option<&str>) -> DivergenceReport {
    let mut versions: Vec<String> = counts.versions().map(str::to_string).collect();
    if let Some(position) = reference.and_then(|r| versions.iter().position(|v| v == r)) {
        let preferred = versions.remove(position);
        versions.insert(0, preferred);
    }

    let entries = counts
        .pairs()
        .into_iter()
        .filter_map(|(work, section)| {
            let observed: Vec<Option<usize>> = versions
                .iter()
                .map(|version| counts.get(version, work, section))
                .collect();
            let reference = observed.iter().position(Option::is_some)?;
            let expected = observed[reference];
            let cells = observed
                .iter()
                .map(|count| match count {
                    Some(count) => Cell::Count {
                        count: *count,
                        divergent: Some(*count) != expected,
                    },
                    None => Cell::Missing,
                })
                .collect();
            Some(DivergenceEntry {
                work: work.to_string(),
                section,
                reference,
                cells,
            })
        })
        .collect();

    DivergenceReport { versions, entries }
}
