//! The persisted artifact of one harvested section.
//!
//! Serialized compactly as
//! `{"meta":{"title":..,"abbrev":..},"chapter":N,"content":{..},"titles":{..}}`
//! where `titles` is omitted when empty and both maps keep insertion order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Insertion-ordered map from sub-unit key to text with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubUnits {
    entries: Vec<(String, String)>,
}

impl SubUnits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let key = key.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, text)),
            None => {
                self.entries.push((key, text));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Largest key that parses as an integer, used to number unmarked
    /// sub-units as "previous + 1".
    pub fn last_numeric_key(&self) -> Option<u32> {
        self.keys().filter_map(|k| k.parse::<u32>().ok()).max()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubUnits {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut units = SubUnits::new();
        for (k, v) in iter {
            units.insert(k, v);
        }
        units
    }
}

impl Serialize for SubUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubUnits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SubUnitsVisitor;

        impl<'de> Visitor<'de> for SubUnitsVisitor {
            type Value = SubUnits;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of sub-unit keys to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SubUnits, A::Error> {
                let mut units = SubUnits {
                    entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((key, text)) = access.next_entry::<String, String>()? {
                    if units.contains_key(&key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate sub-unit key {key:?}"
                        )));
                    }
                    units.entries.push((key, text));
                }
                Ok(units)
            }
        }

        deserializer.deserialize_map(SubUnitsVisitor)
    }
}

/// What an extractor produced for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub content: SubUnits,
    pub titles: SubUnits,
}

impl Extraction {
    pub fn new(content: SubUnits) -> Self {
        Self {
            content,
            titles: SubUnits::new(),
        }
    }

    pub fn with_titles(mut self, titles: SubUnits) -> Self {
        self.titles = titles;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub title: String,
    pub abbrev: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("section has no content")]
    EmptyContent,
    #[error("sub-unit {key:?} has empty text")]
    EmptyText { key: String },
    #[error("title for {key:?} has no matching sub-unit")]
    OrphanTitle { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub meta: RecordMeta,
    pub chapter: u32,
    pub content: SubUnits,
    #[serde(default, skip_serializing_if = "SubUnits::is_empty")]
    pub titles: SubUnits,
}

impl ContentRecord {
    /// Builds a record, refusing anything that must never reach disk.
    pub fn new(
        meta: RecordMeta,
        chapter: u32,
        extraction: Extraction,
    ) -> Result<Self, RecordError> {
        let Extraction { content, titles } = extraction;
        if content.is_empty() {
            return Err(RecordError::EmptyContent);
        }
        if let Some((key, _)) = content.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(RecordError::EmptyText {
                key: key.to_string(),
            });
        }
        if let Some(key) = titles.keys().find(|key| !content.contains_key(key)) {
            return Err(RecordError::OrphanTitle {
                key: key.to_string(),
            });
        }
        Ok(Self {
            meta,
            chapter,
            content,
            titles,
        })
    }

    /// Single-line JSON without inserted whitespace.
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
