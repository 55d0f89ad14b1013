use harvester_core::{Extraction, SubUnits};
use regex::Regex;
use scraper::Html;

use super::text::{collapse_whitespace, text_fragments};
use super::{parse_selector, ExtractError, Extractor};

/// Pages where the whole chapter is one block of text with inline
/// `N.` markers in front of each verse.
#[derive(Debug, Clone)]
pub struct VerseMarkerExtractor {
    container: String,
    excluded: String,
    marker: Regex,
}

impl VerseMarkerExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            container: "section.entry".to_string(),
            excluded: "span.html-tag".to_string(),
            marker: Regex::new(r"(\d+)\.\s*")?,
        })
    }
}

impl Extractor for VerseMarkerExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let html = Html::parse_document(document);
        let container = parse_selector(&self.container)?;
        let excluded = parse_selector(&self.excluded)?;

        let Some(entry) = html.select(&container).next() else {
            return Ok(Extraction::default());
        };
        let mut fragments = Vec::new();
        text_fragments(*entry, Some(&excluded), &mut fragments);
        let text = fragments.join(" ");

        Ok(Extraction::new(segment_by_markers(&text, &self.marker)))
    }
}

/// Splits `text` at each marker; a segment runs up to the next marker.
/// Text before the first marker is dropped, as are empty segments.
pub fn segment_by_markers(text: &str, marker: &Regex) -> SubUnits {
    let mut units = SubUnits::new();
    let captures: Vec<_> = marker.captures_iter(text).collect();
    for (i, caps) in captures.iter().enumerate() {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = captures
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let segment = collapse_whitespace(&text[whole.end()..end]);
        if !segment.is_empty() {
            units.insert(number.as_str(), segment);
        }
    }
    units
}
