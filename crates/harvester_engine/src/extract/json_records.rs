use harvester_core::{Extraction, SubUnits};
use serde::Deserialize;
use serde_json::Value;

use super::json_versicles::json_key;
use super::text::collapse_whitespace;
use super::{ExtractError, Extractor};

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Vec<VerseRecord>,
}

#[derive(Debug, Deserialize)]
struct VerseRecord {
    verse_number: Value,
    #[serde(default)]
    verse_content: Option<String>,
    #[serde(default)]
    verse_title: Option<String>,
}

/// `{"data":[{"verse_number":..,"verse_content":..,"verse_title":..}]}`,
/// one record per verse with an optional heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVerseRecordExtractor;

impl Extractor for JsonVerseRecordExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let response: Response = serde_json::from_str(document)
            .map_err(|err| ExtractError::Malformed(err.to_string()))?;

        let mut content = SubUnits::new();
        let mut titles = SubUnits::new();
        for record in &response.data {
            let Some(key) = json_key(&record.verse_number) else {
                continue;
            };
            let text = collapse_whitespace(record.verse_content.as_deref().unwrap_or_default());
            if text.is_empty() {
                continue;
            }
            if let Some(title) = record.verse_title.as_deref().map(collapse_whitespace) {
                if !title.is_empty() {
                    titles.insert(key.clone(), title);
                }
            }
            content.insert(key, text);
        }
        Ok(Extraction::new(content).with_titles(titles))
    }
}
