use harvester_core::{Extraction, SubUnits};
use scraper::Html;

use super::text::{collapse_whitespace, element_text};
use super::{parse_selector, ExtractError, Extractor};

/// Pages that list verses in order, labelling most of them with a
/// superscript number. The first verse carries the chapter number instead
/// and is always "1"; an unlabelled verse follows the previous one.
#[derive(Debug, Clone)]
pub struct PositionalExtractor {
    container: String,
    verse: String,
    number: String,
}

impl Default for PositionalExtractor {
    fn default() -> Self {
        Self {
            container: "#bibleText".to_string(),
            verse: "span.verse".to_string(),
            number: "sup.verseNum".to_string(),
        }
    }
}

fn strip_label(text: &str) -> String {
    let text = text.trim_start().trim_start_matches(|c: char| c.is_ascii_digit());
    collapse_whitespace(&text.replace(['*', '+'], ""))
}

impl Extractor for PositionalExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let html = Html::parse_document(document);
        let container = parse_selector(&self.container)?;
        let verse = parse_selector(&self.verse)?;
        let number = parse_selector(&self.number)?;

        let Some(body) = html.select(&container).next() else {
            return Ok(Extraction::default());
        };

        let mut content = SubUnits::new();
        for span in body.select(&verse) {
            let key = if content.is_empty() {
                "1".to_string()
            } else {
                span.select(&number)
                    .next()
                    .map(|sup| element_text(sup, ""))
                    .filter(|label| label.parse::<u32>().is_ok())
                    .unwrap_or_else(|| {
                        content
                            .last_numeric_key()
                            .map_or(1, |last| last + 1)
                            .to_string()
                    })
            };
            let text = strip_label(&element_text(span, " "));
            if !text.is_empty() {
                content.insert(key, text);
            }
        }
        Ok(Extraction::new(content))
    }
}
