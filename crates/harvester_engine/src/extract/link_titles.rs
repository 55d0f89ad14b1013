use harvester_core::{Extraction, SubUnits};
use scraper::Html;

use super::text::collapse_whitespace;
use super::{parse_selector, ExtractError, Extractor};

/// Pages where every verse is a link whose `title` reads "Book C:V".
#[derive(Debug, Clone)]
pub struct LinkTitleExtractor {
    paragraph: String,
    link: String,
}

impl Default for LinkTitleExtractor {
    fn default() -> Self {
        Self {
            paragraph: "p.pb-6".to_string(),
            link: "a.btn-link[title]".to_string(),
        }
    }
}

fn verse_of(title: &str) -> Option<&str> {
    let reference = title.rsplit(' ').next()?;
    let (_, verse) = reference.split_once(':')?;
    let verse = verse.trim();
    (!verse.is_empty()).then_some(verse)
}

impl Extractor for LinkTitleExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let html = Html::parse_document(document);
        let paragraph = parse_selector(&self.paragraph)?;
        let link = parse_selector(&self.link)?;

        let mut content = SubUnits::new();
        for p in html.select(&paragraph) {
            let Some(anchor) = p.select(&link).next() else {
                continue;
            };
            let Some(key) = anchor.value().attr("title").and_then(verse_of) else {
                continue;
            };
            let text = collapse_whitespace(&anchor.text().collect::<String>());
            let text = text.strip_prefix(key).unwrap_or(&text).trim();
            if !text.is_empty() {
                content.insert(key, text);
            }
        }
        Ok(Extraction::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::verse_of;

    #[test]
    fn verse_number_comes_from_reference_title() {
        assert_eq!(verse_of("Gênesis 1:3"), Some("3"));
        assert_eq!(verse_of("1 Reis 2:10"), Some("10"));
        assert_eq!(verse_of("Gênesis"), None);
    }
}
