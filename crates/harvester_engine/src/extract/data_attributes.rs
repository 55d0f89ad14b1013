use harvester_core::{Extraction, SubUnits};
use scraper::{ElementRef, Html};

use super::text::collapse_whitespace;
use super::{parse_selector, ExtractError, Extractor};

/// Pages that tag each verse number and verse text with a `data-v`
/// attribute and carry section headings in separate tagged blocks.
#[derive(Debug, Clone)]
pub struct DataAttributeExtractor {
    paragraph: String,
    number: String,
    text: String,
    heading: String,
}

impl Default for DataAttributeExtractor {
    fn default() -> Self {
        Self {
            paragraph: "p.l0[data-v]".to_string(),
            number: "span.v[data-v]".to_string(),
            text: "span.t".to_string(),
            heading: "div.l0[data-v]".to_string(),
        }
    }
}

fn raw_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

impl Extractor for DataAttributeExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let html = Html::parse_document(document);
        let paragraph = parse_selector(&self.paragraph)?;
        let number = parse_selector(&self.number)?;
        let text = parse_selector(&self.text)?;
        let heading = parse_selector(&self.heading)?;

        let mut titles = SubUnits::new();
        for block in html.select(&heading) {
            let Some(span) = block.select(&text).next() else {
                continue;
            };
            let tag = span
                .value()
                .attr("data-v")
                .or_else(|| block.value().attr("data-v"))
                .unwrap_or_default();
            let key = tag.trim_matches('.');
            let title = raw_text(span);
            if !key.is_empty() && !title.is_empty() {
                titles.insert(key, title);
            }
        }

        let mut content = SubUnits::new();
        for p in html.select(&paragraph) {
            for marker in p.select(&number) {
                let key = raw_text(marker);
                if key.is_empty() {
                    continue;
                }
                let Some(body) = marker
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|el| text.matches(el))
                else {
                    continue;
                };
                // A verse broken by inline notes continues in later siblings
                // tagged with the same verse.
                let tag = format!(".{key}.");
                let mut parts = vec![raw_text(body)];
                parts.extend(
                    body.next_siblings()
                        .filter_map(ElementRef::wrap)
                        .filter(|el| el.value().attr("data-v") == Some(tag.as_str()))
                        .map(raw_text),
                );
                let verse = collapse_whitespace(&parts.join(" "));
                if !verse.is_empty() {
                    content.insert(key, verse);
                }
            }
        }

        titles.retain(|key, _| content.contains_key(key));
        Ok(Extraction::new(content).with_titles(titles))
    }
}
