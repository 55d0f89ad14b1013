use harvester_core::{Extraction, SubUnits};
use serde::Deserialize;
use serde_json::Value;

use super::text::html_fragment_text;
use super::{ExtractError, Extractor};

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Vec<Chapter>,
}

#[derive(Debug, Deserialize)]
struct Chapter {
    #[serde(default)]
    versicles: Vec<Versicle>,
}

#[derive(Debug, Deserialize)]
struct Versicle {
    value: Value,
    #[serde(default)]
    text: String,
}

/// `{"data":[{"versicles":[{"value":..,"text":"<html>"}]}]}` where only the
/// first chapter entry counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVersicleExtractor;

/// Keys arrive as strings or numbers depending on the endpoint.
pub(crate) fn json_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Extractor for JsonVersicleExtractor {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError> {
        let response: Response = serde_json::from_str(document)
            .map_err(|err| ExtractError::Malformed(err.to_string()))?;
        let Some(chapter) = response.data.into_iter().next() else {
            return Ok(Extraction::default());
        };

        let content: SubUnits = chapter
            .versicles
            .iter()
            .filter_map(|v| Some((json_key(&v.value)?, html_fragment_text(&v.text))))
            .filter(|(_, text)| !text.is_empty())
            .collect();
        Ok(Extraction::new(content))
    }
}
