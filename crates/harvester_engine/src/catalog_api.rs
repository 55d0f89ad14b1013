//! Client for the public book-list API some sources rely on for their
//! catalog.

use harvester_core::{Catalog, CatalogEntry, Testament};
use serde::Deserialize;
use thiserror::Error;

use crate::decode::{decode_body, DecodeError};
use crate::{FetchError, FetchRequest, Fetcher};

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("catalog fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("catalog decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("catalog response malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("catalog lists {slug:?} with no chapters")]
    NoSections { slug: String },
}

#[derive(Debug, Deserialize)]
struct ApiBook {
    name: String,
    abbrev: ApiAbbrev,
    chapters: u32,
    #[serde(default)]
    testament: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAbbrev {
    pt: String,
}

fn testament(code: Option<&str>) -> Option<Testament> {
    match code?.trim() {
        "VT" | "AT" => Some(Testament::Old),
        "NT" => Some(Testament::New),
        _ => None,
    }
}

/// Parses a list of `{"name","abbrev":{"pt"},"chapters","testament"}`
/// objects, keeping their order.
pub fn parse_catalog(body: &str) -> Result<Catalog, CatalogApiError> {
    let books: Vec<ApiBook> = serde_json::from_str(body)?;
    books
        .into_iter()
        .map(|book| {
            let slug = book.abbrev.pt.trim().to_lowercase();
            if book.chapters == 0 {
                return Err(CatalogApiError::NoSections { slug });
            }
            let title = book.name.replace(['º', 'ª'], "").trim().to_string();
            let mut entry = CatalogEntry::new(title, slug, book.chapters);
            entry.testament = testament(book.testament.as_deref());
            Ok(entry)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Catalog::new)
}

pub async fn fetch_catalog(fetcher: &dyn Fetcher, url: &str) -> Result<Catalog, CatalogApiError> {
    let output = fetcher.fetch(&FetchRequest::get(url)).await?;
    let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref())?;
    parse_catalog(&decoded.text)
}
