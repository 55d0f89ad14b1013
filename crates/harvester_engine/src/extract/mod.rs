//! Turning a fetched document into ordered sub-units.
//!
//! Every source gets its own [`Extractor`]; the layouts differ too much for a
//! shared rule set. Extractors never fail on "nothing found": they return an
//! empty [`Extraction`] and let the pipeline decide, per source, whether that
//! is a retryable failure or a legitimate result.

mod data_attributes;
mod json_records;
mod json_versicles;
mod link_titles;
mod positional;
mod text;
mod verse_markers;

use harvester_core::{Extraction, RecordError};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodeError;
use crate::endpoint::EndpointError;
use crate::FetchError;

pub use data_attributes::DataAttributeExtractor;
pub use json_records::JsonVerseRecordExtractor;
pub use json_versicles::JsonVersicleExtractor;
pub use link_titles::LinkTitleExtractor;
pub use positional::PositionalExtractor;
pub use text::{collapse_whitespace, element_text, html_fragment_text};
pub use verse_markers::{segment_by_markers, VerseMarkerExtractor};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("endpoint: {0}")]
    Endpoint(#[from] EndpointError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid selector {css:?}: {message}")]
    Selector { css: String, message: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("no sub-units found")]
    Empty,
    #[error("extraction cannot be stored: {0}")]
    InvalidRecord(#[from] RecordError),
}

impl ExtractError {
    /// Whether another attempt could plausibly succeed. Configuration defects
    /// surface immediately instead.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractError::Fetch(err) => err.is_transient(),
            ExtractError::Endpoint(_) | ExtractError::Selector { .. } | ExtractError::Pattern(_) => {
                false
            }
            ExtractError::Decode(_)
            | ExtractError::Malformed(_)
            | ExtractError::Empty
            | ExtractError::InvalidRecord(_) => true,
        }
    }
}

/// What an empty extraction means for a given source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyPolicy {
    /// Empty is a parse failure: retry, then fail the work.
    #[default]
    Retry,
    /// Empty is a legitimate terminal state: record nothing and move on.
    Accept,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, document: &str) -> Result<Extraction, ExtractError>;
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|err| ExtractError::Selector {
        css: css.to_string(),
        message: err.to_string(),
    })
}
