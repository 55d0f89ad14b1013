use std::sync::Arc;

use async_trait::async_trait;
use engine_logging::engine_debug;
use harvester_core::{Extraction, SectionLocator};
use serde::{Deserialize, Serialize};

use crate::decode::decode_body;
use crate::endpoint::Endpoint;
use crate::extract::{
    DataAttributeExtractor, EmptyPolicy, ExtractError, Extractor, JsonVerseRecordExtractor,
    JsonVersicleExtractor, LinkTitleExtractor, PositionalExtractor, VerseMarkerExtractor,
};
use crate::Fetcher;

/// Page layouts the harvester knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    VerseMarkers,
    DataAttributes,
    Positional,
    LinkTitles,
    JsonVersicles,
    JsonVerseRecords,
}

impl SourceKind {
    pub fn extractor(self) -> Result<Box<dyn Extractor>, ExtractError> {
        let extractor: Box<dyn Extractor> = match self {
            SourceKind::VerseMarkers => Box::new(VerseMarkerExtractor::new()?),
            SourceKind::DataAttributes => Box::new(DataAttributeExtractor::default()),
            SourceKind::Positional => Box::new(PositionalExtractor::default()),
            SourceKind::LinkTitles => Box::new(LinkTitleExtractor::default()),
            SourceKind::JsonVersicles => Box::new(JsonVersicleExtractor),
            SourceKind::JsonVerseRecords => Box::new(JsonVerseRecordExtractor),
        };
        Ok(extractor)
    }
}

/// Produces the sub-units of one section, however the source delivers them.
#[async_trait]
pub trait Source: Send + Sync {
    async fn extract(&self, locator: &SectionLocator) -> Result<Extraction, ExtractError>;

    fn empty_policy(&self) -> EmptyPolicy {
        EmptyPolicy::Retry
    }
}

/// A remote source: render the endpoint, fetch, decode, extract.
pub struct HttpSource {
    endpoint: Endpoint,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    empty_policy: EmptyPolicy,
}

impl HttpSource {
    pub fn new(endpoint: Endpoint, fetcher: Arc<dyn Fetcher>, extractor: Box<dyn Extractor>) -> Self {
        Self {
            endpoint,
            fetcher,
            extractor,
            empty_policy: EmptyPolicy::default(),
        }
    }

    pub fn with_empty_policy(mut self, policy: EmptyPolicy) -> Self {
        self.empty_policy = policy;
        self
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn extract(&self, locator: &SectionLocator) -> Result<Extraction, ExtractError> {
        let request = self.endpoint.request(locator)?;
        engine_debug!("fetching {}", request.url());
        let output = self.fetcher.fetch(&request).await?;
        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref())?;
        engine_debug!(
            "{} bytes from {} decoded as {}",
            output.metadata.byte_len,
            output.metadata.final_url,
            decoded.encoding_label
        );
        self.extractor.extract(&decoded.text)
    }

    fn empty_policy(&self) -> EmptyPolicy {
        self.empty_policy
    }
}
