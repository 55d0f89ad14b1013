//! Harvester engine: everything that touches the network or the disk.
//!
//! Fetching and decoding, per-source extraction, retries, atomic record
//! persistence, the resumable per-work pipeline and the worker pool that
//! runs works side by side, plus the verifier's directory scan.
mod catalog_api;
mod decode;
mod endpoint;
mod engine;
pub mod extract;
mod fetch;
mod persist;
mod pipeline;
mod retry;
mod source;
mod types;
mod verify;

pub use catalog_api::{fetch_catalog, parse_catalog, CatalogApiError};
pub use decode::{decode_body, DecodeError, DecodedBody};
pub use endpoint::{Endpoint, EndpointError, HttpMethod, TestamentValues};
pub use engine::{WorkJob, WorkOutcome, WorkerPool};
pub use extract::{EmptyPolicy, ExtractError, Extractor};
pub use fetch::{
    ChannelProgressSink, FetchRequest, FetchSettings, Fetcher, NullProgressSink, ProgressSink,
    ReqwestFetcher, BROWSER_USER_AGENT,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, RecordStore};
pub use pipeline::{HarvestError, HarvestPipeline};
pub use retry::{run_with_retry, RetryError, RetryPolicy, Retryable, Sleeper, TokioSleeper};
pub use source::{HttpSource, Source, SourceKind};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, HarvestEvent, WorkReport};
pub use verify::{scan, ScanOutcome, Unreadable, VerifyError};
