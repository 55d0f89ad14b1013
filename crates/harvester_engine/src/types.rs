use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use harvester_core::{SectionAddress, WorkTally};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Bytes,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Configuration defects are not worth another attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, FailureKind::InvalidUrl)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Progress of a harvest, reported section by section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    SectionSkipped {
        address: SectionAddress,
    },
    AttemptFailed {
        address: SectionAddress,
        attempt: u32,
        message: String,
    },
    SectionWritten {
        address: SectionAddress,
        path: PathBuf,
    },
    SectionEmpty {
        address: SectionAddress,
    },
    WorkFinished {
        title: String,
        tally: WorkTally,
    },
    WorkFailed {
        title: String,
        message: String,
    },
}

/// Summary of one work that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkReport {
    pub title: String,
    pub short_code: String,
    pub tally: WorkTally,
}
