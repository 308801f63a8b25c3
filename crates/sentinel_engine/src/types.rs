use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settle::Settlement;

pub type CycleId = u64;

/// Ordered item names in document row order. Duplicates are kept.
pub type ItemList = Vec<String>;

/// Identifies which baseline a monitor compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorKey(String);

impl MonitorKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one read of the target document.
///
/// `NotFound` is the expected state while the remote document is still
/// rendering; it is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    NotFound,
    Found(ItemList),
}

/// Terminal outcome of one trigger cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    ControlMissing,
    TimedOut { attempts: u32 },
    Settled { settlement: Settlement, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CycleStarted { cycle_id: CycleId },
    CycleFinished { cycle_id: CycleId, report: CycleReport },
}

#[derive(Debug, Clone, PartialEq, Eq)]
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
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

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
