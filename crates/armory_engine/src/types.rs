use std::fmt;
use std::time::Duration;

use bytes::Bytes;

/// Identifies the UI element a load targets.
pub type ConsumerId = u64;

pub type ItemId = u32;

/// Alternate renditions of an item image, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariantTag {
    Default,
    A,
    B,
    C,
    D,
    E,
}

impl VariantTag {
    pub const ALL: [VariantTag; 6] = [
        VariantTag::Default,
        VariantTag::A,
        VariantTag::B,
        VariantTag::C,
        VariantTag::D,
        VariantTag::E,
    ];

    /// Filename suffix appended to the base name.
    pub fn suffix(self) -> &'static str {
        match self {
            VariantTag::Default => "",
            VariantTag::A => "_a",
            VariantTag::B => "_b",
            VariantTag::C => "_c",
            VariantTag::D => "_d",
            VariantTag::E => "_e",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VariantTag::Default => "Default",
            VariantTag::A => "A",
            VariantTag::B => "B",
            VariantTag::C => "C",
            VariantTag::D => "D",
            VariantTag::E => "E",
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub tag: VariantTag,
    /// Candidate filename relative to the weapon art directory.
    pub resolved_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Bytes,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub url: String,
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
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    UnsupportedScheme(String),
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    NotFound,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::UnsupportedScheme(scheme) => write!(f, "unsupported scheme {scheme}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Progress of a single load task as observed by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStage {
    Started,
    Retrying { attempt: u32, delay: Duration },
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    pub consumer: ConsumerId,
    /// The URL the task was enqueued with (cache buster included).
    pub url: String,
    pub stage: LoadStage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAssetHint {
    pub expected: String,
    pub tried: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBytes {
    pub generic: Bytes,
    pub faction: Bytes,
}

#[derive(Debug)]
pub enum EngineEvent {
    CatalogFetched(Result<CatalogBytes, crate::DataLoadError>),
    VariantsDiscovered {
        item_id: ItemId,
        variants: Vec<VariantRecord>,
    },
    ManufacturerIconResolved {
        manufacturer: String,
        url: Option<String>,
    },
    Image(LoadEvent),
}
