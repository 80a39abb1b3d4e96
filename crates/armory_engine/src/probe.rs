//! One-shot existence checks and their session-wide cache.
//!
//! A probe never goes through the throttled loader: it only answers "is this
//! static file there". Results are memoized per URL for the lifetime of the
//! cache and concurrent probes of the same URL share a single check.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use engine_logging::engine_trace;
use reqwest::StatusCode;
use tokio::sync::OnceCell;
use url::Url;

use crate::fetch::{map_io_error, map_reqwest_error, Fetcher, SiteFetcher};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Unknown,
    Exists,
    Missing,
}

#[async_trait::async_trait]
pub trait AssetProbe: Send + Sync {
    /// `Ok(false)` is a confirmed miss; errors are treated as misses by the cache.
    async fn exists(&self, url: &str) -> Result<bool, FetchError>;
}

/// HEAD for `http(s)` (GET when the server refuses HEAD), metadata for `file`.
pub struct SiteProbe {
    fetcher: SiteFetcher,
}

impl SiteProbe {
    pub fn new(fetcher: SiteFetcher) -> Self {
        Self { fetcher }
    }

    async fn exists_http(&self, url: Url) -> Result<bool, FetchError> {
        let response = self
            .fetcher
            .client()
            .head(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                match self.fetcher.fetch(url.as_str()).await {
                    Ok(_) => Ok(true),
                    Err(err) if matches!(err.kind, FailureKind::HttpStatus(_)) => Ok(false),
                    Err(err) => Err(err),
                }
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl AssetProbe for SiteProbe {
    async fn exists(&self, url: &str) -> Result<bool, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => self.exists_http(parsed).await,
            "file" => {
                let path = parsed.to_file_path().map_err(|_| {
                    FetchError::new(FailureKind::InvalidUrl, format!("not a local path: {url}"))
                })?;
                match tokio::fs::metadata(&path).await {
                    Ok(meta) => Ok(meta.is_file()),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
                    Err(err) => Err(map_io_error(err)),
                }
            }
            other => Err(FetchError::new(
                FailureKind::UnsupportedScheme(other.to_string()),
                url,
            )),
        }
    }
}

/// Memoizing front for an [`AssetProbe`].
pub struct ProbeCache {
    probe: Arc<dyn AssetProbe>,
    entries: Mutex<HashMap<String, Arc<OnceCell<bool>>>>,
    checks: AtomicUsize,
}

impl ProbeCache {
    pub fn new(probe: Arc<dyn AssetProbe>) -> Self {
        Self {
            probe,
            entries: Mutex::new(HashMap::new()),
            checks: AtomicUsize::new(0),
        }
    }

    pub async fn probe(&self, url: &str) -> bool {
        let cell = self.cell_for(url);
        *cell
            .get_or_init(|| async {
                self.checks.fetch_add(1, Ordering::Relaxed);
                match self.probe.exists(url).await {
                    Ok(found) => {
                        engine_trace!("probe {} -> {}", url, found);
                        found
                    }
                    Err(err) => {
                        engine_trace!("probe {} failed, treating as missing: {}", url, err);
                        false
                    }
                }
            })
            .await
    }

    pub fn status(&self, url: &str) -> ProbeStatus {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get(url).and_then(|cell| cell.get().copied()) {
            Some(true) => ProbeStatus::Exists,
            Some(false) => ProbeStatus::Missing,
            None => ProbeStatus::Unknown,
        }
    }

    /// Number of underlying existence checks performed so far.
    pub fn checks_performed(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }

    fn cell_for(&self, url: &str) -> Arc<OnceCell<bool>> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            entries
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}
