use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Accepted `Content-Type` values; an entry ending in `/*` matches the
    /// whole family. Empty accepts anything.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::images()
    }
}

impl FetchSettings {
    pub fn images() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 16 * 1024 * 1024,
            allowed_content_types: vec![
                "image/*".to_string(),
                "application/octet-stream".to_string(),
            ],
        }
    }

    pub fn data() -> Self {
        Self {
            max_bytes: 8 * 1024 * 1024,
            allowed_content_types: vec![
                "application/json".to_string(),
                "text/json".to_string(),
                "text/plain".to_string(),
                "application/octet-stream".to_string(),
            ],
            ..Self::images()
        }
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.allowed_content_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(family) => ct
                    .split_once('/')
                    .is_some_and(|(prefix, _)| prefix.eq_ignore_ascii_case(family)),
                None => allowed.eq_ignore_ascii_case(ct),
            }
        })
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// Fetches `http(s)` URLs with reqwest and `file` URLs from disk.
#[derive(Debug, Clone)]
pub struct SiteFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl SiteFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings)?;
        Ok(Self { client, settings })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn fetch_http(&self, url: Url) -> Result<FetchOutput, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.settings.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchOutput {
            metadata: FetchMetadata {
                url: url.to_string(),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes: bytes.freeze(),
        })
    }

    async fn fetch_file(&self, url: Url) -> Result<FetchOutput, FetchError> {
        let path = url.to_file_path().map_err(|_| {
            FetchError::new(FailureKind::InvalidUrl, format!("not a local path: {url}"))
        })?;
        let data = tokio::fs::read(&path).await.map_err(map_io_error)?;
        let len = data.len() as u64;
        if len > self.settings.max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes: self.settings.max_bytes,
                    actual: Some(len),
                },
                "file too large",
            ));
        }
        Ok(FetchOutput {
            bytes: Bytes::from(data),
            metadata: FetchMetadata {
                url: url.to_string(),
                content_type: None,
                byte_len: len,
            },
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => self.fetch_http(parsed).await,
            "file" => self.fetch_file(parsed).await,
            other => Err(FetchError::new(
                FailureKind::UnsupportedScheme(other.to_string()),
                url,
            )),
        }
    }
}

fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

pub(crate) fn map_io_error(err: std::io::Error) -> FetchError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return FetchError::new(FailureKind::NotFound, err.to_string());
    }
    FetchError::new(FailureKind::Io, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::FetchSettings;

    #[test]
    fn image_family_wildcard_matches() {
        let settings = FetchSettings::images();
        assert!(settings.is_content_type_allowed("image/png"));
        assert!(settings.is_content_type_allowed("IMAGE/webp; q=1"));
        assert!(!settings.is_content_type_allowed("text/html"));
    }

    #[test]
    fn data_settings_accept_json() {
        let settings = FetchSettings::data();
        assert!(settings.is_content_type_allowed("application/json; charset=utf-8"));
        assert!(!settings.is_content_type_allowed("image/png"));
    }
}
