use std::path::Path;

use url::Url;

use crate::candidates::{generate_candidates, manufacturer_icon_filename};
use crate::types::{FailureKind, FetchError, MissingAssetHint, VariantRecord};

pub const DEFAULT_WEAPON_ART_DIR: &str = "art/weapons/";
pub const DEFAULT_GUILD_ART_DIR: &str = "art/guilds/";
pub const DEFAULT_CACHE_BUSTER: &str = "1.0.0";

/// Where assets live relative to the site base, and how loader URLs are
/// versioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    site_base: Url,
    weapon_dir: String,
    guild_dir: String,
    cache_buster: Option<String>,
}

impl AssetLayout {
    pub fn new(site_base: Url) -> Self {
        Self {
            site_base: as_directory(site_base),
            weapon_dir: DEFAULT_WEAPON_ART_DIR.to_string(),
            guild_dir: DEFAULT_GUILD_ART_DIR.to_string(),
            cache_buster: Some(DEFAULT_CACHE_BUSTER.to_string()),
        }
    }

    pub fn with_weapon_dir(mut self, dir: impl Into<String>) -> Self {
        self.weapon_dir = directory_path(dir.into());
        self
    }

    pub fn with_guild_dir(mut self, dir: impl Into<String>) -> Self {
        self.guild_dir = directory_path(dir.into());
        self
    }

    pub fn with_cache_buster(mut self, version: Option<String>) -> Self {
        self.cache_buster = version.filter(|v| !v.is_empty());
        self
    }

    pub fn site_base(&self) -> &Url {
        &self.site_base
    }

    /// Resolves a site-relative path such as `data/weapons_generic.json`.
    pub fn site_url(&self, relative: &str) -> Result<Url, FetchError> {
        self.site_base
            .join(relative)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub fn weapon_url(&self, filename: &str) -> Result<Url, FetchError> {
        self.site_url(&format!("{}{filename}", self.weapon_dir))
    }

    pub fn guild_url(&self, filename: &str) -> Result<Url, FetchError> {
        self.site_url(&format!("{}{filename}", self.guild_dir))
    }

    /// Loader URL for a discovered variant, cache buster included.
    pub fn variant_load_url(&self, record: &VariantRecord) -> Result<String, FetchError> {
        self.weapon_url(&record.resolved_path)
            .map(|url| self.with_version(url))
    }

    /// Appends the `v=` cache-busting parameter if one is configured.
    pub fn with_version(&self, mut url: Url) -> String {
        if let Some(version) = &self.cache_buster {
            url.query_pairs_mut().append_pair("v", version);
        }
        url.into()
    }

    /// Expected filename shown when an item has no image at all.
    pub fn missing_image_hint(&self, name: &str) -> MissingAssetHint {
        let candidates = generate_candidates(name, "");
        let expected = candidates
            .first()
            .map(|file| format!("{}{file}", display_dir(&self.weapon_dir)))
            .unwrap_or_default();
        MissingAssetHint {
            expected,
            tried: candidates.len(),
        }
    }

    pub fn missing_icon_hint(&self, manufacturer: &str) -> MissingAssetHint {
        MissingAssetHint {
            expected: format!(
                "{}{}",
                display_dir(&self.guild_dir),
                manufacturer_icon_filename(manufacturer)
            ),
            tried: 1,
        }
    }
}

/// Interprets `raw` as an `http(s)`/`file` URL, or else as a local directory.
pub fn parse_site_base(raw: &str) -> Result<Url, FetchError> {
    if let Ok(url) = Url::parse(raw) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(url);
        }
    }
    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?
            .join(path)
    };
    Url::from_directory_path(&absolute).map_err(|_| {
        FetchError::new(
            FailureKind::InvalidUrl,
            format!("not a usable site directory: {}", absolute.display()),
        )
    })
}

/// Drops the query string so retries target the canonical path.
pub fn strip_cache_buster(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.into()
        }
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    }
}

fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn directory_path(mut dir: String) -> String {
    if !dir.is_empty() && !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

/// `art/weapons/` is shown to users as `weapons/`.
fn display_dir(dir: &str) -> &str {
    dir.strip_prefix("art/").unwrap_or(dir)
}
