use crate::assets::AssetLayout;
use crate::fetch::Fetcher;
use crate::types::{CatalogBytes, FetchError};

pub const DEFAULT_GENERIC_DATA: &str = "data/weapons_generic.json";
pub const DEFAULT_FACTION_DATA: &str = "data/weapons_faction.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub generic: String,
    pub faction: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            generic: DEFAULT_GENERIC_DATA.to_string(),
            faction: DEFAULT_FACTION_DATA.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
}

/// Fetches both data documents concurrently; either failure fails the load.
pub async fn fetch_catalog(
    fetcher: &dyn Fetcher,
    layout: &AssetLayout,
    files: &DataFiles,
) -> Result<CatalogBytes, DataLoadError> {
    let (generic, faction) = tokio::try_join!(
        fetch_one(fetcher, layout, &files.generic),
        fetch_one(fetcher, layout, &files.faction),
    )?;
    Ok(CatalogBytes { generic, faction })
}

async fn fetch_one(
    fetcher: &dyn Fetcher,
    layout: &AssetLayout,
    path: &str,
) -> Result<bytes::Bytes, DataLoadError> {
    let wrap = |source: FetchError| DataLoadError::Fetch {
        path: path.to_string(),
        source,
    };
    let url = layout.site_url(path).map_err(wrap)?;
    let output = fetcher.fetch(url.as_str()).await.map_err(wrap)?;
    Ok(output.bytes)
}
