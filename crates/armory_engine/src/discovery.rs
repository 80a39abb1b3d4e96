use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};

use crate::assets::AssetLayout;
use crate::candidates::{candidates_for, manufacturer_icon_filename};
use crate::probe::ProbeCache;
use crate::types::{VariantRecord, VariantTag};

/// Finds which image variants of an item exist on the asset server.
#[derive(Clone)]
pub struct VariantDiscovery {
    cache: Arc<ProbeCache>,
    layout: Arc<AssetLayout>,
}

impl VariantDiscovery {
    pub fn new(cache: Arc<ProbeCache>, layout: Arc<AssetLayout>) -> Self {
        Self { cache, layout }
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    /// Walks the tags in order and keeps the first existing candidate of each.
    ///
    /// Probes are strictly sequential: a tag's candidates are only checked once
    /// every earlier check has completed.
    pub async fn discover(&self, name: &str) -> Vec<VariantRecord> {
        let mut found = Vec::new();
        for tag in VariantTag::ALL {
            if let Some(path) = self.first_existing(name, tag).await {
                found.push(VariantRecord {
                    tag,
                    resolved_path: path,
                });
            }
        }
        engine_debug!("discovered {} variant(s) for {:?}", found.len(), name);
        found
    }

    /// Probed (uncached) URL of the manufacturer icon, if the icon exists.
    pub async fn resolve_manufacturer_icon(&self, manufacturer: &str) -> Option<String> {
        let filename = manufacturer_icon_filename(manufacturer);
        let url = match self.layout.guild_url(&filename) {
            Ok(url) => url,
            Err(err) => {
                engine_warn!("cannot build icon url for {:?}: {}", manufacturer, err);
                return None;
            }
        };
        if self.cache.probe(url.as_str()).await {
            Some(url.into())
        } else {
            None
        }
    }

    async fn first_existing(&self, name: &str, tag: VariantTag) -> Option<String> {
        for candidate in candidates_for(name, tag) {
            let url = match self.layout.weapon_url(&candidate) {
                Ok(url) => url,
                Err(err) => {
                    engine_warn!("skipping candidate {:?}: {}", candidate, err);
                    continue;
                }
            };
            if self.cache.probe(url.as_str()).await {
                return Some(candidate);
            }
        }
        None
    }
}
