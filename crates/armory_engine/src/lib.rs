//! Armory engine: asset discovery, throttled image loading and catalog IO.
mod assets;
mod candidates;
mod data;
mod discovery;
mod engine;
mod fetch;
mod loader;
mod probe;
mod types;

pub use assets::{
    parse_site_base, strip_cache_buster, AssetLayout, DEFAULT_CACHE_BUSTER, DEFAULT_GUILD_ART_DIR,
    DEFAULT_WEAPON_ART_DIR,
};
pub use candidates::{candidates_for, generate_candidates, manufacturer_icon_filename};
pub use data::{fetch_catalog, DataFiles, DataLoadError, DEFAULT_FACTION_DATA, DEFAULT_GENERIC_DATA};
pub use discovery::VariantDiscovery;
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use fetch::{FetchSettings, Fetcher, SiteFetcher};
pub use loader::{
    AssetLoader, ImageHandle, LoadEventSink, LoaderStats, RetryPolicy, ThrottleSettings,
};
pub use probe::{AssetProbe, ProbeCache, ProbeStatus, SiteProbe};
pub use types::{
    CatalogBytes, ConsumerId, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput,
    ItemId, LoadEvent, LoadStage, MissingAssetHint, VariantRecord, VariantTag,
};
