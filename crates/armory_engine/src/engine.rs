use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_trace};
use url::Url;

use crate::assets::AssetLayout;
use crate::data::{fetch_catalog, DataFiles};
use crate::discovery::VariantDiscovery;
use crate::fetch::{FetchSettings, Fetcher, SiteFetcher};
use crate::loader::{AssetLoader, ImageHandle, RetryPolicy, ThrottleSettings};
use crate::probe::{ProbeCache, SiteProbe};
use crate::types::{
    ConsumerId, EngineEvent, FetchError, FetchOutput, ItemId, LoadEvent, LoadStage,
    MissingAssetHint, VariantRecord,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub layout: AssetLayout,
    pub data_files: DataFiles,
    pub throttle: ThrottleSettings,
    pub retry: RetryPolicy,
    pub image_fetch: FetchSettings,
    pub data_fetch: FetchSettings,
}

impl EngineConfig {
    pub fn for_site(site_base: Url) -> Self {
        Self {
            layout: AssetLayout::new(site_base),
            data_files: DataFiles::default(),
            throttle: ThrottleSettings::default(),
            retry: RetryPolicy::default(),
            image_fetch: FetchSettings::images(),
            data_fetch: FetchSettings::data(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    LoadCatalog,
    DiscoverVariants { item_id: ItemId, name: String },
    ProbeManufacturerIcon { manufacturer: String },
    LoadImage { consumer: ConsumerId, url: String },
}

/// Owns the background runtime; commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    layout: Arc<AssetLayout>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let layout = Arc::new(config.layout.clone());
        let image_fetcher: Arc<dyn Fetcher> = Arc::new(SiteFetcher::new(config.image_fetch.clone())?);
        let data_fetcher = Arc::new(SiteFetcher::new(config.data_fetch.clone())?);
        let probe = SiteProbe::new(SiteFetcher::new(config.image_fetch.clone())?);
        let discovery = VariantDiscovery::new(
            Arc::new(ProbeCache::new(Arc::new(probe))),
            Arc::clone(&layout),
        );
        let runtime = tokio::runtime::Runtime::new()?;

        let worker = Worker {
            discovery,
            data_fetcher,
            data_files: config.data_files,
            event_tx,
        };

        thread::spawn(move || {
            let loader = {
                let _guard = runtime.enter();
                AssetLoader::spawn(image_fetcher, config.throttle, config.retry, None)
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, &loader, command);
            }
            engine_trace!("engine command channel closed");
            drop(loader);
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            layout,
        })
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn load_catalog(&self) {
        self.send(EngineCommand::LoadCatalog);
    }

    pub fn discover_variants(&self, item_id: ItemId, name: impl Into<String>) {
        self.send(EngineCommand::DiscoverVariants {
            item_id,
            name: name.into(),
        });
    }

    pub fn probe_manufacturer_icon(&self, manufacturer: impl Into<String>) {
        self.send(EngineCommand::ProbeManufacturerIcon {
            manufacturer: manufacturer.into(),
        });
    }

    pub fn load_image(&self, consumer: ConsumerId, url: impl Into<String>) {
        self.send(EngineCommand::LoadImage {
            consumer,
            url: url.into(),
        });
    }

    /// Loader URL for a discovered variant.
    pub fn variant_url(&self, record: &VariantRecord) -> Option<String> {
        match self.layout.variant_load_url(record) {
            Ok(url) => Some(url),
            Err(err) => {
                engine_error!("cannot build url for {:?}: {}", record.resolved_path, err);
                None
            }
        }
    }

    /// Loader URL for a probed manufacturer icon.
    pub fn icon_load_url(&self, probed_url: &str) -> String {
        match Url::parse(probed_url) {
            Ok(url) => self.layout.with_version(url),
            Err(_) => probed_url.to_string(),
        }
    }

    pub fn missing_image_hint(&self, name: &str) -> MissingAssetHint {
        self.layout.missing_image_hint(name)
    }

    pub fn missing_icon_hint(&self, manufacturer: &str) -> MissingAssetHint {
        self.layout.missing_icon_hint(manufacturer)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_error!("engine worker is gone; command dropped");
        }
    }
}

struct Worker {
    discovery: VariantDiscovery,
    data_fetcher: Arc<SiteFetcher>,
    data_files: DataFiles,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn handle(&self, runtime: &tokio::runtime::Runtime, loader: &AssetLoader, command: EngineCommand) {
        let event_tx = self.event_tx.clone();
        match command {
            EngineCommand::LoadCatalog => {
                let fetcher = Arc::clone(&self.data_fetcher);
                let discovery = self.discovery.clone();
                let files = self.data_files.clone();
                runtime.spawn(async move {
                    let result = fetch_catalog(fetcher.as_ref(), discovery.layout(), &files).await;
                    let _ = event_tx.send(EngineEvent::CatalogFetched(result));
                });
            }
            EngineCommand::DiscoverVariants { item_id, name } => {
                let discovery = self.discovery.clone();
                runtime.spawn(async move {
                    let variants = discovery.discover(&name).await;
                    let _ = event_tx.send(EngineEvent::VariantsDiscovered { item_id, variants });
                });
            }
            EngineCommand::ProbeManufacturerIcon { manufacturer } => {
                let discovery = self.discovery.clone();
                runtime.spawn(async move {
                    let url = discovery.resolve_manufacturer_icon(&manufacturer).await;
                    let _ = event_tx.send(EngineEvent::ManufacturerIconResolved { manufacturer, url });
                });
            }
            EngineCommand::LoadImage { consumer, url } => {
                let handle = Arc::new(ChannelImageHandle { consumer, event_tx });
                loader.enqueue(consumer, url, handle);
            }
        }
    }
}

/// Reports completions as [`EngineEvent::Image`]; a closed channel means the
/// consumer is gone and the report is dropped.
struct ChannelImageHandle {
    consumer: ConsumerId,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ChannelImageHandle {
    fn report(&self, url: &str, stage: LoadStage) {
        let _ = self.event_tx.send(EngineEvent::Image(LoadEvent {
            consumer: self.consumer,
            url: url.to_string(),
            stage,
        }));
    }
}

impl ImageHandle for ChannelImageHandle {
    fn set_source(&self, url: &str) {
        engine_trace!("consumer {} loading {}", self.consumer, url);
    }

    fn on_success(&self, url: &str, _image: &FetchOutput) {
        self.report(url, LoadStage::Succeeded);
    }

    fn on_failure(&self, url: &str) {
        self.report(url, LoadStage::Failed);
    }
}
