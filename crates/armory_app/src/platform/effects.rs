use std::collections::HashMap;
use std::time::Duration;

use armory_core::{parse_catalog, Effect, ImageSlot, Msg, Variant};
use armory_engine::{
    ConsumerId, EngineConfig, EngineError, EngineEvent, EngineHandle, LoadEvent, LoadStage,
    MissingAssetHint,
};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

/// Stable loader consumer id per display slot.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    ids: HashMap<ImageSlot, ConsumerId>,
    slots: HashMap<ConsumerId, ImageSlot>,
}

impl SlotRegistry {
    pub fn consumer_for(&mut self, slot: ImageSlot) -> ConsumerId {
        if let Some(id) = self.ids.get(&slot) {
            return *id;
        }
        let id = self.ids.len() as ConsumerId + 1;
        self.ids.insert(slot, id);
        self.slots.insert(id, slot);
        id
    }

    pub fn slot_of(&self, consumer: ConsumerId) -> Option<ImageSlot> {
        self.slots.get(&consumer).copied()
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
    registry: SlotRegistry,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            engine: EngineHandle::new(config)?,
            registry: SlotRegistry::default(),
        })
    }

    pub fn load_catalog(&self) {
        engine_info!("Loading catalog from {}", self.engine.layout().site_base());
        self.engine.load_catalog();
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DiscoverVariants { item_id, name } => {
                    self.engine.discover_variants(item_id, name);
                }
                Effect::ProbeManufacturerIcon { manufacturer } => {
                    self.engine.probe_manufacturer_icon(manufacturer);
                }
                Effect::LoadImage { slot, url } => {
                    let consumer = self.registry.consumer_for(slot);
                    engine_debug!("LoadImage slot={:?} consumer={} url={}", slot, consumer, url);
                    self.engine.load_image(consumer, url);
                }
            }
        }
    }

    /// Waits up to `wait` for the first engine event, then drains the rest.
    pub fn poll(&self, wait: Duration) -> Vec<Msg> {
        let mut msgs = Vec::new();
        let Some(first) = self.engine.recv_timeout(wait) else {
            return msgs;
        };
        msgs.extend(self.translate(first));
        while let Some(event) = self.engine.try_recv() {
            msgs.extend(self.translate(event));
        }
        msgs
    }

    pub fn missing_image_hint(&self, name: &str) -> MissingAssetHint {
        self.engine.missing_image_hint(name)
    }

    pub fn missing_icon_hint(&self, manufacturer: &str) -> MissingAssetHint {
        self.engine.missing_icon_hint(manufacturer)
    }

    fn translate(&self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::CatalogFetched(Ok(bytes)) => {
                match parse_catalog(&bytes.generic, &bytes.faction) {
                    Ok(items) => {
                        engine_info!("Catalog loaded with {} item(s)", items.len());
                        Some(Msg::DataLoaded(items))
                    }
                    Err(err) => {
                        engine_error!("Error loading weapon data: {}", err);
                        Some(Msg::DataLoadFailed(err.to_string()))
                    }
                }
            }
            EngineEvent::CatalogFetched(Err(err)) => {
                engine_error!("Error loading weapon data: {}", err);
                Some(Msg::DataLoadFailed(err.to_string()))
            }
            EngineEvent::VariantsDiscovered { item_id, variants } => {
                let variants = variants
                    .iter()
                    .filter_map(|record| {
                        self.engine.variant_url(record).map(|url| Variant {
                            label: record.tag.label().to_string(),
                            url,
                        })
                    })
                    .collect();
                Some(Msg::VariantsDiscovered { item_id, variants })
            }
            EngineEvent::ManufacturerIconResolved { manufacturer, url } => {
                let url = url.map(|probed| self.engine.icon_load_url(&probed));
                Some(Msg::ManufacturerIconResolved { manufacturer, url })
            }
            EngineEvent::Image(event) => self.image_msg(event),
        }
    }

    fn image_msg(&self, event: LoadEvent) -> Option<Msg> {
        let Some(slot) = self.registry.slot_of(event.consumer) else {
            engine_warn!("Image event for unknown consumer {}", event.consumer);
            return None;
        };
        match event.stage {
            LoadStage::Succeeded => Some(Msg::ImageLoaded {
                slot,
                url: event.url,
            }),
            LoadStage::Failed => Some(Msg::ImageFailed {
                slot,
                url: event.url,
            }),
            LoadStage::Started | LoadStage::Retrying { .. } => None,
        }
    }
}
