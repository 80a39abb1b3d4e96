use crate::{ImageSlot, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DiscoverVariants { item_id: ItemId, name: String },
    ProbeManufacturerIcon { manufacturer: String },
    /// Throttled load of `url` into `slot`.
    LoadImage { slot: ImageSlot, url: String },
}
