use crate::{ImageSlot, ItemId, ItemRecord, SortKey, Surface, Variant};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Both data files fetched and parsed.
    DataLoaded(Vec<ItemRecord>),
    /// Startup data load failed; the catalog never renders.
    DataLoadFailed(String),
    ManufacturerFilterChanged(Option<String>),
    CategoryFilterChanged(Option<String>),
    SortChanged(SortKey),
    SearchChanged(String),
    SearchCleared,
    /// Discovery finished for an item; `variants` may be empty.
    VariantsDiscovered {
        item_id: ItemId,
        variants: Vec<Variant>,
    },
    /// Icon probe finished; `url` is the loadable icon URL when it exists.
    ManufacturerIconResolved {
        manufacturer: String,
        url: Option<String>,
    },
    CardClicked(ItemId),
    ModalClosed,
    /// User picked a variant dot (card) or skin button (detail view).
    VariantSelected {
        surface: Surface,
        item_id: ItemId,
        index: usize,
    },
    ImageLoaded { slot: ImageSlot, url: String },
    ImageFailed { slot: ImageSlot, url: String },
    MissingImageClicked { expected: String, tried: usize },
    MissingIconClicked { expected: String },
    ToastDismissed,
    /// Render tick.
    Tick,
    NoOp,
}
