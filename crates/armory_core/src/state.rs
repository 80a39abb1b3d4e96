use std::collections::HashMap;

use crate::{Filters, ItemId, ItemRecord};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// A discovered image rendition, ready to hand to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// `Default`, `A` .. `E`.
    pub label: String,
    pub url: String,
}

/// Where a loaded image is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageSlot {
    Card(ItemId),
    Modal(ItemId),
    ModalIcon(ItemId),
    Banner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Card,
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Nothing requested yet; the placeholder is shown.
    #[default]
    Pending,
    Loading,
    Loaded,
    Failed,
    /// Discovery found no variant at all.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotImage {
    pub(crate) url: String,
    pub(crate) status: ImageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IconStatus {
    Probing,
    Present(String),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModalState {
    pub(crate) item_id: ItemId,
    pub(crate) selection: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) status: CatalogStatus,
    pub(crate) items: Vec<ItemRecord>,
    pub(crate) filters: Filters,
    pub(crate) variants: HashMap<ItemId, Vec<Variant>>,
    pub(crate) card_selection: HashMap<ItemId, usize>,
    pub(crate) images: HashMap<ImageSlot, SlotImage>,
    pub(crate) icons: HashMap<String, IconStatus>,
    pub(crate) modal: Option<ModalState>,
    pub(crate) toast: Option<Toast>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `filters` already applied, as when they come from the command line.
    pub fn with_filters(filters: Filters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    /// `None` until discovery for the item has finished.
    pub fn variants(&self, id: ItemId) -> Option<&[Variant]> {
        self.variants.get(&id).map(Vec::as_slice)
    }

    pub fn image_status(&self, slot: ImageSlot) -> ImageStatus {
        self.images
            .get(&slot)
            .map_or(ImageStatus::Pending, |image| image.status)
    }

    pub fn image_url(&self, slot: ImageSlot) -> Option<&str> {
        self.images.get(&slot).map(|image| image.url.as_str())
    }

    pub fn open_item(&self) -> Option<ItemId> {
        self.modal.map(|modal| modal.item_id)
    }

    /// True once every card has a settled image: loaded, failed or missing.
    pub fn images_settled(&self) -> bool {
        self.status != CatalogStatus::Loading
            && self.items.iter().all(|item| {
                matches!(
                    self.image_status(ImageSlot::Card(item.id)),
                    ImageStatus::Loaded | ImageStatus::Failed | ImageStatus::Missing
                )
            })
            && self
                .images
                .values()
                .all(|image| image.status != ImageStatus::Loading)
            && !self.icons.values().any(|icon| *icon == IconStatus::Probing)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}
