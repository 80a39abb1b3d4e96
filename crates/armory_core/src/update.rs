use crate::state::{IconStatus, ModalState, SlotImage};
use crate::{AppState, CatalogStatus, Effect, ImageSlot, ImageStatus, Msg, Surface, Toast};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    // A failed load is terminal: one error view, nothing else.
    if matches!(state.status, CatalogStatus::Failed(_)) && !matches!(msg, Msg::Tick | Msg::NoOp) {
        return (state, Vec::new());
    }

    let mut effects = Vec::new();
    match msg {
        Msg::DataLoaded(items) => {
            if state.status != CatalogStatus::Loading {
                return (state, effects);
            }
            state.status = CatalogStatus::Ready;
            state.items = items;
            effects.reserve(state.items.len() + 1);
            effects.extend(state.items.iter().map(|item| Effect::DiscoverVariants {
                item_id: item.id,
                name: item.name.clone(),
            }));
            if let Some(manufacturer) = state.filters.manufacturer.clone() {
                request_icon(&mut state, &manufacturer, ImageSlot::Banner, &mut effects);
            }
            state.mark_dirty();
        }
        Msg::DataLoadFailed(message) => {
            state.status = CatalogStatus::Failed(message);
            state.items.clear();
            state.mark_dirty();
        }
        Msg::ManufacturerFilterChanged(manufacturer) => {
            let manufacturer = manufacturer.filter(|m| !m.is_empty());
            if state.filters.manufacturer != manufacturer {
                state.filters.manufacturer = manufacturer.clone();
                state.images.remove(&ImageSlot::Banner);
                if let Some(manufacturer) = manufacturer {
                    if state.status == CatalogStatus::Ready {
                        request_icon(&mut state, &manufacturer, ImageSlot::Banner, &mut effects);
                    }
                }
                state.mark_dirty();
            }
        }
        Msg::CategoryFilterChanged(category) => {
            let category = category.filter(|c| !c.is_empty());
            if state.filters.category != category {
                state.filters.category = category;
                state.mark_dirty();
            }
        }
        Msg::SortChanged(sort_by) => {
            if state.filters.sort_by != sort_by {
                state.filters.sort_by = sort_by;
                state.mark_dirty();
            }
        }
        Msg::SearchChanged(search) => {
            if state.filters.search != search {
                state.filters.search = search;
                state.mark_dirty();
            }
        }
        Msg::SearchCleared => {
            if !state.filters.search.is_empty() {
                state.filters.search.clear();
                state.mark_dirty();
            }
        }
        Msg::VariantsDiscovered { item_id, variants } => {
            if state.item(item_id).is_none() {
                return (state, effects);
            }
            let first = variants.first().map(|variant| variant.url.clone());
            match &first {
                Some(url) => request_image(&mut state, ImageSlot::Card(item_id), url.clone(), &mut effects),
                None => {
                    state.images.insert(
                        ImageSlot::Card(item_id),
                        SlotImage {
                            url: String::new(),
                            status: ImageStatus::Missing,
                        },
                    );
                }
            }
            state.card_selection.insert(item_id, 0);
            if let Some(modal) = state.modal.as_mut().filter(|m| m.item_id == item_id) {
                modal.selection = 0;
                if let Some(url) = first {
                    request_image(&mut state, ImageSlot::Modal(item_id), url, &mut effects);
                }
            }
            state.variants.insert(item_id, variants);
            state.mark_dirty();
        }
        Msg::ManufacturerIconResolved { manufacturer, url } => {
            let status = match &url {
                Some(url) => IconStatus::Present(url.clone()),
                None => IconStatus::Missing,
            };
            state.icons.insert(manufacturer.clone(), status);
            if let Some(url) = url {
                if state.filters.manufacturer.as_deref() == Some(manufacturer.as_str()) {
                    request_image(&mut state, ImageSlot::Banner, url.clone(), &mut effects);
                }
                let open_for_maker = state
                    .open_item()
                    .filter(|id| state.item(*id).is_some_and(|item| item.manufacturer == manufacturer));
                if let Some(id) = open_for_maker {
                    request_image(&mut state, ImageSlot::ModalIcon(id), url, &mut effects);
                }
            }
            state.mark_dirty();
        }
        Msg::CardClicked(item_id) => {
            let Some(manufacturer) = state.item(item_id).map(|item| item.manufacturer.clone()) else {
                return (state, effects);
            };
            if let Some(previous) = state.modal.take() {
                drop_modal_slots(&mut state, previous);
            }
            state.modal = Some(ModalState {
                item_id,
                selection: 0,
            });
            let first = state
                .variants(item_id)
                .and_then(|variants| variants.first())
                .map(|variant| variant.url.clone());
            if let Some(url) = first {
                request_image(&mut state, ImageSlot::Modal(item_id), url, &mut effects);
            }
            if !manufacturer.is_empty() {
                request_icon(&mut state, &manufacturer, ImageSlot::ModalIcon(item_id), &mut effects);
            }
            state.mark_dirty();
        }
        Msg::ModalClosed => {
            if let Some(modal) = state.modal.take() {
                drop_modal_slots(&mut state, modal);
                state.mark_dirty();
            }
        }
        Msg::VariantSelected {
            surface,
            item_id,
            index,
        } => {
            let Some(url) = state
                .variants(item_id)
                .and_then(|variants| variants.get(index))
                .map(|variant| variant.url.clone())
            else {
                return (state, effects);
            };
            match surface {
                Surface::Card => {
                    state.card_selection.insert(item_id, index);
                    request_image(&mut state, ImageSlot::Card(item_id), url, &mut effects);
                    state.mark_dirty();
                }
                Surface::Modal => {
                    if let Some(modal) = state.modal.as_mut().filter(|m| m.item_id == item_id) {
                        modal.selection = index;
                        request_image(&mut state, ImageSlot::Modal(item_id), url, &mut effects);
                        state.mark_dirty();
                    }
                }
            }
        }
        Msg::ImageLoaded { slot, url } => settle(&mut state, slot, &url, ImageStatus::Loaded),
        Msg::ImageFailed { slot, url } => settle(&mut state, slot, &url, ImageStatus::Failed),
        Msg::MissingImageClicked { expected, tried } => {
            show_toast(
                &mut state,
                "Missing Image",
                vec![format!("Expected: {expected}"), format!("Tried {tried} variations")],
            );
        }
        Msg::MissingIconClicked { expected } => {
            show_toast(&mut state, "Missing Icon", vec![format!("Expected: {expected}")]);
        }
        Msg::ToastDismissed => {
            if state.toast.take().is_some() {
                state.mark_dirty();
            }
        }
        Msg::Tick | Msg::NoOp => {}
    }

    (state, effects)
}

fn request_image(state: &mut AppState, slot: ImageSlot, url: String, effects: &mut Vec<Effect>) {
    state.images.insert(
        slot,
        SlotImage {
            url: url.clone(),
            status: ImageStatus::Loading,
        },
    );
    effects.push(Effect::LoadImage { slot, url });
}

/// Probes once per manufacturer; later requests reuse the answer.
fn request_icon(state: &mut AppState, manufacturer: &str, slot: ImageSlot, effects: &mut Vec<Effect>) {
    match state.icons.get(manufacturer).cloned() {
        None => {
            state
                .icons
                .insert(manufacturer.to_string(), IconStatus::Probing);
            effects.push(Effect::ProbeManufacturerIcon {
                manufacturer: manufacturer.to_string(),
            });
        }
        Some(IconStatus::Present(url)) => request_image(state, slot, url, effects),
        Some(IconStatus::Probing | IconStatus::Missing) => {}
    }
}

/// Completions only count for the URL the slot is currently waiting on.
fn settle(state: &mut AppState, slot: ImageSlot, url: &str, outcome: ImageStatus) {
    if let Some(image) = state.images.get_mut(&slot) {
        if image.url == url && image.status == ImageStatus::Loading {
            image.status = outcome;
            state.mark_dirty();
        }
    }
}

fn drop_modal_slots(state: &mut AppState, modal: ModalState) {
    state.images.remove(&ImageSlot::Modal(modal.item_id));
    state.images.remove(&ImageSlot::ModalIcon(modal.item_id));
}

fn show_toast(state: &mut AppState, title: &str, lines: Vec<String>) {
    state.toast = Some(Toast {
        title: title.to_string(),
        lines,
    });
    state.mark_dirty();
}
