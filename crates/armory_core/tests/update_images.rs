mod common;

use armory_core::{
    update, AppState, Effect, IconView, ImageSlot, ImageStatus, Msg, Surface, VariantChoice,
};
use common::{apply, init_logging, loaded, variant};
use pretty_assertions::assert_eq;

fn choice(label: &str, active: bool) -> VariantChoice {
    VariantChoice {
        label: label.to_string(),
        active,
    }
}

fn load(slot: ImageSlot, file: &str) -> Effect {
    Effect::LoadImage {
        slot,
        url: variant("", file).url,
    }
}

#[test]
fn discovered_variants_load_first_into_card() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let (state, effects) = apply(
        state,
        [
            Msg::VariantsDiscovered {
                item_id: 1,
                variants: vec![],
            },
            Msg::VariantsDiscovered {
                item_id: 2,
                variants: vec![variant("Default", "plasma_cutter.png")],
            },
            Msg::VariantsDiscovered {
                item_id: 3,
                variants: vec![
                    variant("Default", "Needler.png"),
                    variant("B", "Needler_b.png"),
                ],
            },
        ],
    );
    assert_eq!(
        effects,
        vec![
            load(ImageSlot::Card(2), "plasma_cutter.png"),
            load(ImageSlot::Card(3), "Needler.png"),
        ]
    );

    let view = state.view();
    assert_eq!(view.cards[0].image.status, ImageStatus::Missing);
    assert_eq!(view.cards[0].image.url, None);
    assert_eq!(view.cards[1].image.status, ImageStatus::Loading);
    assert!(view.cards[1].variant_dots.is_empty());
    assert_eq!(
        view.cards[2].variant_dots,
        vec![choice("Default", true), choice("B", false)]
    );
    assert!(!state.images_settled());
}

#[test]
fn stale_completion_is_ignored_after_switching_variant() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let default = variant("Default", "Needler.png");
    let alt = variant("B", "Needler_b.png");
    let (state, _) = update(
        state,
        Msg::VariantsDiscovered {
            item_id: 3,
            variants: vec![default.clone(), alt.clone()],
        },
    );
    let (state, effects) = update(
        state,
        Msg::VariantSelected {
            surface: Surface::Card,
            item_id: 3,
            index: 1,
        },
    );
    assert_eq!(effects, vec![load(ImageSlot::Card(3), "Needler_b.png")]);

    let (mut state, _) = update(
        state,
        Msg::ImageFailed {
            slot: ImageSlot::Card(3),
            url: default.url,
        },
    );
    assert_eq!(state.image_status(ImageSlot::Card(3)), ImageStatus::Loading);
    state.consume_dirty();

    let (mut state, _) = update(
        state,
        Msg::ImageLoaded {
            slot: ImageSlot::Card(3),
            url: alt.url.clone(),
        },
    );
    assert!(state.consume_dirty());
    let card = state.view().cards.into_iter().find(|c| c.id == 3).expect("card");
    assert_eq!(card.image.status, ImageStatus::Loaded);
    assert_eq!(card.image.url, Some(alt.url));
    assert_eq!(card.variant_dots, vec![choice("Default", false), choice("B", true)]);
}

#[test]
fn out_of_range_selection_is_ignored() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let (state, _) = update(
        state,
        Msg::VariantsDiscovered {
            item_id: 3,
            variants: vec![variant("Default", "Needler.png")],
        },
    );
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::VariantSelected {
            surface: Surface::Card,
            item_id: 3,
            index: 4,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn opening_detail_loads_image_and_icon() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let (state, _) = update(
        state,
        Msg::VariantsDiscovered {
            item_id: 3,
            variants: vec![
                variant("Default", "Needler.png"),
                variant("A", "Needler_a.png"),
            ],
        },
    );
    let (state, effects) = update(state, Msg::CardClicked(3));
    assert_eq!(
        effects,
        vec![
            load(ImageSlot::Modal(3), "Needler.png"),
            Effect::ProbeManufacturerIcon {
                manufacturer: "Vektor Arms".to_string(),
            },
        ]
    );

    let icon = "https://armory.test/art/guilds/Vektor_Arms.png?v=1.0.0".to_string();
    let (state, effects) = update(
        state,
        Msg::ManufacturerIconResolved {
            manufacturer: "Vektor Arms".into(),
            url: Some(icon.clone()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadImage {
            slot: ImageSlot::ModalIcon(3),
            url: icon,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::VariantSelected {
            surface: Surface::Modal,
            item_id: 3,
            index: 1,
        },
    );
    assert_eq!(effects, vec![load(ImageSlot::Modal(3), "Needler_a.png")]);

    let detail = state.view().detail.expect("detail");
    assert_eq!(detail.name, "Needler");
    assert_eq!(detail.skins, vec![choice("Default", false), choice("A", true)]);
    assert_eq!(detail.image.status, ImageStatus::Loading);
    assert!(matches!(detail.manufacturer_icon, IconView::Shown(_)));
    assert_eq!(detail.stats.len(), 9);
    assert_eq!(detail.stats[0].label, "Base Damage");
    assert_eq!(detail.stats[0].value, "30");
    assert_eq!(detail.stats[3].value, "100m");
    assert_eq!(detail.stats[7].value, "N/A");
    assert_eq!(detail.area_effects, None);
    assert!(detail.scripts.is_empty());
    // The card keeps its own selection.
    let card = state.view().cards.into_iter().find(|c| c.id == 3).expect("card");
    assert_eq!(card.variant_dots[0], choice("Default", true));
}

#[test]
fn detail_opened_before_discovery_loads_when_variants_arrive() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let (state, effects) = update(state, Msg::CardClicked(2));
    assert_eq!(
        effects,
        vec![Effect::ProbeManufacturerIcon {
            manufacturer: "Rust Communion".to_string(),
        }]
    );
    assert_eq!(
        state.view().detail.expect("detail").image.status,
        ImageStatus::Pending
    );

    let (state, effects) = update(
        state,
        Msg::VariantsDiscovered {
            item_id: 2,
            variants: vec![variant("Default", "plasma_cutter.png")],
        },
    );
    assert_eq!(
        effects,
        vec![
            load(ImageSlot::Card(2), "plasma_cutter.png"),
            load(ImageSlot::Modal(2), "plasma_cutter.png"),
        ]
    );
}

#[test]
fn closed_detail_ignores_late_completions() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let needler = variant("Default", "Needler.png");
    let (state, _) = apply(
        state,
        [
            Msg::VariantsDiscovered {
                item_id: 3,
                variants: vec![needler.clone()],
            },
            Msg::CardClicked(3),
            Msg::ModalClosed,
        ],
    );
    assert_eq!(state.open_item(), None);
    assert_eq!(state.image_status(ImageSlot::Modal(3)), ImageStatus::Pending);

    let (mut state, _) = update(
        state,
        Msg::ImageLoaded {
            slot: ImageSlot::Card(3),
            url: needler.url.clone(),
        },
    );
    state.consume_dirty();
    let (mut state, effects) = update(
        state,
        Msg::ImageLoaded {
            slot: ImageSlot::Modal(3),
            url: needler.url,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(state.image_status(ImageSlot::Modal(3)), ImageStatus::Pending);
    assert_eq!(state.image_status(ImageSlot::Card(3)), ImageStatus::Loaded);
}

#[test]
fn settles_when_every_card_is_resolved() {
    init_logging();
    let (state, _) = loaded(AppState::new());
    let rifle = variant("Default", "5_56_Rifle.png");
    let cutter = variant("Default", "plasma_cutter.png");
    let (state, _) = apply(
        state,
        [
            Msg::VariantsDiscovered {
                item_id: 1,
                variants: vec![rifle.clone()],
            },
            Msg::VariantsDiscovered {
                item_id: 2,
                variants: vec![cutter.clone()],
            },
            Msg::VariantsDiscovered {
                item_id: 3,
                variants: vec![],
            },
            Msg::ImageFailed {
                slot: ImageSlot::Card(1),
                url: rifle.url,
            },
        ],
    );
    assert!(!state.images_settled());
    let (state, _) = update(
        state,
        Msg::ImageLoaded {
            slot: ImageSlot::Card(2),
            url: cutter.url,
        },
    );
    assert!(state.images_settled());
    assert_eq!(state.view().cards[0].image.status, ImageStatus::Failed);
}
