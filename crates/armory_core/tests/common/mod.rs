#![allow(dead_code)]

use std::sync::Once;

use armory_core::{update, AppState, Effect, ItemRecord, ItemStats, Msg, Variant};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn item(id: u32, name: &str, manufacturer: &str, category: &str) -> ItemRecord {
    ItemRecord {
        id,
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        category: category.to_string(),
        description: format!("The {name}."),
        year_of_manufacture: 2280 + id as i32,
        stats: Some(ItemStats {
            base_damage: f64::from(id) * 10.0,
            range: 100.0,
            fire_rate: 2.5,
            ..ItemStats::default()
        }),
        scripts: None,
    }
}

pub fn catalog() -> Vec<ItemRecord> {
    vec![
        item(1, "5.56 Rifle", "Vektor Arms", "Rifle"),
        item(2, "Plasma-Cutter", "Rust Communion", "Tool"),
        item(3, "Needler", "Vektor Arms", "Pistol"),
    ]
}

pub fn variant(label: &str, file: &str) -> Variant {
    Variant {
        label: label.to_string(),
        url: format!("https://armory.test/art/weapons/{file}?v=1.0.0"),
    }
}

pub fn loaded(state: AppState) -> (AppState, Vec<Effect>) {
    update(state, Msg::DataLoaded(catalog()))
}

pub fn apply(state: AppState, msgs: impl IntoIterator<Item = Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter().fold((state, Vec::new()), |(state, mut all), msg| {
        let (next, effects) = update(state, msg);
        all.extend(effects);
        (next, all)
    })
}
