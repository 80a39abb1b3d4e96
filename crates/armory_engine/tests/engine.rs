use std::path::Path;
use std::time::{Duration, Instant};

use armory_engine::{
    DataLoadError, EngineConfig, EngineEvent, EngineHandle, FailureKind, LoadStage, RetryPolicy,
    VariantRecord, VariantTag,
};
use pretty_assertions::assert_eq;
use url::Url;

fn write(root: &Path, relative: &str, body: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, body).expect("write");
}

fn engine_for(root: &Path) -> EngineHandle {
    let base = Url::from_directory_path(root).expect("dir url");
    let mut config = EngineConfig::for_site(base);
    config.retry = RetryPolicy {
        max_retries: 3,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2,
    };
    EngineHandle::new(config).expect("engine")
}

fn wait_for<T>(engine: &EngineHandle, mut pick: impl FnMut(EngineEvent) -> Option<T>) -> T {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
            if let Some(found) = pick(event) {
                return found;
            }
        }
    }
    panic!("engine event did not arrive in time");
}

#[test]
fn catalog_files_are_fetched_together() {
    let site = tempfile::tempdir().expect("tempdir");
    write(site.path(), "data/weapons_generic.json", br#"{"weapons":[]}"#);
    write(site.path(), "data/weapons_faction.json", br#"{"weapons":[{"id":1}]}"#);
    let engine = engine_for(site.path());

    engine.load_catalog();
    let result = wait_for(&engine, |event| match event {
        EngineEvent::CatalogFetched(result) => Some(result),
        _ => None,
    });
    let bytes = result.expect("catalog");
    assert_eq!(&bytes.generic[..], br#"{"weapons":[]}"#);
    assert_eq!(&bytes.faction[..], br#"{"weapons":[{"id":1}]}"#);
}

#[test]
fn missing_catalog_file_fails_the_load() {
    let site = tempfile::tempdir().expect("tempdir");
    write(site.path(), "data/weapons_generic.json", br#"{"weapons":[]}"#);
    let engine = engine_for(site.path());

    engine.load_catalog();
    let result = wait_for(&engine, |event| match event {
        EngineEvent::CatalogFetched(result) => Some(result),
        _ => None,
    });
    match result {
        Err(DataLoadError::Fetch { path, source }) => {
            assert_eq!(path, "data/weapons_faction.json");
            assert_eq!(source.kind, FailureKind::NotFound);
        }
        Ok(_) => panic!("load should fail"),
    }
}

#[test]
fn discovered_variant_loads_through_the_loader() {
    let site = tempfile::tempdir().expect("tempdir");
    write(site.path(), "art/weapons/Needler.png", b"png");
    write(site.path(), "art/weapons/Needler_b.png", b"png");
    let engine = engine_for(site.path());

    engine.discover_variants(7, "Needler");
    let (item_id, variants) = wait_for(&engine, |event| match event {
        EngineEvent::VariantsDiscovered { item_id, variants } => Some((item_id, variants)),
        _ => None,
    });
    assert_eq!(item_id, 7);
    assert_eq!(
        variants,
        vec![
            VariantRecord {
                tag: VariantTag::Default,
                resolved_path: "Needler.png".to_string(),
            },
            VariantRecord {
                tag: VariantTag::B,
                resolved_path: "Needler_b.png".to_string(),
            },
        ]
    );

    let url = engine.variant_url(&variants[1]).expect("variant url");
    assert!(url.ends_with("/art/weapons/Needler_b.png?v=1.0.0"), "{url}");
    engine.load_image(42, url.clone());
    let event = wait_for(&engine, |event| match event {
        EngineEvent::Image(load) => Some(load),
        _ => None,
    });
    assert_eq!(event.consumer, 42);
    assert_eq!(event.url, url);
    assert_eq!(event.stage, LoadStage::Succeeded);
}

#[test]
fn unreachable_image_reports_failure_once() {
    let site = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(site.path());

    let url = engine
        .variant_url(&VariantRecord {
            tag: VariantTag::Default,
            resolved_path: "Vanished.png".to_string(),
        })
        .expect("variant url");
    engine.load_image(3, url.clone());
    let event = wait_for(&engine, |event| match event {
        EngineEvent::Image(load) => Some(load),
        _ => None,
    });
    assert_eq!(event.consumer, 3);
    assert_eq!(event.url, url);
    assert_eq!(event.stage, LoadStage::Failed);
    assert!(engine.recv_timeout(Duration::from_millis(200)).is_none());
}

#[test]
fn manufacturer_icon_probe_reports_presence() {
    let site = tempfile::tempdir().expect("tempdir");
    write(site.path(), "art/guilds/Vektor_Arms.png", b"png");
    let engine = engine_for(site.path());

    engine.probe_manufacturer_icon("Vektor Arms");
    engine.probe_manufacturer_icon("Nobody Inc");
    let mut resolved = Vec::new();
    while resolved.len() < 2 {
        resolved.push(wait_for(&engine, |event| match event {
            EngineEvent::ManufacturerIconResolved { manufacturer, url } => {
                Some((manufacturer, url.is_some()))
            }
            _ => None,
        }));
    }
    resolved.sort();
    assert_eq!(
        resolved,
        vec![
            ("Nobody Inc".to_string(), false),
            ("Vektor Arms".to_string(), true),
        ]
    );
}

#[test]
fn hints_describe_the_expected_file() {
    let site = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(site.path());

    let hint = engine.missing_image_hint("Plasma-Cutter");
    assert_eq!(hint.expected, "weapons/Plasma_Cutter.png");
    assert_eq!(hint.tried, 7);
    let icon = engine.missing_icon_hint("Vektor Arms");
    assert_eq!(icon.expected, "guilds/Vektor_Arms.png");
}
