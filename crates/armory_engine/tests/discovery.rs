use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use armory_engine::{
    AssetLayout, AssetProbe, FetchError, FetchSettings, ProbeCache, SiteFetcher, SiteProbe,
    VariantDiscovery, VariantRecord, VariantTag,
};
use pretty_assertions::assert_eq;
use url::Url;

const SITE: &str = "https://armory.test/";

/// Answers from a fixed set of filenames under the weapon and guild dirs and
/// records every URL it was asked about.
struct StoreProbe {
    present: HashSet<String>,
    asked: Mutex<Vec<String>>,
}

impl StoreProbe {
    fn with(files: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            present: files.iter().map(|f| format!("{SITE}{f}")).collect(),
            asked: Mutex::new(Vec::new()),
        })
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AssetProbe for StoreProbe {
    async fn exists(&self, url: &str) -> Result<bool, FetchError> {
        self.asked.lock().unwrap().push(url.to_string());
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(self.present.contains(url))
    }
}

fn discovery(probe: Arc<StoreProbe>) -> VariantDiscovery {
    let layout = AssetLayout::new(Url::parse(SITE).expect("site url"));
    VariantDiscovery::new(Arc::new(ProbeCache::new(probe)), Arc::new(layout))
}

fn record(tag: VariantTag, path: &str) -> VariantRecord {
    VariantRecord {
        tag,
        resolved_path: path.to_string(),
    }
}

#[tokio::test]
async fn missing_tag_leaves_a_gap_without_breaking_order() {
    let probe = StoreProbe::with(&[
        "art/weapons/Fluxline_G3.png",
        "art/weapons/Fluxline_g3_b.png",
    ]);
    let discovery = discovery(probe.clone());

    let variants = discovery.discover("Fluxline G3").await;
    assert_eq!(
        variants,
        vec![
            record(VariantTag::Default, "Fluxline_G3.png"),
            record(VariantTag::B, "Fluxline_g3_b.png"),
        ]
    );

    let asked = probe.asked();
    let weapon = |file: &str| format!("{SITE}art/weapons/{file}");
    // Default hits on its first candidate, every `_a` candidate misses, and
    // `_b` stops at its third.
    assert_eq!(asked[0], weapon("Fluxline_G3.png"));
    assert_eq!(asked[1], weapon("Fluxline_G3_a.png"));
    assert_eq!(asked[6], weapon("fluxline_g3_a.png"));
    assert_eq!(asked[7], weapon("Fluxline_G3_b.png"));
    assert_eq!(asked[9], weapon("Fluxline_g3_b.png"));
    assert_eq!(asked[10], weapon("Fluxline_G3_c.png"));
    assert_eq!(asked.len(), 22);
}

#[tokio::test]
async fn store_with_only_lowercase_file() {
    let probe = StoreProbe::with(&["art/weapons/plasma_cutter.png"]);
    let discovery = discovery(probe);

    assert!(discovery.discover("5.56 Rifle").await.is_empty());
    let variants = discovery.discover("Plasma-Cutter").await;
    assert_eq!(
        variants,
        vec![record(VariantTag::Default, "plasma_cutter.png")]
    );
    assert_eq!(
        discovery.layout().variant_load_url(&variants[0]).expect("url"),
        "https://armory.test/art/weapons/plasma_cutter.png?v=1.0.0"
    );
}

#[tokio::test]
async fn repeat_discovery_is_served_from_cache() {
    let probe = StoreProbe::with(&["art/weapons/Needler.png", "art/weapons/Needler_c.png"]);
    let discovery = discovery(probe.clone());

    let first = discovery.discover("Needler").await;
    let checks = probe.asked().len();
    let second = discovery.discover("Needler").await;

    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            record(VariantTag::Default, "Needler.png"),
            record(VariantTag::C, "Needler_c.png"),
        ]
    );
    assert_eq!(probe.asked().len(), checks);
}

#[tokio::test]
async fn concurrent_discoveries_share_probes() {
    let probe = StoreProbe::with(&["art/weapons/Rivet_Gun_a.png"]);
    let discovery = discovery(probe.clone());

    let (left, right) = tokio::join!(discovery.discover("Rivet Gun"), discovery.discover("Rivet Gun"));
    assert_eq!(left, right);
    assert_eq!(left, vec![record(VariantTag::A, "Rivet_Gun_a.png")]);

    let asked = probe.asked();
    let unique: HashSet<_> = asked.iter().collect();
    assert_eq!(asked.len(), unique.len());
}

#[tokio::test]
async fn manufacturer_icon_resolves_only_when_present() {
    let probe = StoreProbe::with(&["art/guilds/Vektor_Arms.png"]);
    let discovery = discovery(probe);

    assert_eq!(
        discovery.resolve_manufacturer_icon("Vektor Arms").await.as_deref(),
        Some("https://armory.test/art/guilds/Vektor_Arms.png")
    );
    assert_eq!(discovery.resolve_manufacturer_icon("Nobody Inc").await, None);
}

#[tokio::test]
async fn local_site_directory_is_probed_on_disk() {
    let site = tempfile::tempdir().expect("tempdir");
    let weapons = site.path().join("art").join("weapons");
    std::fs::create_dir_all(&weapons).expect("mkdir");
    std::fs::write(weapons.join("Arcline_Shock_baton.png"), b"png").expect("write");
    std::fs::write(weapons.join("Arcline_Shock_Baton-sheet_a.png"), b"png").expect("write");

    let base = Url::from_directory_path(site.path()).expect("dir url");
    let fetcher = SiteFetcher::new(FetchSettings::images()).expect("client");
    let discovery = VariantDiscovery::new(
        Arc::new(ProbeCache::new(Arc::new(SiteProbe::new(fetcher)))),
        Arc::new(AssetLayout::new(base)),
    );

    let variants = discovery.discover("Arcline Shock Baton").await;
    assert_eq!(
        variants,
        vec![
            record(VariantTag::Default, "Arcline_Shock_baton.png"),
            record(VariantTag::A, "Arcline_Shock_Baton-sheet_a.png"),
        ]
    );
}
