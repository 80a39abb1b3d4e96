use serde::{Deserialize, Deserializer};

pub type ItemId = u32;

/// One catalog entry as stored in the data files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year_of_manufacture: i32,
    #[serde(default)]
    pub stats: Option<ItemStats>,
    #[serde(default)]
    pub scripts: Option<ItemScripts>,
}

impl ItemRecord {
    pub fn stats_or_default(&self) -> ItemStats {
        self.stats.clone().unwrap_or_default()
    }
}

/// Missing or `null` numeric stats read as zero.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemStats {
    #[serde(deserialize_with = "null_as_default")]
    pub base_damage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub crit_chance: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub armor_penetration: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub range: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub fire_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub projectile_speed: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub explosion_radius: f64,
    pub ammo_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ammo_per_shot: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub aoe_tick_damage: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub aoe_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemScripts {
    pub on_fire: Option<String>,
    pub on_hit: Option<String>,
    pub on_crit: Option<String>,
    pub passive: Option<String>,
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    weapons: Vec<ItemRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{document} is not a valid catalog document: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses both data documents and concatenates them, generic entries first.
pub fn parse_catalog(generic: &[u8], faction: &[u8]) -> Result<Vec<ItemRecord>, CatalogError> {
    let mut items = parse_document("generic data", generic)?;
    items.extend(parse_document("faction data", faction)?);
    Ok(items)
}

fn parse_document(document: &'static str, bytes: &[u8]) -> Result<Vec<ItemRecord>, CatalogError> {
    serde_json::from_slice::<CatalogDocument>(bytes)
        .map(|doc| doc.weapons)
        .map_err(|source| CatalogError::Parse { document, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERIC: &str = r#"{
        "weapons": [
            {
                "id": 1,
                "name": "5.56 Rifle",
                "manufacturer": "Vektor Arms",
                "category": "Rifle",
                "description": "Standard issue.",
                "yearOfManufacture": 2281,
                "stats": { "baseDamage": 32, "critChance": 5, "range": 400, "ammoType": "5.56mm" },
                "scripts": { "onFire": "", "onHit": "bleed(2)" }
            }
        ]
    }"#;

    const FACTION: &str = r#"{ "weapons": [ { "id": 40, "name": "Plasma-Cutter" } ] }"#;

    #[test]
    fn merges_generic_before_faction() {
        let items = parse_catalog(GENERIC.as_bytes(), FACTION.as_bytes()).unwrap();
        let ids: Vec<_> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 40]);

        let rifle = &items[0];
        assert_eq!(rifle.year_of_manufacture, 2281);
        let stats = rifle.stats_or_default();
        assert_eq!(stats.base_damage, 32.0);
        assert_eq!(stats.fire_rate, 0.0);
        assert_eq!(stats.ammo_type.as_deref(), Some("5.56mm"));
        let scripts = rifle.scripts.clone().unwrap();
        assert_eq!(scripts.on_hit.as_deref(), Some("bleed(2)"));
        assert_eq!(scripts.passive, None);
    }

    #[test]
    fn sparse_records_default_their_fields() {
        let items = parse_catalog(FACTION.as_bytes(), br#"{"weapons":[]}"#).unwrap();
        assert_eq!(items[0].manufacturer, "");
        assert_eq!(items[0].stats, None);
        assert_eq!(items[0].stats_or_default(), ItemStats::default());
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let doc = br#"{ "weapons": [ {
            "id": 7,
            "name": "Rivet Gun",
            "manufacturer": null,
            "yearOfManufacture": null,
            "stats": { "baseDamage": 18, "explosionRadius": null, "ammoType": null }
        } ] }"#;
        let items = parse_catalog(doc, br#"{"weapons":[]}"#).unwrap();
        let gun = &items[0];
        assert_eq!(gun.manufacturer, "");
        assert_eq!(gun.year_of_manufacture, 0);
        let stats = gun.stats_or_default();
        assert_eq!(stats.base_damage, 18.0);
        assert_eq!(stats.explosion_radius, 0.0);
        assert_eq!(stats.ammo_type, None);
    }

    #[test]
    fn malformed_document_names_the_file() {
        let err = parse_catalog(GENERIC.as_bytes(), b"{\"weapons\": 3}").unwrap_err();
        assert!(err.to_string().starts_with("faction data is not a valid catalog document"));
    }
}
