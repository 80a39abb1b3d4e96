use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::record::ItemRecord;

/// Manufacturers listed under the faction divider of the manufacturer filter.
pub const FACTION_MANUFACTURERS: [&str; 13] = [
    "Black Vein Syndicate",
    "Chimera Protocol",
    "Glass Harbor Collective",
    "Harvest Guild",
    "HelioCrypt Overmind",
    "Nexus Archives",
    "Night Censors",
    "Null Sanctum",
    "Pillar Ascendancy",
    "Proxy Choir",
    "Radial Swarm",
    "Rust Communion",
    "Undercurrent Union",
];

pub fn is_faction_manufacturer(manufacturer: &str) -> bool {
    FACTION_MANUFACTURERS.contains(&manufacturer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    /// Newest first.
    Year,
    YearAsc,
    /// Highest first.
    Damage,
    /// Longest first.
    Range,
    Manufacturer,
    Category,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Year,
        SortKey::YearAsc,
        SortKey::Damage,
        SortKey::Range,
        SortKey::Manufacturer,
        SortKey::Category,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Year => "year",
            SortKey::YearAsc => "year-asc",
            SortKey::Damage => "damage",
            SortKey::Range => "range",
            SortKey::Manufacturer => "manufacturer",
            SortKey::Category => "category",
        }
    }

    fn compare(self, a: &ItemRecord, b: &ItemRecord) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::Year => b.year_of_manufacture.cmp(&a.year_of_manufacture),
            SortKey::YearAsc => a.year_of_manufacture.cmp(&b.year_of_manufacture),
            SortKey::Damage => damage(b).total_cmp(&damage(a)),
            SortKey::Range => range(b).total_cmp(&range(a)),
            SortKey::Manufacturer => compare_text(&a.manufacturer, &b.manufacturer),
            SortKey::Category => compare_text(&a.category, &b.category),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key {0:?}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownSortKey(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    /// `None` shows every manufacturer.
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub search: String,
    pub sort_by: SortKey,
}

impl Filters {
    pub fn matches(&self, item: &ItemRecord) -> bool {
        if let Some(manufacturer) = &self.manufacturer {
            if &item.manufacturer != manufacturer {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [&item.name, &item.description, &item.manufacturer]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Items passing `filters`, in `filters.sort_by` order. The sort is stable.
pub fn filter_and_sort<'a>(items: &'a [ItemRecord], filters: &Filters) -> Vec<&'a ItemRecord> {
    let mut shown: Vec<_> = items.iter().filter(|item| filters.matches(item)).collect();
    shown.sort_by(|a, b| filters.sort_by.compare(a, b));
    shown
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManufacturerOptions {
    pub generic: Vec<String>,
    pub faction: Vec<String>,
}

pub fn manufacturer_options(items: &[ItemRecord]) -> ManufacturerOptions {
    let unique: BTreeSet<&str> = items.iter().map(|item| item.manufacturer.as_str()).collect();
    let (faction, generic): (Vec<_>, Vec<_>) = unique
        .into_iter()
        .map(str::to_string)
        .partition(|m| is_faction_manufacturer(m));
    ManufacturerOptions { generic, faction }
}

pub fn category_options(items: &[ItemRecord]) -> Vec<String> {
    let unique: BTreeSet<&str> = items.iter().map(|item| item.category.as_str()).collect();
    unique.into_iter().map(str::to_string).collect()
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn damage(item: &ItemRecord) -> f64 {
    item.stats.as_ref().map_or(0.0, |s| s.base_damage)
}

fn range(item: &ItemRecord) -> f64 {
    item.stats.as_ref().map_or(0.0, |s| s.range)
}
