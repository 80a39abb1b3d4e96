use crate::query::{category_options, filter_and_sort, manufacturer_options};
use crate::state::IconStatus;
use crate::{
    AppState, CatalogStatus, Filters, ImageSlot, ImageStatus, ItemId, ItemRecord,
    ManufacturerOptions, Toast,
};

pub const EMPTY_RESULT_MESSAGE: &str = "No weapons found matching your filters.";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading weapon data. Please check that data files exist.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogViewModel {
    pub status: CatalogStatus,
    pub total_count: usize,
    pub category_count: usize,
    pub displayed_count: usize,
    pub manufacturer_options: ManufacturerOptions,
    pub category_options: Vec<String>,
    pub filters: Filters,
    pub cards: Vec<CardView>,
    /// Set when the filters match nothing.
    pub empty_message: Option<&'static str>,
    pub banner: Option<BannerView>,
    pub detail: Option<DetailView>,
    pub toast: Option<Toast>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub year: i32,
    pub description: String,
    pub damage: f64,
    pub range: f64,
    pub fire_rate: f64,
    pub image: ImageView,
    /// One dot per variant; empty unless there are at least two.
    pub variant_dots: Vec<VariantChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub status: ImageStatus,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantChoice {
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconView {
    /// Existence not known yet.
    Pending,
    Shown(ImageView),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub manufacturer: String,
    pub icon: IconView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub label: &'static str,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub manufacturer: String,
    pub manufacturer_icon: IconView,
    pub year: i32,
    pub description: String,
    pub image: ImageView,
    /// Skin buttons; empty unless there are at least two variants.
    pub skins: Vec<VariantChoice>,
    pub stats: Vec<StatLine>,
    pub area_effects: Option<Vec<StatLine>>,
    pub scripts: Vec<ScriptLine>,
}

impl AppState {
    pub fn view(&self) -> CatalogViewModel {
        let mut view = CatalogViewModel {
            status: self.status.clone(),
            filters: self.filters.clone(),
            toast: self.toast.clone(),
            dirty: self.is_dirty(),
            ..CatalogViewModel::default()
        };
        if self.status != CatalogStatus::Ready {
            return view;
        }

        view.total_count = self.items.len();
        view.category_options = category_options(&self.items);
        view.category_count = view.category_options.len();
        view.manufacturer_options = manufacturer_options(&self.items);

        let shown = filter_and_sort(&self.items, &self.filters);
        view.displayed_count = shown.len();
        view.cards = shown.into_iter().map(|item| self.card_view(item)).collect();
        if view.cards.is_empty() {
            view.empty_message = Some(EMPTY_RESULT_MESSAGE);
        }

        view.banner = self.filters.manufacturer.as_ref().map(|manufacturer| BannerView {
            manufacturer: manufacturer.clone(),
            icon: self.icon_view(manufacturer, ImageSlot::Banner),
        });
        view.detail = self
            .modal
            .and_then(|modal| Some((modal, self.item(modal.item_id)?)))
            .map(|(modal, item)| self.detail_view(item, modal.selection));
        view
    }

    fn image_view(&self, slot: ImageSlot) -> ImageView {
        ImageView {
            status: self.image_status(slot),
            url: self
                .image_url(slot)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    fn choices(&self, id: ItemId, selected: usize) -> Vec<VariantChoice> {
        match self.variants(id) {
            Some(variants) if variants.len() > 1 => variants
                .iter()
                .enumerate()
                .map(|(index, variant)| VariantChoice {
                    label: variant.label.clone(),
                    active: index == selected,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn icon_view(&self, manufacturer: &str, slot: ImageSlot) -> IconView {
        match self.icons.get(manufacturer) {
            None | Some(IconStatus::Probing) => IconView::Pending,
            Some(IconStatus::Present(_)) => IconView::Shown(self.image_view(slot)),
            Some(IconStatus::Missing) => IconView::Missing,
        }
    }

    fn card_view(&self, item: &ItemRecord) -> CardView {
        let stats = item.stats_or_default();
        let selected = self.card_selection.get(&item.id).copied().unwrap_or(0);
        CardView {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
            year: item.year_of_manufacture,
            description: item.description.clone(),
            damage: stats.base_damage,
            range: stats.range,
            fire_rate: stats.fire_rate,
            image: self.image_view(ImageSlot::Card(item.id)),
            variant_dots: self.choices(item.id, selected),
        }
    }

    fn detail_view(&self, item: &ItemRecord, selection: usize) -> DetailView {
        let image = match self.variants(item.id) {
            Some([]) => ImageView {
                status: ImageStatus::Missing,
                url: None,
            },
            _ => self.image_view(ImageSlot::Modal(item.id)),
        };
        DetailView {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
            manufacturer: item.manufacturer.clone(),
            manufacturer_icon: self.icon_view(&item.manufacturer, ImageSlot::ModalIcon(item.id)),
            year: item.year_of_manufacture,
            description: item.description.clone(),
            image,
            skins: self.choices(item.id, selection),
            stats: stat_lines(item),
            area_effects: area_effect_lines(item),
            scripts: script_lines(item),
        }
    }
}

fn stat_lines(item: &ItemRecord) -> Vec<StatLine> {
    let stats = item.stats_or_default();
    let line = |label, value: String| StatLine { label, value };
    vec![
        line("Base Damage", number(stats.base_damage)),
        line("Crit Chance", format!("{}%", number(stats.crit_chance))),
        line("Armor Pen", number(stats.armor_penetration)),
        line("Range", format!("{}m", number(stats.range))),
        line("Fire Rate", number(stats.fire_rate)),
        line("Projectile Speed", number(stats.projectile_speed)),
        line("Explosion Radius", format!("{}m", number(stats.explosion_radius))),
        line(
            "Ammo Type",
            stats
                .ammo_type
                .filter(|ammo| !ammo.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        line("Ammo/Shot", number(stats.ammo_per_shot)),
    ]
}

fn area_effect_lines(item: &ItemRecord) -> Option<Vec<StatLine>> {
    let stats = item.stats.as_ref()?;
    if stats.aoe_tick_damage == 0.0 {
        return None;
    }
    Some(vec![
        StatLine {
            label: "Tick Damage",
            value: number(stats.aoe_tick_damage),
        },
        StatLine {
            label: "Duration",
            value: format!("{}s", number(stats.aoe_duration)),
        },
    ])
}

fn script_lines(item: &ItemRecord) -> Vec<ScriptLine> {
    let Some(scripts) = &item.scripts else {
        return Vec::new();
    };
    [
        ("On Fire", &scripts.on_fire),
        ("On Hit", &scripts.on_hit),
        ("On Crit", &scripts.on_crit),
        ("Passive", &scripts.passive),
    ]
    .into_iter()
    .filter_map(|(label, code)| {
        code.as_ref()
            .filter(|code| !code.is_empty())
            .map(|code| ScriptLine {
                label,
                code: code.clone(),
            })
    })
    .collect()
}

/// `45.0` renders as `45`, `0.5` as `0.5`.
fn number(value: f64) -> String {
    format!("{value}")
}
