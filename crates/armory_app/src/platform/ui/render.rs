use armory_core::{
    BannerView, CardView, CatalogStatus, CatalogViewModel, DetailView, IconView, ImageStatus,
    ImageView, Toast, VariantChoice, LOAD_ERROR_MESSAGE,
};

use super::constants::*;

/// Renders the whole view as terminal text, one entry per line.
pub fn render(view: &CatalogViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    match &view.status {
        CatalogStatus::Loading => {
            lines.push("Loading weapon data...".to_string());
            return lines;
        }
        CatalogStatus::Failed(_) => {
            lines.push(LOAD_ERROR_MESSAGE.to_string());
            return lines;
        }
        CatalogStatus::Ready => {}
    }

    lines.push(format!(
        "Armory: {} weapons | {} categories | showing {}",
        view.total_count, view.category_count, view.displayed_count
    ));
    lines.push(filter_line(view));
    lines.push(manufacturer_line(view));
    lines.push(format!("Categories: {}", view.category_options.join(", ")));
    lines.push(RULE.to_string());

    if let Some(banner) = &view.banner {
        lines.push(banner_line(banner));
        lines.push(RULE.to_string());
    }

    if let Some(message) = view.empty_message {
        lines.push(message.to_string());
    }
    for card in &view.cards {
        render_card(card, &mut lines);
    }

    if let Some(detail) = &view.detail {
        lines.push(RULE.to_string());
        render_detail(detail, &mut lines);
    }
    if let Some(toast) = &view.toast {
        lines.push(RULE.to_string());
        lines.extend(toast_lines(toast));
    }
    lines
}

fn filter_line(view: &CatalogViewModel) -> String {
    let filters = &view.filters;
    format!(
        "Manufacturer: {} | Category: {} | Sort: {} | Search: {:?}",
        filters.manufacturer.as_deref().unwrap_or("All"),
        filters.category.as_deref().unwrap_or("All"),
        filters.sort_by,
        filters.search
    )
}

fn manufacturer_line(view: &CatalogViewModel) -> String {
    let options = &view.manufacturer_options;
    let mut line = format!("Manufacturers: {}", options.generic.join(", "));
    if !options.faction.is_empty() {
        line.push_str(&format!(" {FACTION_SEPARATOR} {}", options.faction.join(", ")));
    }
    line
}

fn banner_line(banner: &BannerView) -> String {
    format!("{} {}", icon_text(&banner.icon), banner.manufacturer)
}

fn render_card(card: &CardView, lines: &mut Vec<String>) {
    lines.push(format!(
        "#{} {} [{}] {}",
        card.id, card.name, card.category, card.year
    ));
    lines.push(format!("    {}", image_text(&card.image)));
    if !card.variant_dots.is_empty() {
        lines.push(format!("    {}", dots(&card.variant_dots)));
    }
    lines.push(format!(
        "    Damage {} | Range {}m | Fire rate {}",
        card.damage, card.range, card.fire_rate
    ));
    if !card.description.is_empty() {
        lines.push(format!("    {}", card.description));
    }
}

fn render_detail(detail: &DetailView, lines: &mut Vec<String>) {
    lines.push(format!("{} (#{})", detail.name, detail.id));
    lines.push(format!(
        "{} | {} {} | {}",
        detail.category,
        icon_text(&detail.manufacturer_icon),
        detail.manufacturer,
        detail.year
    ));
    lines.push(format!("Image: {}", image_text(&detail.image)));
    if !detail.skins.is_empty() {
        let skins: Vec<String> = detail
            .skins
            .iter()
            .map(|skin| {
                if skin.active {
                    format!("[{}]", skin.label)
                } else {
                    skin.label.clone()
                }
            })
            .collect();
        lines.push(format!("Skins: {}", skins.join(" ")));
    }
    if !detail.description.is_empty() {
        lines.push(detail.description.clone());
    }
    lines.push("Stats".to_string());
    for stat in &detail.stats {
        lines.push(format!("  {}: {}", stat.label, stat.value));
    }
    if let Some(area) = &detail.area_effects {
        lines.push("Area Effects".to_string());
        for stat in area {
            lines.push(format!("  {}: {}", stat.label, stat.value));
        }
    }
    if !detail.scripts.is_empty() {
        lines.push("Scripts".to_string());
        for script in &detail.scripts {
            lines.push(format!("  {}: {}", script.label, script.code));
        }
    }
}

pub fn toast_lines(toast: &Toast) -> Vec<String> {
    let mut lines = vec![format!("! {}", toast.title)];
    lines.extend(toast.lines.iter().map(|line| format!("  {line}")));
    lines
}

fn image_text(image: &ImageView) -> String {
    let url = image.url.as_deref().unwrap_or("");
    match image.status {
        ImageStatus::Pending => format!("{PLACEHOLDER_GLYPH} pending"),
        ImageStatus::Loading => format!("{PLACEHOLDER_GLYPH} loading {url}"),
        ImageStatus::Loaded => url.to_string(),
        ImageStatus::Failed => format!("{PLACEHOLDER_GLYPH} failed {url}"),
        ImageStatus::Missing => format!("{MISSING_GLYPH} image missing"),
    }
}

fn icon_text(icon: &IconView) -> String {
    match icon {
        IconView::Pending => ICON_PLACEHOLDER_GLYPH.to_string(),
        IconView::Shown(image) if image.status == ImageStatus::Loaded => {
            format!("<{}>", image.url.as_deref().unwrap_or(""))
        }
        IconView::Shown(_) => ICON_PLACEHOLDER_GLYPH.to_string(),
        IconView::Missing => MISSING_GLYPH.to_string(),
    }
}

fn dots(choices: &[VariantChoice]) -> String {
    choices
        .iter()
        .map(|choice| if choice.active { DOT_ACTIVE } else { DOT_INACTIVE })
        .collect::<Vec<_>>()
        .join(" ")
}
