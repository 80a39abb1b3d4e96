pub const PLACEHOLDER_GLYPH: &str = "🔫";
pub const MISSING_GLYPH: &str = "✕";
pub const ICON_PLACEHOLDER_GLYPH: &str = "🏢";
pub const DOT_ACTIVE: &str = "●";
pub const DOT_INACTIVE: &str = "○";
pub const FACTION_SEPARATOR: &str = "═══ Factions ═══";
pub const RULE: &str = "────────────────────────────────────────";
