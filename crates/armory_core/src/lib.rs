//! Armory core: item records, catalog queries and the pure presentation state machine.
mod effect;
mod msg;
mod query;
mod record;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use query::{
    category_options, filter_and_sort, is_faction_manufacturer, manufacturer_options, Filters,
    ManufacturerOptions, SortKey, UnknownSortKey, FACTION_MANUFACTURERS,
};
pub use record::{parse_catalog, CatalogError, ItemId, ItemRecord, ItemScripts, ItemStats};
pub use state::{AppState, CatalogStatus, ImageSlot, ImageStatus, Surface, Toast, Variant};
pub use update::update;
pub use view_model::{
    BannerView, CardView, CatalogViewModel, DetailView, IconView, ImageView, ScriptLine, StatLine,
    VariantChoice, EMPTY_RESULT_MESSAGE, LOAD_ERROR_MESSAGE,
};
