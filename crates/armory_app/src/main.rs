mod platform;

use std::path::PathBuf;

use armory_core::SortKey;
use clap::Parser;

use platform::logging::LogDestination;

/// Browse the armory catalog from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "armory", version, about)]
pub struct Args {
    /// Site root holding `data/` and `art/`: a URL, a file:// URL or a local directory
    #[arg(long, env = "ARMORY_SITE")]
    pub site: Option<String>,

    /// RON configuration file (defaults to ./armory.ron when present)
    #[arg(long, env = "ARMORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only show items from this manufacturer
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Only show items of this category
    #[arg(long)]
    pub category: Option<String>,

    /// Sort order: id, name, year, year-asc, damage, range, manufacturer, category
    #[arg(long, default_value_t = SortKey::Id)]
    pub sort: SortKey,

    /// Case-insensitive search over name, description and manufacturer
    #[arg(long, default_value = "")]
    pub search: String,

    /// Open the detail view of this item id
    #[arg(long)]
    pub open: Option<u32>,

    /// Skin index to select in the detail view
    #[arg(long, requires = "open")]
    pub skin: Option<usize>,

    /// Print the missing-asset hints for every missing image and icon
    #[arg(long)]
    pub explain_missing: bool,

    /// Seconds to wait for images to settle before rendering
    #[arg(long, default_value_t = 60)]
    pub settle_timeout: u64,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    platform::run_app(args)
}
