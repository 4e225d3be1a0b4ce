// Essay Ranking - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod school;
pub mod loader;
pub mod query;
pub mod stats;
pub mod analysis;
pub mod comparison;
pub mod profile;
pub mod state;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use school::{Category, Competency, HistoryEntry, School};
pub use loader::{
    load, load_or_empty, parse_dataset,
    Dataset, DatasetSource, LoadError, DATASET_PATH,
};
pub use query::{
    city_options, locale_cmp, paginate, parse_min_sample_size, query, state_options,
    Filters, Page, Segment, SortConfig, SortDirection, SortKey,
    DEFAULT_MIN_SAMPLE_SIZE, DEFAULT_PAGE_SIZE,
};
pub use stats::{
    calculate_averages, efficiency, format_count, format_number, ranking_badge, round_to_tenth,
    Averages, Medal, OverviewStats,
};
pub use analysis::CategoryAnalysis;
pub use comparison::{Comparison, ComparisonError, CompetencyChartRow, MAX_COMPARED};
pub use profile::{find_school, SchoolProfile};
pub use state::{Action, DashboardState, DashboardView};
pub use export::{export_to_path, ExportFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
