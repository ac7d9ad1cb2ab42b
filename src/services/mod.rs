pub mod aggregator;
pub mod catalog;
pub mod csv_source;
pub mod entity_resolver;
pub mod leaderboard;
pub mod pipeline;
pub mod season_resolver;
pub mod stats;

pub use aggregator::{Aggregator, SeasonTotals};
pub use entity_resolver::EntityDirectory;
pub use leaderboard::{rank_entries, refresh_leaderboard, refresh_leaderboards, top_players};
pub use pipeline::{run_pipeline, Pipeline, PipelineReport, SkipCounts, Stage, StageReport};
pub use season_resolver::{SeasonLabel, SeasonResolver};
