//! Bulk loader for NBA box-score CSV exports.
//!
//! Reads the four dataset files, upserts the team, player and game
//! catalogues, folds per-game lines into season aggregates and materialises
//! leaderboards, all into SQLite.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{LoadConfig, UndatedPolicy};
pub use error::LoadError;
pub use models::Metric;
pub use services::{run_pipeline, PipelineReport, Stage, StageReport};
