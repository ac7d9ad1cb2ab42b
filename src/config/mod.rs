use std::env;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::models::Metric;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/courtvision.db";
pub const DEFAULT_DATA_DIR: &str = "datasets";
pub const DEFAULT_LEADERBOARD_SEASON: &str = "2023-24";
pub const DEFAULT_FALLBACK_SEASON_ID: i64 = 1;

pub const PLAYERS_CSV: &str = "Players.csv";
pub const TEAM_STATISTICS_CSV: &str = "TeamStatistics.csv";
pub const GAMES_CSV: &str = "Games.csv";
pub const PLAYER_STATISTICS_CSV: &str = "PlayerStatistics.csv";

/// What to do with a statistics row whose game timestamp does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndatedPolicy {
    /// Attribute the row to a fixed season id.
    Fallback(i64),
    /// Skip the row and count it.
    Drop,
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub database_url: String,
    pub data_dir: PathBuf,
    pub leaderboard_season: String,
    pub leaderboard_metrics: Vec<Metric>,
    pub undated_policy: UndatedPolicy,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            leaderboard_season: DEFAULT_LEADERBOARD_SEASON.to_string(),
            leaderboard_metrics: vec![Metric::Points, Metric::Assists],
            undated_policy: UndatedPolicy::Fallback(DEFAULT_FALLBACK_SEASON_ID),
        }
    }
}

impl LoadConfig {
    /// Build the configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = lookup("COURTVISION_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(season) = lookup("COURTVISION_LEADERBOARD_SEASON") {
            config.leaderboard_season = season.trim().to_string();
        }
        if let Some(list) = lookup("COURTVISION_LEADERBOARDS") {
            config.leaderboard_metrics = parse_metric_list(&list)?;
        }

        let fallback_id = match lookup("COURTVISION_FALLBACK_SEASON_ID") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| LoadError::invalid_config("COURTVISION_FALLBACK_SEASON_ID", raw.clone()))?,
            None => DEFAULT_FALLBACK_SEASON_ID,
        };
        config.undated_policy = match lookup("COURTVISION_UNDATED_ROWS").as_deref().map(str::trim) {
            None | Some("") | Some("fallback") => UndatedPolicy::Fallback(fallback_id),
            Some("drop") => UndatedPolicy::Drop,
            Some(other) => return Err(LoadError::invalid_config("COURTVISION_UNDATED_ROWS", other)),
        };

        Ok(config)
    }

    pub fn input_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Every input file must exist before the first stage starts.
    pub fn check_inputs(&self) -> Result<(), LoadError> {
        for file in [TEAM_STATISTICS_CSV, PLAYERS_CSV, GAMES_CSV, PLAYER_STATISTICS_CSV] {
            let path = self.input_path(file);
            if !Path::new(&path).is_file() {
                return Err(LoadError::MissingInput { path });
            }
        }
        Ok(())
    }
}

fn parse_metric_list(list: &str) -> Result<Vec<Metric>, LoadError> {
    let mut metrics = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let metric = item
            .parse::<Metric>()
            .map_err(|_| LoadError::invalid_config("COURTVISION_LEADERBOARDS", item))?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}
