//! Pipeline driver: runs the load stages in dependency order.
//!
//! Each stage runs inside its own transaction and commits on success. A
//! failing stage rolls back alone; stages already committed stay committed
//! and the remaining stages are not attempted.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::fmt;
use tracing::Instrument;
use uuid::Uuid;

use super::catalog::{load_games, load_players, load_teams};
use super::entity_resolver::EntityDirectory;
use super::leaderboard::refresh_leaderboards;
use super::season_resolver::SeasonResolver;
use super::stats::{load_player_statistics, load_team_statistics};
use crate::config::{
    LoadConfig, GAMES_CSV, PLAYERS_CSV, PLAYER_STATISTICS_CSV, TEAM_STATISTICS_CSV,
};
use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Teams,
    Players,
    Games,
    TeamStats,
    PlayerStats,
    Leaderboards,
    Done,
}

impl Stage {
    pub const FIRST: Stage = Stage::Teams;

    /// The stage after this one. `Done` is terminal.
    pub fn next(self) -> Stage {
        match self {
            Stage::Teams => Stage::Players,
            Stage::Players => Stage::Games,
            Stage::Games => Stage::TeamStats,
            Stage::TeamStats => Stage::PlayerStats,
            Stage::PlayerStats => Stage::Leaderboards,
            Stage::Leaderboards | Stage::Done => Stage::Done,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Teams => "teams",
            Stage::Players => "players",
            Stage::Games => "games",
            Stage::TeamStats => "team statistics",
            Stage::PlayerStats => "player statistics",
            Stage::Leaderboards => "leaderboards",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows a stage did not load, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Record could not be decoded at all.
    pub malformed: u64,
    /// A required field (id, name, timestamp) was missing.
    pub incomplete: u64,
    /// The row's own player or team is not in the store.
    pub unknown_entity: u64,
    /// The team a row refers to is not in the store.
    pub unknown_team: u64,
    /// No season could be assigned.
    pub undated: u64,
}

impl SkipCounts {
    pub fn total(&self) -> u64 {
        self.malformed + self.incomplete + self.unknown_entity + self.unknown_team + self.undated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub loaded: u64,
    pub skipped: SkipCounts,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            loaded: 0,
            skipped: SkipCounts::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub stages: Vec<StageReport>,
}

impl PipelineReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }
}

/// Lookups that live for exactly one run.
struct RunContext {
    seasons: SeasonResolver,
    teams: Option<EntityDirectory>,
    players: Option<EntityDirectory>,
}

pub struct Pipeline<'a> {
    pool: &'a SqlitePool,
    config: &'a LoadConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a LoadConfig) -> Self {
        Self { pool, config }
    }

    /// Full reload. Input files are checked before any stage starts.
    pub async fn run(&self) -> Result<PipelineReport, LoadError> {
        self.config.check_inputs()?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("load", %run_id);
        self.run_stages(run_id).instrument(span).await
    }

    async fn run_stages(&self, run_id: Uuid) -> Result<PipelineReport, LoadError> {
        let mut ctx = RunContext {
            seasons: SeasonResolver::new(self.config.undated_policy),
            teams: None,
            players: None,
        };
        let mut stages = Vec::new();
        let mut stage = Stage::FIRST;

        while stage != Stage::Done {
            let report = self
                .run_stage(stage, &mut ctx)
                .await
                .map_err(|source| LoadError::Stage { stage, source })?;
            tracing::info!(
                "Stage {}: loaded {}, skipped {} (malformed {}, incomplete {}, unknown entity {}, unknown team {}, undated {})",
                stage,
                report.loaded,
                report.skipped.total(),
                report.skipped.malformed,
                report.skipped.incomplete,
                report.skipped.unknown_entity,
                report.skipped.unknown_team,
                report.skipped.undated,
            );
            stages.push(report);
            stage = stage.next();
        }

        tracing::info!("Load {} complete", run_id);
        Ok(PipelineReport { run_id, stages })
    }

    async fn run_stage(&self, stage: Stage, ctx: &mut RunContext) -> Result<StageReport> {
        let mut tx = self.pool.begin().await?;
        let report = self.execute(stage, &mut *tx, ctx).await?;
        tx.commit()
            .await
            .with_context(|| format!("committing stage {}", stage))?;
        Ok(report)
    }

    async fn execute(&self, stage: Stage, conn: &mut SqliteConnection, ctx: &mut RunContext) -> Result<StageReport> {
        let config = self.config;
        match stage {
            Stage::Teams => load_teams(conn, &config.input_path(TEAM_STATISTICS_CSV)).await,
            Stage::Players => load_players(conn, &config.input_path(PLAYERS_CSV)).await,
            Stage::Games => {
                let teams = ensure_teams(conn, ctx).await?;
                load_games(conn, &config.input_path(GAMES_CSV), teams).await
            }
            Stage::TeamStats => {
                ensure_teams(conn, ctx).await?;
                let RunContext { seasons, teams: Some(teams), .. } = ctx else {
                    return Err(anyhow!("team directory not loaded"));
                };
                load_team_statistics(conn, &config.input_path(TEAM_STATISTICS_CSV), teams, seasons).await
            }
            Stage::PlayerStats => {
                ensure_teams(conn, ctx).await?;
                ensure_players(conn, ctx).await?;
                let RunContext { seasons, teams: Some(teams), players: Some(players) } = ctx else {
                    return Err(anyhow!("entity directories not loaded"));
                };
                load_player_statistics(conn, &config.input_path(PLAYER_STATISTICS_CSV), players, teams, seasons)
                    .await
            }
            Stage::Leaderboards => {
                refresh_leaderboards(
                    conn,
                    &config.leaderboard_season,
                    config.undated_policy,
                    &config.leaderboard_metrics,
                )
                .await
            }
            Stage::Done => Ok(StageReport::new(Stage::Done)),
        }
    }
}

async fn ensure_teams<'c>(conn: &mut SqliteConnection, ctx: &'c mut RunContext) -> Result<&'c EntityDirectory> {
    if ctx.teams.is_none() {
        ctx.teams = Some(EntityDirectory::load_teams(conn).await?);
    }
    ctx.teams.as_ref().ok_or_else(|| anyhow!("team directory not loaded"))
}

async fn ensure_players<'c>(
    conn: &mut SqliteConnection,
    ctx: &'c mut RunContext,
) -> Result<&'c EntityDirectory> {
    if ctx.players.is_none() {
        ctx.players = Some(EntityDirectory::load_players(conn).await?);
    }
    ctx.players.as_ref().ok_or_else(|| anyhow!("player directory not loaded"))
}

/// Convenience wrapper used by the CLI and tests.
pub async fn run_pipeline(pool: &SqlitePool, config: &LoadConfig) -> Result<PipelineReport, LoadError> {
    Pipeline::new(pool, config).run().await
}
