//! Season statistics stages: fold game lines into aggregates and upsert them.

use anyhow::Result;
use sqlx::SqliteConnection;
use std::path::Path;

use super::aggregator::{player_line, team_game, Aggregator};
use super::csv_source::open_records;
use super::entity_resolver::EntityDirectory;
use super::pipeline::{Stage, StageReport};
use super::season_resolver::SeasonResolver;
use crate::db::{upsert_player_season_stats, upsert_team_season_stats};
use crate::models::{PlayerGame, PlayerGameRecord, PlayerTotals, StatKey, TeamGameRecord, TeamTotals};
use crate::utils::parse_datetime;

pub async fn aggregate_team_games(
    conn: &mut SqliteConnection,
    path: &Path,
    teams: &EntityDirectory,
    seasons: &mut SeasonResolver,
    report: &mut StageReport,
) -> Result<Aggregator<TeamTotals>> {
    let mut aggregator = Aggregator::new();
    let mut records = open_records::<TeamGameRecord>(path)?;

    for record in records.by_ref() {
        let record = record?;
        let Some(team_id) = teams.resolve_fields(&[record.team_city.as_deref(), record.team_name.as_deref()])
        else {
            report.skipped.unknown_entity += 1;
            continue;
        };
        let game_time = parse_datetime(record.game_date_time_est.as_deref());
        let Some(season_id) = seasons.resolve(conn, game_time).await? else {
            report.skipped.undated += 1;
            continue;
        };
        aggregator.add(StatKey::new(team_id, season_id), &team_game(&record));
    }

    report.skipped.malformed += records.malformed();
    Ok(aggregator)
}

pub async fn load_team_statistics(
    conn: &mut SqliteConnection,
    path: &Path,
    teams: &EntityDirectory,
    seasons: &mut SeasonResolver,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::TeamStats);
    let aggregator = aggregate_team_games(conn, path, teams, seasons, &mut report).await?;
    let rows = aggregator.finish();
    upsert_team_season_stats(conn, &rows).await?;
    report.loaded = rows.len() as u64;
    Ok(report)
}

pub async fn aggregate_player_games(
    conn: &mut SqliteConnection,
    path: &Path,
    players: &EntityDirectory,
    teams: &EntityDirectory,
    seasons: &mut SeasonResolver,
    report: &mut StageReport,
) -> Result<Aggregator<PlayerTotals>> {
    let mut aggregator = Aggregator::new();
    let mut records = open_records::<PlayerGameRecord>(path)?;

    for record in records.by_ref() {
        let record = record?;
        let Some(player_id) = players.resolve_fields(&[record.first_name.as_deref(), record.last_name.as_deref()])
        else {
            report.skipped.unknown_entity += 1;
            continue;
        };
        let Some(team_id) =
            teams.resolve_fields(&[record.player_team_city.as_deref(), record.player_team_name.as_deref()])
        else {
            report.skipped.unknown_team += 1;
            continue;
        };
        let game_time = parse_datetime(record.game_date_time_est.as_deref());
        let Some(season_id) = seasons.resolve(conn, game_time).await? else {
            report.skipped.undated += 1;
            continue;
        };
        let game = PlayerGame {
            team_id,
            line: player_line(&record),
        };
        aggregator.add(StatKey::new(player_id, season_id), &game);
    }

    report.skipped.malformed += records.malformed();
    Ok(aggregator)
}

pub async fn load_player_statistics(
    conn: &mut SqliteConnection,
    path: &Path,
    players: &EntityDirectory,
    teams: &EntityDirectory,
    seasons: &mut SeasonResolver,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::PlayerStats);
    let aggregator = aggregate_player_games(conn, path, players, teams, seasons, &mut report).await?;
    let rows = aggregator.finish();
    upsert_player_season_stats(conn, &rows).await?;
    report.loaded = rows.len() as u64;
    Ok(report)
}
