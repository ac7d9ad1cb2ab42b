use anyhow::Result;
use sqlx::{SqliteConnection, SqlitePool};

use super::pipeline::{Stage, StageReport};
use crate::config::UndatedPolicy;
use crate::db::{self, season_player_stats, season_player_stats_named, upsert_leaderboard};
use crate::models::{LeaderRow, LeaderboardEntry, Metric, PlayerSeasonStat};

/// Rank aggregates on one metric, highest first.
///
/// Ranks run 1..=n with no gaps and no reuse. Equal values keep their input
/// order, and callers feed rows in player id order, so ties go to the lower
/// player id.
pub fn rank_entries(metric: Metric, season_id: i64, stats: &[PlayerSeasonStat]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&PlayerSeasonStat> = stats.iter().filter(|s| s.games_played > 0).collect();
    ordered.sort_by(|a, b| metric.value_of(b).total_cmp(&metric.value_of(a)));

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, stat)| {
            let per_game = metric.value_of(stat);
            LeaderboardEntry {
                player_id: stat.player_id,
                season_id,
                metric,
                rank: index as i64 + 1,
                per_game,
                games_played: stat.games_played,
                total: (per_game * stat.games_played as f64).round() as i64,
            }
        })
        .collect()
}

/// Recompute one leaderboard for one season. Returns rows written.
pub async fn refresh_leaderboard(conn: &mut SqliteConnection, season_id: i64, metric: Metric) -> Result<u64> {
    let stats = season_player_stats(conn, season_id).await?;
    let entries = rank_entries(metric, season_id, &stats);
    let written = upsert_leaderboard(conn, &entries).await?;
    tracing::debug!("Leaderboard {} for season {}: {} entries", metric, season_id, entries.len());
    Ok(written)
}

/// Season id the leaderboards are built for.
///
/// An unknown label falls back the same way undated rows do.
pub async fn leaderboard_season(
    conn: &mut SqliteConnection,
    label: &str,
    policy: UndatedPolicy,
) -> Result<Option<i64>> {
    if let Some(id) = db::find_season_id(conn, label).await? {
        return Ok(Some(id));
    }
    if let UndatedPolicy::Fallback(id) = policy {
        if db::season_exists(conn, id).await? {
            tracing::warn!("Season {} not found; ranking season id {} instead", label, id);
            return Ok(Some(id));
        }
    }
    tracing::warn!("Season {} not found; no leaderboards refreshed", label);
    Ok(None)
}

pub async fn refresh_leaderboards(
    conn: &mut SqliteConnection,
    label: &str,
    policy: UndatedPolicy,
    metrics: &[Metric],
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::Leaderboards);
    let Some(season_id) = leaderboard_season(conn, label, policy).await? else {
        return Ok(report);
    };
    for metric in metrics {
        report.loaded += refresh_leaderboard(conn, season_id, *metric).await?;
    }
    Ok(report)
}

/// Ranking computed straight from the aggregates, for metrics that have no
/// materialised leaderboard. Same ordering as `rank_entries`.
pub async fn rank_on_demand(
    pool: &SqlitePool,
    metric: Metric,
    season_id: i64,
    limit: usize,
) -> Result<Vec<LeaderRow>> {
    let named = season_player_stats_named(pool, season_id).await?;
    let stats: Vec<PlayerSeasonStat> = named.iter().map(|(_, stat)| stat.clone()).collect();
    let names: std::collections::HashMap<i64, &str> =
        named.iter().map(|(name, stat)| (stat.player_id, name.as_str())).collect();

    Ok(rank_entries(metric, season_id, &stats)
        .into_iter()
        .take(limit)
        .map(|entry| LeaderRow {
            rank: entry.rank,
            player_id: entry.player_id,
            player_name: names.get(&entry.player_id).copied().unwrap_or_default().to_string(),
            per_game: entry.per_game,
            games_played: entry.games_played,
            total: entry.total,
        })
        .collect())
}

/// Top rows for a metric: the stored leaderboard when it exists, otherwise
/// an on-demand ranking.
pub async fn top_players(pool: &SqlitePool, metric: Metric, season_id: i64, limit: usize) -> Result<Vec<LeaderRow>> {
    if db::leaderboard_exists(pool, metric, season_id).await? {
        db::top_from_leaderboard(pool, metric, season_id, limit as i64).await
    } else {
        rank_on_demand(pool, metric, season_id, limit).await
    }
}
