//! Read side: lookups the CLI (and any front end) runs against loaded data.

use anyhow::Result;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{LeaderRow, Metric, PlayerSeasonStat, Season, StandingRow, TeamSeasonStat};

const PLAYER_SEASON_COLUMNS: &str = "player_id, season_id, team_id, games_played, minutes_played, \
     points, rebounds, assists, steals, blocks, turnovers, field_goals_made, field_goals_attempted, \
     three_pointers_made, three_pointers_attempted, free_throws_made, free_throws_attempted";

pub async fn list_seasons(pool: &SqlitePool) -> Result<Vec<Season>> {
    let seasons = sqlx::query_as::<_, Season>(
        "SELECT id, season_year, start_date, end_date, is_current FROM season ORDER BY season_year",
    )
    .fetch_all(pool)
    .await?;
    Ok(seasons)
}

pub async fn season_id_by_label(pool: &SqlitePool, label: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM season WHERE season_year = ?")
        .bind(label)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// All player aggregates for a season, in player id order.
pub async fn season_player_stats(
    conn: &mut SqliteConnection,
    season_id: i64,
) -> Result<Vec<PlayerSeasonStat>> {
    let sql = format!(
        "SELECT {} FROM player_season_stats WHERE season_id = ? AND games_played > 0 ORDER BY player_id",
        PLAYER_SEASON_COLUMNS
    );
    let stats = sqlx::query_as::<_, PlayerSeasonStat>(&sql)
        .bind(season_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(stats)
}

pub async fn get_player_season_stat(
    pool: &SqlitePool,
    player_id: i64,
    season_id: i64,
) -> Result<Option<PlayerSeasonStat>> {
    let sql = format!(
        "SELECT {} FROM player_season_stats WHERE player_id = ? AND season_id = ?",
        PLAYER_SEASON_COLUMNS
    );
    let stat = sqlx::query_as::<_, PlayerSeasonStat>(&sql)
        .bind(player_id)
        .bind(season_id)
        .fetch_optional(pool)
        .await?;
    Ok(stat)
}

pub async fn get_team_season_stat(
    pool: &SqlitePool,
    team_id: i64,
    season_id: i64,
) -> Result<Option<TeamSeasonStat>> {
    let stat = sqlx::query_as::<_, TeamSeasonStat>(
        r#"SELECT team_id, season_id, wins, losses, win_percentage, points_per_game, points_allowed_per_game
           FROM team_season_stats WHERE team_id = ? AND season_id = ?"#,
    )
    .bind(team_id)
    .bind(season_id)
    .fetch_optional(pool)
    .await?;
    Ok(stat)
}

pub async fn player_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM player WHERE player_name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

pub async fn team_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM team WHERE team_name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Top rows of a refreshed leaderboard.
pub async fn top_from_leaderboard(
    pool: &SqlitePool,
    metric: Metric,
    season_id: i64,
    limit: i64,
) -> Result<Vec<LeaderRow>> {
    let rows = sqlx::query_as::<_, LeaderRow>(
        r#"SELECT l.rank, l.player_id, p.player_name, l.per_game, l.games_played, l.total
           FROM leaderboard l
           JOIN player p ON p.id = l.player_id
           WHERE l.metric = ? AND l.season_id = ?
           ORDER BY l.rank ASC
           LIMIT ?"#,
    )
    .bind(metric.column())
    .bind(season_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether a leaderboard has been materialised for this season.
pub async fn leaderboard_exists(pool: &SqlitePool, metric: Metric, season_id: i64) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leaderboard WHERE metric = ? AND season_id = ?",
    )
    .bind(metric.column())
    .bind(season_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Player aggregates for a season paired with display names, player id order.
pub async fn season_player_stats_named(
    pool: &SqlitePool,
    season_id: i64,
) -> Result<Vec<(String, PlayerSeasonStat)>> {
    let mut conn = pool.acquire().await?;
    let stats = season_player_stats(&mut *conn, season_id).await?;
    let names: std::collections::HashMap<i64, String> =
        crate::db::player_names(&mut *conn).await?.into_iter().collect();

    Ok(stats
        .into_iter()
        .map(|stat| {
            let name = names.get(&stat.player_id).cloned().unwrap_or_default();
            (name, stat)
        })
        .collect())
}

pub async fn team_standings(pool: &SqlitePool, season_id: i64, limit: i64) -> Result<Vec<StandingRow>> {
    let rows = sqlx::query_as::<_, StandingRow>(
        r#"SELECT s.team_id, t.team_name, s.wins, s.losses, s.win_percentage,
                  s.points_per_game, s.points_allowed_per_game
           FROM team_season_stats s
           JOIN team t ON t.id = s.team_id
           WHERE s.season_id = ?
           ORDER BY s.wins DESC, s.win_percentage DESC, s.team_id ASC
           LIMIT ?"#,
    )
    .bind(season_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}
