pub mod queries;
pub mod upsert;

pub use queries::*;
pub use upsert::*;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if !file_path.starts_with(":memory:") {
        if let Some(parent) = std::path::Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating database directory {}", parent.display()))?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("connecting to {}", database_url))?;
    Ok(pool)
}

/// Single-connection in-memory pool with the schema applied.
///
/// The connection is never recycled, since closing it would drop the database.
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    init_database(&pool).await?;
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS season (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        season_year TEXT NOT NULL UNIQUE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        is_current INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS team (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        team_name TEXT NOT NULL UNIQUE,
        abbreviation TEXT NOT NULL,
        city TEXT NOT NULL,
        conference TEXT NOT NULL,
        division TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_name TEXT NOT NULL UNIQUE,
        birth_date TEXT,
        height_inches INTEGER,
        weight_lbs INTEGER,
        position TEXT,
        jersey_number INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players_raw (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id TEXT NOT NULL UNIQUE,
        player_name TEXT NOT NULL,
        birth_date TEXT,
        height_inches INTEGER,
        weight_lbs INTEGER,
        college TEXT,
        country TEXT,
        draft_year INTEGER,
        draft_round INTEGER,
        draft_number INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id TEXT NOT NULL UNIQUE,
        game_date_time TEXT NOT NULL,
        home_team_id INTEGER NOT NULL,
        away_team_id INTEGER NOT NULL,
        home_score INTEGER,
        away_score INTEGER,
        winner_team_id INTEGER,
        game_type TEXT,
        attendance INTEGER,
        game_label TEXT,
        game_sublabel TEXT,
        FOREIGN KEY (home_team_id) REFERENCES team (id),
        FOREIGN KEY (away_team_id) REFERENCES team (id),
        FOREIGN KEY (winner_team_id) REFERENCES team (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS team_season_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        team_id INTEGER NOT NULL,
        season_id INTEGER NOT NULL,
        wins INTEGER NOT NULL DEFAULT 0,
        losses INTEGER NOT NULL DEFAULT 0,
        win_percentage REAL NOT NULL DEFAULT 0,
        points_per_game REAL NOT NULL DEFAULT 0,
        points_allowed_per_game REAL NOT NULL DEFAULT 0,
        UNIQUE (team_id, season_id),
        FOREIGN KEY (team_id) REFERENCES team (id),
        FOREIGN KEY (season_id) REFERENCES season (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_season_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL,
        season_id INTEGER NOT NULL,
        team_id INTEGER,
        games_played INTEGER NOT NULL,
        minutes_played REAL NOT NULL,
        points REAL NOT NULL,
        rebounds REAL NOT NULL,
        assists REAL NOT NULL,
        steals REAL NOT NULL,
        blocks REAL NOT NULL,
        turnovers REAL NOT NULL,
        field_goals_made INTEGER NOT NULL,
        field_goals_attempted INTEGER NOT NULL,
        three_pointers_made INTEGER NOT NULL,
        three_pointers_attempted INTEGER NOT NULL,
        free_throws_made INTEGER NOT NULL,
        free_throws_attempted INTEGER NOT NULL,
        UNIQUE (player_id, season_id),
        FOREIGN KEY (player_id) REFERENCES player (id),
        FOREIGN KEY (season_id) REFERENCES season (id),
        FOREIGN KEY (team_id) REFERENCES team (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leaderboard (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL,
        season_id INTEGER NOT NULL,
        metric TEXT NOT NULL,
        rank INTEGER NOT NULL,
        per_game REAL NOT NULL,
        games_played INTEGER NOT NULL,
        total INTEGER NOT NULL,
        UNIQUE (player_id, season_id, metric),
        FOREIGN KEY (player_id) REFERENCES player (id),
        FOREIGN KEY (season_id) REFERENCES season (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_game_date ON game(game_date_time)",
    "CREATE INDEX IF NOT EXISTS idx_player_season_stats_season ON player_season_stats(season_id)",
    "CREATE INDEX IF NOT EXISTS idx_leaderboard_season_metric ON leaderboard(season_id, metric, rank)",
];

pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database initialized successfully");
    Ok(())
}

/// Delete every loaded row, derived tables first.
pub async fn reset_database(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in [
        "leaderboard",
        "player_season_stats",
        "team_season_stats",
        "game",
        "players_raw",
        "player",
        "team",
        "season",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!("All data cleared");
    Ok(())
}

// Lookup helpers used while a stage transaction is open

pub async fn team_names(conn: &mut SqliteConnection) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, team_name FROM team")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn player_names(conn: &mut SqliteConnection) -> Result<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, player_name FROM player")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn find_season_id(conn: &mut SqliteConnection, label: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM season WHERE season_year = ?")
        .bind(label)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn season_exists(conn: &mut SqliteConnection, season_id: i64) -> Result<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM season WHERE id = ?")
        .bind(season_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_season(
    conn: &mut SqliteConnection,
    label: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO season (season_year, start_date, end_date, is_current) VALUES (?, ?, ?, 0)",
    )
    .bind(label)
    .bind(start_date)
    .bind(end_date)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}
