//! Insert-or-update writers.
//!
//! Every write keys on the table's unique constraint and overwrites the
//! stored values with the freshly computed ones, so replaying a load leaves
//! the same rows behind. Callers pass the stage transaction.

use anyhow::Result;
use sqlx::SqliteConnection;

use crate::models::{
    LeaderboardEntry, NewGame, NewPlayer, NewTeam, PlayerSeasonStat, RawPlayer, TeamSeasonStat,
};

pub async fn upsert_team(conn: &mut SqliteConnection, team: &NewTeam) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO team (team_name, abbreviation, city, conference, division)
           VALUES (?, ?, ?, ?, ?)
           ON CONFLICT(team_name) DO UPDATE SET
               abbreviation = excluded.abbreviation,
               city         = excluded.city,
               conference   = excluded.conference,
               division     = excluded.division"#,
    )
    .bind(&team.team_name)
    .bind(&team.abbreviation)
    .bind(&team.city)
    .bind(&team.conference)
    .bind(&team.division)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn upsert_player(conn: &mut SqliteConnection, player: &NewPlayer) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO player (player_name, birth_date, height_inches, weight_lbs, position, jersey_number)
           VALUES (?, ?, ?, ?, ?, ?)
           ON CONFLICT(player_name) DO UPDATE SET
               birth_date    = excluded.birth_date,
               height_inches = excluded.height_inches,
               weight_lbs    = excluded.weight_lbs,
               position      = excluded.position,
               jersey_number = COALESCE(excluded.jersey_number, player.jersey_number)"#,
    )
    .bind(&player.player_name)
    .bind(player.birth_date)
    .bind(player.height_inches)
    .bind(player.weight_lbs)
    .bind(&player.position)
    .bind(player.jersey_number)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn upsert_raw_player(conn: &mut SqliteConnection, raw: &RawPlayer) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO players_raw
           (person_id, player_name, birth_date, height_inches, weight_lbs, college, country,
            draft_year, draft_round, draft_number)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(person_id) DO UPDATE SET
               player_name   = excluded.player_name,
               birth_date    = excluded.birth_date,
               height_inches = excluded.height_inches,
               weight_lbs    = excluded.weight_lbs,
               college       = excluded.college,
               country       = excluded.country,
               draft_year    = excluded.draft_year,
               draft_round   = excluded.draft_round,
               draft_number  = excluded.draft_number"#,
    )
    .bind(&raw.person_id)
    .bind(&raw.player_name)
    .bind(raw.birth_date)
    .bind(raw.height_inches)
    .bind(raw.weight_lbs)
    .bind(&raw.college)
    .bind(&raw.country)
    .bind(raw.draft_year)
    .bind(raw.draft_round)
    .bind(raw.draft_number)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn upsert_game(conn: &mut SqliteConnection, game: &NewGame) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO game
           (game_id, game_date_time, home_team_id, away_team_id, home_score, away_score,
            winner_team_id, game_type, attendance, game_label, game_sublabel)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(game_id) DO UPDATE SET
               game_date_time = excluded.game_date_time,
               home_team_id   = excluded.home_team_id,
               away_team_id   = excluded.away_team_id,
               home_score     = excluded.home_score,
               away_score     = excluded.away_score,
               winner_team_id = excluded.winner_team_id,
               game_type      = excluded.game_type,
               attendance     = excluded.attendance,
               game_label     = excluded.game_label,
               game_sublabel  = excluded.game_sublabel"#,
    )
    .bind(&game.game_id)
    .bind(game.game_date_time)
    .bind(game.home_team_id)
    .bind(game.away_team_id)
    .bind(game.home_score)
    .bind(game.away_score)
    .bind(game.winner_team_id)
    .bind(&game.game_type)
    .bind(game.attendance)
    .bind(&game.game_label)
    .bind(&game.game_sublabel)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns the number of rows written.
pub async fn upsert_team_season_stats(
    conn: &mut SqliteConnection,
    stats: &[TeamSeasonStat],
) -> Result<u64> {
    let mut written = 0;
    for stat in stats {
        let result = sqlx::query(
            r#"INSERT INTO team_season_stats
               (team_id, season_id, wins, losses, win_percentage, points_per_game, points_allowed_per_game)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(team_id, season_id) DO UPDATE SET
                   wins                    = excluded.wins,
                   losses                  = excluded.losses,
                   win_percentage          = excluded.win_percentage,
                   points_per_game         = excluded.points_per_game,
                   points_allowed_per_game = excluded.points_allowed_per_game"#,
        )
        .bind(stat.team_id)
        .bind(stat.season_id)
        .bind(stat.wins)
        .bind(stat.losses)
        .bind(stat.win_percentage)
        .bind(stat.points_per_game)
        .bind(stat.points_allowed_per_game)
        .execute(&mut *conn)
        .await?;
        written += result.rows_affected();
    }
    Ok(written)
}

/// Returns the number of rows written.
pub async fn upsert_player_season_stats(
    conn: &mut SqliteConnection,
    stats: &[PlayerSeasonStat],
) -> Result<u64> {
    let mut written = 0;
    for stat in stats {
        let result = sqlx::query(
            r#"INSERT INTO player_season_stats
               (player_id, season_id, team_id, games_played, minutes_played, points, rebounds, assists,
                steals, blocks, turnovers, field_goals_made, field_goals_attempted,
                three_pointers_made, three_pointers_attempted, free_throws_made, free_throws_attempted)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(player_id, season_id) DO UPDATE SET
                   team_id                  = excluded.team_id,
                   games_played             = excluded.games_played,
                   minutes_played           = excluded.minutes_played,
                   points                   = excluded.points,
                   rebounds                 = excluded.rebounds,
                   assists                  = excluded.assists,
                   steals                   = excluded.steals,
                   blocks                   = excluded.blocks,
                   turnovers                = excluded.turnovers,
                   field_goals_made         = excluded.field_goals_made,
                   field_goals_attempted    = excluded.field_goals_attempted,
                   three_pointers_made      = excluded.three_pointers_made,
                   three_pointers_attempted = excluded.three_pointers_attempted,
                   free_throws_made         = excluded.free_throws_made,
                   free_throws_attempted    = excluded.free_throws_attempted"#,
        )
        .bind(stat.player_id)
        .bind(stat.season_id)
        .bind(stat.team_id)
        .bind(stat.games_played)
        .bind(stat.minutes_played)
        .bind(stat.points)
        .bind(stat.rebounds)
        .bind(stat.assists)
        .bind(stat.steals)
        .bind(stat.blocks)
        .bind(stat.turnovers)
        .bind(stat.field_goals_made)
        .bind(stat.field_goals_attempted)
        .bind(stat.three_pointers_made)
        .bind(stat.three_pointers_attempted)
        .bind(stat.free_throws_made)
        .bind(stat.free_throws_attempted)
        .execute(&mut *conn)
        .await?;
        written += result.rows_affected();
    }
    Ok(written)
}

/// Returns the number of rows written.
pub async fn upsert_leaderboard(
    conn: &mut SqliteConnection,
    entries: &[LeaderboardEntry],
) -> Result<u64> {
    let mut written = 0;
    for entry in entries {
        let result = sqlx::query(
            r#"INSERT INTO leaderboard (player_id, season_id, metric, rank, per_game, games_played, total)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(player_id, season_id, metric) DO UPDATE SET
                   rank         = excluded.rank,
                   per_game     = excluded.per_game,
                   games_played = excluded.games_played,
                   total        = excluded.total"#,
        )
        .bind(entry.player_id)
        .bind(entry.season_id)
        .bind(entry.metric.column())
        .bind(entry.rank)
        .bind(entry.per_game)
        .bind(entry.games_played)
        .bind(entry.total)
        .execute(&mut *conn)
        .await?;
        written += result.rows_affected();
    }
    Ok(written)
}
