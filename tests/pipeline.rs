mod common;

use common::{player_statistics, Dataset, PLAYER_STATISTICS_ROWS};
use courtvision::config::{UndatedPolicy, GAMES_CSV, PLAYER_STATISTICS_CSV};
use courtvision::db::{
    count_rows, create_memory_pool, get_player_season_stat, get_team_season_stat, player_id_by_name,
    season_id_by_label, team_id_by_name,
};
use courtvision::error::LoadError;
use courtvision::models::Metric;
use courtvision::services::{run_pipeline, top_players, Stage};

const TABLES: &[&str] = &[
    "season",
    "team",
    "player",
    "players_raw",
    "game",
    "team_season_stats",
    "player_season_stats",
    "leaderboard",
];

async fn table_counts(pool: &sqlx::SqlitePool) -> Vec<i64> {
    let mut counts = Vec::new();
    for table in TABLES {
        counts.push(count_rows(pool, table).await.unwrap());
    }
    counts
}

#[tokio::test]
async fn test_full_load_reports_every_stage() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();

    let report = run_pipeline(&pool, &dataset.config()).await.unwrap();

    let stages: Vec<Stage> = report.stages.iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Teams,
            Stage::Players,
            Stage::Games,
            Stage::TeamStats,
            Stage::PlayerStats,
            Stage::Leaderboards,
        ]
    );
    assert_eq!(report.stage(Stage::Teams).unwrap().loaded, 3);
    assert_eq!(report.stage(Stage::Players).unwrap().loaded, 3);
    assert_eq!(report.stage(Stage::Games).unwrap().loaded, 2);
    assert_eq!(report.stage(Stage::TeamStats).unwrap().loaded, 3);

    let players = report.stage(Stage::PlayerStats).unwrap();
    assert_eq!(players.loaded, 3);
    assert_eq!(players.skipped.unknown_entity, 1);
    assert_eq!(players.skipped.total(), 1);

    assert_eq!(table_counts(&pool).await, vec![1, 3, 3, 3, 2, 3, 3, 6]);
}

#[tokio::test]
async fn test_aggregates_are_per_game_averages() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();
    run_pipeline(&pool, &dataset.config()).await.unwrap();

    let season = season_id_by_label(&pool, "2023-24").await.unwrap().unwrap();
    let lakers = team_id_by_name(&pool, "Los Angeles Lakers").await.unwrap().unwrap();
    let lebron = player_id_by_name(&pool, "LeBron James").await.unwrap().unwrap();

    let stat = get_player_season_stat(&pool, lebron, season).await.unwrap().unwrap();
    assert_eq!(stat.games_played, 2);
    assert_eq!(stat.points, 24.0);
    assert_eq!(stat.assists, 6.0);
    assert_eq!(stat.minutes_played, 32.0);
    assert_eq!(stat.field_goals_made, 21);
    assert_eq!(stat.team_id, Some(lakers));

    let team = get_team_season_stat(&pool, lakers, season).await.unwrap().unwrap();
    assert_eq!((team.wins, team.losses), (1, 1));
    assert_eq!(team.win_percentage, 0.5);
    assert_eq!(team.points_per_game, 103.5);
    assert_eq!(team.points_allowed_per_game, 107.0);
}

#[derive(Debug, PartialEq, sqlx::FromRow)]
struct PlayerRow(i64, i64, Option<i64>, i64, f64, f64, f64, f64, f64, i64, i64, i64, i64);
type TeamRow = (i64, i64, i64, i64, f64, f64, f64);
type LeaderboardRow = (i64, i64, String, i64, f64, i64, i64);

/// Every derived row, in key order.
async fn derived_rows(pool: &sqlx::SqlitePool) -> (Vec<PlayerRow>, Vec<TeamRow>, Vec<LeaderboardRow>) {
    let players = sqlx::query_as::<_, PlayerRow>(
        r#"SELECT player_id, season_id, team_id, games_played, minutes_played, points, assists,
                  rebounds, steals, field_goals_made, field_goals_attempted,
                  three_pointers_made, free_throws_made
           FROM player_season_stats ORDER BY player_id, season_id"#,
    )
    .fetch_all(pool)
    .await
    .unwrap();
    let teams = sqlx::query_as::<_, TeamRow>(
        r#"SELECT team_id, season_id, wins, losses, win_percentage, points_per_game, points_allowed_per_game
           FROM team_season_stats ORDER BY team_id, season_id"#,
    )
    .fetch_all(pool)
    .await
    .unwrap();
    let leaderboard = sqlx::query_as::<_, LeaderboardRow>(
        r#"SELECT player_id, season_id, metric, rank, per_game, games_played, total
           FROM leaderboard ORDER BY metric, season_id, rank"#,
    )
    .fetch_all(pool)
    .await
    .unwrap();
    (players, teams, leaderboard)
}

#[tokio::test]
async fn test_second_load_changes_nothing() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();

    run_pipeline(&pool, &dataset.config()).await.unwrap();
    let counts = table_counts(&pool).await;
    let first = derived_rows(&pool).await;
    run_pipeline(&pool, &dataset.config()).await.unwrap();

    assert_eq!(table_counts(&pool).await, counts);
    assert_eq!(derived_rows(&pool).await, first);

    // Values, not just row counts: LeBron still averages 24.0 over 2 games.
    let (players, _, leaderboard) = first;
    assert_eq!(players.len(), 3);
    assert_eq!((players[0].3, players[0].5), (2, 24.0));
    assert!(leaderboard.iter().any(|row| row.2 == "points" && row.3 == 1 && row.4 == 29.0 && row.6 == 29));
}

#[tokio::test]
async fn test_changed_box_score_overwrites_aggregate() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();
    run_pipeline(&pool, &dataset.config()).await.unwrap();

    let mut rows = PLAYER_STATISTICS_ROWS.to_vec();
    rows[1] = "LeBron,James,Los Angeles,Lakers,2023-10-26 22:00:00,35,37,7,6,2,1,3,14,22,3,6,6,7";
    dataset.write(PLAYER_STATISTICS_CSV, &player_statistics(&rows));
    run_pipeline(&pool, &dataset.config()).await.unwrap();

    let season = season_id_by_label(&pool, "2023-24").await.unwrap().unwrap();
    let lebron = player_id_by_name(&pool, "LeBron James").await.unwrap().unwrap();
    let stat = get_player_season_stat(&pool, lebron, season).await.unwrap().unwrap();
    assert_eq!(stat.games_played, 2);
    assert_eq!(stat.points, 29.0);
    assert_eq!(count_rows(&pool, "player_season_stats").await.unwrap(), 3);

    // LeBron now ties Jokic at 29.0 and wins the tie on the lower player id.
    let leaders = top_players(&pool, Metric::Points, season, 2).await.unwrap();
    let names: Vec<&str> = leaders.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, vec!["LeBron James", "Nikola Jokic"]);
    assert_eq!(leaders[0].rank, 1);
    assert_eq!(leaders[0].total, 58);
}

#[tokio::test]
async fn test_leaderboards_rank_by_per_game_value() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();
    run_pipeline(&pool, &dataset.config()).await.unwrap();
    let season = season_id_by_label(&pool, "2023-24").await.unwrap().unwrap();

    let points = top_players(&pool, Metric::Points, season, 10).await.unwrap();
    let ranked: Vec<(i64, &str, f64, i64)> = points
        .iter()
        .map(|r| (r.rank, r.player_name.as_str(), r.per_game, r.total))
        .collect();
    assert_eq!(
        ranked,
        vec![
            (1, "Nikola Jokic", 29.0, 29),
            (2, "LeBron James", 24.0, 48),
            (3, "Anthony Davis", 20.5, 41),
        ]
    );

    let assists = top_players(&pool, Metric::Assists, season, 1).await.unwrap();
    assert_eq!(assists.len(), 1);
    assert_eq!(assists[0].player_name, "Nikola Jokic");

    // Rebounds are not materialised; the ranking is computed on demand.
    let rebounds = top_players(&pool, Metric::Rebounds, season, 10).await.unwrap();
    assert_eq!(rebounds[0].player_name, "Nikola Jokic");
    assert_eq!(rebounds[0].per_game, 13.0);
    assert_eq!(rebounds.len(), 3);
}

#[tokio::test]
async fn test_undated_rows_use_fallback_season() {
    let dataset = Dataset::new();
    let mut rows = PLAYER_STATISTICS_ROWS.to_vec();
    rows.push("LeBron,James,Los Angeles,Lakers,,30,51,2,5,0,0,1,20,30,5,9,6,6");
    dataset.write(PLAYER_STATISTICS_CSV, &player_statistics(&rows));

    let pool = create_memory_pool().await.unwrap();
    let report = run_pipeline(&pool, &dataset.config()).await.unwrap();
    assert_eq!(report.stage(Stage::PlayerStats).unwrap().skipped.undated, 0);

    let lebron = player_id_by_name(&pool, "LeBron James").await.unwrap().unwrap();
    let stat = get_player_season_stat(&pool, lebron, 1).await.unwrap().unwrap();
    assert_eq!(stat.games_played, 3);
    assert_eq!(stat.points, 33.0);
}

#[tokio::test]
async fn test_undated_rows_can_be_dropped() {
    let dataset = Dataset::new();
    let mut rows = PLAYER_STATISTICS_ROWS.to_vec();
    rows.push("LeBron,James,Los Angeles,Lakers,not a date,30,51,2,5,0,0,1,20,30,5,9,6,6");
    dataset.write(PLAYER_STATISTICS_CSV, &player_statistics(&rows));

    let mut config = dataset.config();
    config.undated_policy = UndatedPolicy::Drop;

    let pool = create_memory_pool().await.unwrap();
    let report = run_pipeline(&pool, &config).await.unwrap();
    assert_eq!(report.stage(Stage::PlayerStats).unwrap().skipped.undated, 1);

    let lebron = player_id_by_name(&pool, "LeBron James").await.unwrap().unwrap();
    let stat = get_player_season_stat(&pool, lebron, 1).await.unwrap().unwrap();
    assert_eq!(stat.games_played, 2);
    assert_eq!(stat.points, 24.0);
}

#[tokio::test]
async fn test_new_season_is_created_on_first_sight() {
    let dataset = Dataset::new();
    let mut rows = PLAYER_STATISTICS_ROWS.to_vec();
    rows.push("LeBron,James,Los Angeles,Lakers,2024-10-22 22:00:00,32,16,10,5,1,0,3,6,13,1,4,3,4");
    dataset.write(PLAYER_STATISTICS_CSV, &player_statistics(&rows));

    let pool = create_memory_pool().await.unwrap();
    run_pipeline(&pool, &dataset.config()).await.unwrap();

    let next = season_id_by_label(&pool, "2024-25").await.unwrap().unwrap();
    let lebron = player_id_by_name(&pool, "LeBron James").await.unwrap().unwrap();
    let stat = get_player_season_stat(&pool, lebron, next).await.unwrap().unwrap();
    assert_eq!(stat.games_played, 1);
    assert_eq!(stat.points, 16.0);
    assert_eq!(count_rows(&pool, "season").await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_input_stops_before_any_stage() {
    let dataset = Dataset::new();
    dataset.remove(GAMES_CSV);
    let pool = create_memory_pool().await.unwrap();

    let err = run_pipeline(&pool, &dataset.config()).await.unwrap_err();
    match err {
        LoadError::MissingInput { path } => assert!(path.ends_with(GAMES_CSV)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(table_counts(&pool).await, vec![0; TABLES.len()]);
}

#[tokio::test]
async fn test_failed_stage_keeps_earlier_commits() {
    let dataset = Dataset::new();
    let pool = create_memory_pool().await.unwrap();
    sqlx::query("DROP TABLE player_season_stats")
        .execute(&pool)
        .await
        .unwrap();

    let err = run_pipeline(&pool, &dataset.config()).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::PlayerStats));

    assert_eq!(count_rows(&pool, "team").await.unwrap(), 3);
    assert_eq!(count_rows(&pool, "game").await.unwrap(), 2);
    assert_eq!(count_rows(&pool, "team_season_stats").await.unwrap(), 3);
    assert_eq!(count_rows(&pool, "leaderboard").await.unwrap(), 0);
}
