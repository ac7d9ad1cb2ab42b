use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::LoadConfig;
use crate::db::{self, create_pool, list_seasons, season_id_by_label, team_standings};
use crate::models::Metric;
use crate::services::{run_pipeline, top_players, PipelineReport};

async fn open(config: &LoadConfig) -> Result<SqlitePool> {
    let pool = create_pool(&config.database_url).await?;
    db::init_database(&pool).await?;
    Ok(pool)
}

async fn season_id(pool: &SqlitePool, label: &str) -> Result<Option<i64>> {
    let id = season_id_by_label(pool, label).await?;
    if id.is_none() {
        println!("❌ No season '{}' in the database. Run a load first or pick one of:", label);
        for season in list_seasons(pool).await? {
            println!("   • {}", season.season_year);
        }
    }
    Ok(id)
}

pub async fn load(config: &LoadConfig, json: bool) -> Result<()> {
    let pool = open(config).await?;

    if !json {
        println!("📥 Loading datasets from {}...", config.data_dir.display());
    }
    let report = run_pipeline(&pool, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("✅ Load {} finished\n", report.run_id);
    println!("{:<18} {:>8} {:>8}", "Stage", "Loaded", "Skipped");
    for stage in &report.stages {
        println!("{:<18} {:>8} {:>8}", stage.stage.to_string(), stage.loaded, stage.skipped.total());
        let skipped = &stage.skipped;
        for (reason, count) in [
            ("malformed", skipped.malformed),
            ("incomplete", skipped.incomplete),
            ("unknown entity", skipped.unknown_entity),
            ("unknown team", skipped.unknown_team),
            ("undated", skipped.undated),
        ] {
            if count > 0 {
                println!("   ↳ {} {}", count, reason);
            }
        }
    }
}

pub async fn init_db(config: &LoadConfig) -> Result<()> {
    open(config).await?;
    println!("✅ Database ready at {}", config.database_url);
    Ok(())
}

pub async fn reset_db(config: &LoadConfig) -> Result<()> {
    let pool = open(config).await?;
    db::reset_database(&pool).await?;
    println!("🧹 All loaded data removed from {}", config.database_url);
    Ok(())
}

pub async fn leaders(config: &LoadConfig, metric: Metric, season: &str, limit: usize) -> Result<()> {
    let pool = open(config).await?;
    let Some(season_id) = season_id(&pool, season).await? else {
        return Ok(());
    };

    let rows = top_players(&pool, metric, season_id, limit).await?;
    if rows.is_empty() {
        println!("📭 No player statistics for {}", season);
        return Ok(());
    }

    println!("🏀 {} leaders, {}\n", metric.abbreviation(), season);
    for row in rows {
        println!(
            "{:>3}. {:<28} {:>6.1} {} ({} GP, {} total)",
            row.rank,
            row.player_name,
            row.per_game,
            metric.abbreviation(),
            row.games_played,
            row.total
        );
    }
    Ok(())
}

pub async fn standings(config: &LoadConfig, season: &str, limit: usize) -> Result<()> {
    let pool = open(config).await?;
    let Some(season_id) = season_id(&pool, season).await? else {
        return Ok(());
    };

    let rows = team_standings(&pool, season_id, limit as i64).await?;
    if rows.is_empty() {
        println!("📭 No team statistics for {}", season);
        return Ok(());
    }

    println!("📊 Standings, {}\n", season);
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<28} {:>3}-{:<3} {:.3}  {:.1} / {:.1}",
            i + 1,
            row.team_name,
            row.wins,
            row.losses,
            row.win_percentage,
            row.points_per_game,
            row.points_allowed_per_game
        );
    }
    Ok(())
}

pub async fn seasons(config: &LoadConfig) -> Result<()> {
    let pool = open(config).await?;
    let seasons = list_seasons(&pool).await?;
    if seasons.is_empty() {
        println!("📭 No seasons yet. Try: courtvision load");
        return Ok(());
    }

    for season in seasons {
        println!(
            "{:>4}  {}  {} → {}",
            season.id, season.season_year, season.start_date, season.end_date
        );
    }
    Ok(())
}
