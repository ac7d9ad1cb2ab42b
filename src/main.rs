use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use courtvision::cli;
use courtvision::config::{LoadConfig, UndatedPolicy};
use courtvision::models::Metric;

#[derive(Parser)]
#[command(name = "courtvision")]
#[command(about = "Load NBA box-score exports into SQLite and query season leaders")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full load pipeline over the dataset directory
    Load {
        /// Directory holding Players.csv, Games.csv, TeamStatistics.csv and PlayerStatistics.csv
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Season the leaderboards are built for, e.g. 2023-24
        #[arg(short, long)]
        season: Option<String>,
        /// Skip statistics rows without a parseable game date
        #[arg(long)]
        drop_undated: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the schema
    InitDb,
    /// Delete all loaded rows
    ResetDb,
    /// Show the top players for a metric
    Leaders {
        #[arg(short, long, default_value = "points")]
        metric: Metric,
        #[arg(short, long)]
        season: Option<String>,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show team standings for a season
    Standings {
        #[arg(short, long)]
        season: Option<String>,
        #[arg(short, long, default_value = "30")]
        limit: usize,
    },
    /// List known seasons
    Seasons,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("❌ {:?}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = LoadConfig::from_env()?;

    match cli.command {
        Some(Commands::Load { data_dir, season, drop_undated, json }) => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(season) = season {
                config.leaderboard_season = season;
            }
            if drop_undated {
                config.undated_policy = UndatedPolicy::Drop;
            }
            cli::load(&config, json).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            cli::init_db(&config).await?;
        }
        Some(Commands::ResetDb) => {
            cli::reset_db(&config).await?;
        }
        Some(Commands::Leaders { metric, season, limit }) => {
            let season = season.unwrap_or_else(|| config.leaderboard_season.clone());
            cli::leaders(&config, metric, &season, limit).await?;
        }
        Some(Commands::Standings { season, limit }) => {
            let season = season.unwrap_or_else(|| config.leaderboard_season.clone());
            cli::standings(&config, &season, limit).await?;
        }
        Some(Commands::Seasons) => {
            cli::seasons(&config).await?;
        }
        None => {
            // Default to a full load with the configured settings
            cli::load(&config, false).await?;
        }
    }

    Ok(())
}
