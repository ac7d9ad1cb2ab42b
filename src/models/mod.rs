use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// ── CSV records ─────────────────────────────────────────────────────────────
//
// Every column is read as optional text; typing happens in `utils` so a bad
// cell never rejects the whole record.

/// One row of `Players.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    pub person_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<String>,
    pub height: Option<String>,
    pub body_weight: Option<String>,
    pub last_attended: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<String>,
    pub draft_round: Option<String>,
    pub draft_number: Option<String>,
    pub guard: Option<String>,
    pub forward: Option<String>,
    pub center: Option<String>,
}

/// One team's line for one game in `TeamStatistics.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamGameRecord {
    pub team_id: Option<String>,
    pub team_city: Option<String>,
    pub team_name: Option<String>,
    pub game_date_time_est: Option<String>,
    pub win: Option<String>,
    pub team_score: Option<String>,
    pub opponent_score: Option<String>,
}

/// One row of `Games.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameRecord {
    #[serde(rename = "gameId")]
    pub game_id: Option<String>,
    #[serde(rename = "gameDateTimeEst")]
    pub game_date_time_est: Option<String>,
    #[serde(rename = "hometeamCity")]
    pub home_team_city: Option<String>,
    #[serde(rename = "hometeamName")]
    pub home_team_name: Option<String>,
    #[serde(rename = "awayteamCity")]
    pub away_team_city: Option<String>,
    #[serde(rename = "awayteamName")]
    pub away_team_name: Option<String>,
    #[serde(rename = "homeScore")]
    pub home_score: Option<String>,
    #[serde(rename = "awayScore")]
    pub away_score: Option<String>,
    #[serde(rename = "gameType")]
    pub game_type: Option<String>,
    pub attendance: Option<String>,
    #[serde(rename = "gameLabel")]
    pub game_label: Option<String>,
    #[serde(rename = "gameSubLabel")]
    pub game_sub_label: Option<String>,
}

/// One player's box score line in `PlayerStatistics.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerGameRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "playerteamCity")]
    pub player_team_city: Option<String>,
    #[serde(rename = "playerteamName")]
    pub player_team_name: Option<String>,
    pub game_date_time_est: Option<String>,
    pub num_minutes: Option<String>,
    pub points: Option<String>,
    pub assists: Option<String>,
    pub rebounds_total: Option<String>,
    pub steals: Option<String>,
    pub blocks: Option<String>,
    pub turnovers: Option<String>,
    pub field_goals_made: Option<String>,
    pub field_goals_attempted: Option<String>,
    pub three_pointers_made: Option<String>,
    pub three_pointers_attempted: Option<String>,
    pub free_throws_made: Option<String>,
    pub free_throws_attempted: Option<String>,
}

// ── Catalogue rows ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub abbreviation: String,
    pub city: String,
    pub conference: String,
    pub division: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub player_name: String,
    pub birth_date: Option<NaiveDate>,
    pub height_inches: Option<i64>,
    pub weight_lbs: Option<i64>,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
}

/// Mirror of a `Players.csv` row, kept close to the source columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    pub person_id: String,
    pub player_name: String,
    pub birth_date: Option<NaiveDate>,
    pub height_inches: Option<i64>,
    pub weight_lbs: Option<i64>,
    pub college: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<i64>,
    pub draft_round: Option<i64>,
    pub draft_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGame {
    pub game_id: String,
    pub game_date_time: NaiveDateTime,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub winner_team_id: Option<i64>,
    pub game_type: Option<String>,
    pub attendance: Option<i64>,
    pub game_label: Option<String>,
    pub game_sublabel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Season {
    pub id: i64,
    pub season_year: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

// ── Aggregates ──────────────────────────────────────────────────────────────

/// Grouping key for season aggregates: one entity in one season.
///
/// The team is not part of the key. A player traded mid-season still has one
/// aggregate per season, matching the `(player_id, season_id)` unique key;
/// the team recorded on it is the one from the last game absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatKey {
    pub entity_id: i64,
    pub season_id: i64,
}

impl StatKey {
    pub fn new(entity_id: i64, season_id: i64) -> Self {
        Self { entity_id, season_id }
    }
}

/// Per-game counting stats pulled out of one box score line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameLine {
    pub minutes: f64,
    pub points: i64,
    pub assists: i64,
    pub rebounds: i64,
    pub steals: i64,
    pub blocks: i64,
    pub turnovers: i64,
    pub fg_made: i64,
    pub fg_attempted: i64,
    pub three_made: i64,
    pub three_attempted: i64,
    pub ft_made: i64,
    pub ft_attempted: i64,
}

/// One box score line plus the team it was recorded for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerGame {
    pub team_id: i64,
    pub line: GameLine,
}

/// A team's result for one game.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamGame {
    pub won: bool,
    pub points: i64,
    pub points_allowed: i64,
}

/// Running sums for one (player, season).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTotals {
    pub games: u32,
    pub team_id: Option<i64>,
    pub line: GameLine,
}

/// Running sums for one (team, season).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamTotals {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: i64,
    pub points_allowed: i64,
}

/// A finished `player_season_stats` row. Rates are per game, shooting is summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlayerSeasonStat {
    pub player_id: i64,
    pub season_id: i64,
    pub team_id: Option<i64>,
    pub games_played: i64,
    pub minutes_played: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub field_goals_made: i64,
    pub field_goals_attempted: i64,
    pub three_pointers_made: i64,
    pub three_pointers_attempted: i64,
    pub free_throws_made: i64,
    pub free_throws_attempted: i64,
}

/// A finished `team_season_stats` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeamSeasonStat {
    pub team_id: i64,
    pub season_id: i64,
    pub wins: i64,
    pub losses: i64,
    pub win_percentage: f64,
    pub points_per_game: f64,
    pub points_allowed_per_game: f64,
}

// ── Leaderboards ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Points,
    Assists,
    Rebounds,
    Steals,
}

impl Metric {
    /// Per-game column in `player_season_stats`.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Points => "points",
            Metric::Assists => "assists",
            Metric::Rebounds => "rebounds",
            Metric::Steals => "steals",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Metric::Points => "PPG",
            Metric::Assists => "APG",
            Metric::Rebounds => "RPG",
            Metric::Steals => "SPG",
        }
    }

    pub fn value_of(self, stat: &PlayerSeasonStat) -> f64 {
        match self {
            Metric::Points => stat.points,
            Metric::Assists => stat.assists,
            Metric::Rebounds => stat.rebounds,
            Metric::Steals => stat.steals,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" | "pts" => Ok(Metric::Points),
            "assists" | "ast" => Ok(Metric::Assists),
            "rebounds" | "reb" => Ok(Metric::Rebounds),
            "steals" | "stl" => Ok(Metric::Steals),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: i64,
    pub season_id: i64,
    pub metric: Metric,
    pub rank: i64,
    pub per_game: f64,
    pub games_played: i64,
    pub total: i64,
}

/// Leaderboard row joined with the player's display name, for the read side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LeaderRow {
    pub rank: i64,
    pub player_id: i64,
    pub player_name: String,
    pub per_game: f64,
    pub games_played: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StandingRow {
    pub team_id: i64,
    pub team_name: String,
    pub wins: i64,
    pub losses: i64,
    pub win_percentage: f64,
    pub points_per_game: f64,
    pub points_allowed_per_game: f64,
}
