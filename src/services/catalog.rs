//! Catalogue stages: teams, players and games.

use anyhow::Result;
use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::path::Path;

use super::csv_source::open_records;
use super::entity_resolver::EntityDirectory;
use super::pipeline::{Stage, StageReport};
use crate::db::{upsert_game, upsert_player, upsert_raw_player, upsert_team};
use crate::models::{GameRecord, NewGame, NewPlayer, NewTeam, PlayerRecord, RawPlayer, TeamGameRecord};
use crate::utils::{canonical_name, parse_bool, parse_date, parse_datetime, parse_int};

/// Body weights above this are treated as corrupt.
const MAX_WEIGHT_LBS: i64 = 500;

const DEFAULT_CONFERENCE: (&str, &str) = ("Western", "Pacific");

/// Conference and division by mascot keyword.
const CONFERENCES: &[(&str, &str, &str)] = &[
    ("Lakers", "Western", "Pacific"),
    ("Warriors", "Western", "Pacific"),
    ("Suns", "Western", "Pacific"),
    ("Thunder", "Western", "Northwest"),
    ("Spurs", "Western", "Southwest"),
    ("Celtics", "Eastern", "Atlantic"),
    ("Knicks", "Eastern", "Atlantic"),
    ("Raptors", "Eastern", "Atlantic"),
    ("Heat", "Eastern", "Southeast"),
    ("Magic", "Eastern", "Southeast"),
];

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Uppercase initials of the first three words: "Trail Blazers" -> "TB".
pub fn abbreviation(mascot: &str) -> String {
    mascot
        .split_whitespace()
        .take(3)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn conference_for(mascot: &str) -> (&'static str, &'static str) {
    CONFERENCES
        .iter()
        .find(|(key, _, _)| mascot.contains(key))
        .map(|(_, conference, division)| (*conference, *division))
        .unwrap_or(DEFAULT_CONFERENCE)
}

pub fn team_from_record(record: &TeamGameRecord) -> Option<NewTeam> {
    let city = text(&record.team_city).unwrap_or_default();
    let mascot = text(&record.team_name).unwrap_or_default();
    let team_name = canonical_name(&[&city, &mascot]);
    if team_name.is_empty() {
        return None;
    }
    let (conference, division) = conference_for(&mascot);
    Some(NewTeam {
        team_name,
        abbreviation: abbreviation(&mascot),
        city,
        conference: conference.to_string(),
        division: division.to_string(),
    })
}

/// Position from the guard/forward/center flags, first match wins.
pub fn position_for(record: &PlayerRecord) -> Option<String> {
    let position = if parse_bool(record.guard.as_deref()) {
        "PG"
    } else if parse_bool(record.forward.as_deref()) {
        "SF"
    } else if parse_bool(record.center.as_deref()) {
        "C"
    } else {
        return None;
    };
    Some(position.to_string())
}

/// Mirror row and, when the name is non-empty, the player row.
pub fn player_from_record(record: &PlayerRecord) -> Option<(RawPlayer, Option<NewPlayer>)> {
    let person_id = text(&record.person_id)?;
    let first = record.first_name.as_deref().unwrap_or("");
    let last = record.last_name.as_deref().unwrap_or("");
    let player_name = canonical_name(&[first, last]);

    let birth_date = parse_date(record.birthdate.as_deref());
    let height_inches = parse_int(record.height.as_deref(), None);

    let raw = RawPlayer {
        person_id,
        player_name: player_name.clone(),
        birth_date,
        height_inches,
        weight_lbs: parse_int(record.body_weight.as_deref(), None),
        college: text(&record.last_attended),
        country: text(&record.country),
        draft_year: parse_int(record.draft_year.as_deref(), None),
        draft_round: parse_int(record.draft_round.as_deref(), None),
        draft_number: parse_int(record.draft_number.as_deref(), None),
    };

    let player = (!player_name.is_empty()).then(|| NewPlayer {
        player_name,
        birth_date,
        height_inches,
        weight_lbs: parse_int(record.body_weight.as_deref(), Some(MAX_WEIGHT_LBS)),
        position: position_for(record),
        jersey_number: None,
    });

    Some((raw, player))
}

/// Home team on a higher score, away team on a lower one, nobody otherwise.
pub fn winner(home_team_id: i64, away_team_id: i64, home: Option<i64>, away: Option<i64>) -> Option<i64> {
    match (home, away) {
        (Some(h), Some(a)) if h > a => Some(home_team_id),
        (Some(h), Some(a)) if h < a => Some(away_team_id),
        _ => None,
    }
}

pub async fn load_teams(conn: &mut SqliteConnection, path: &Path) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::Teams);
    let mut seen_ids = HashSet::new();
    let mut records = open_records::<TeamGameRecord>(path)?;

    for record in records.by_ref() {
        let record = record?;
        let Some(team_id) = text(&record.team_id) else {
            report.skipped.incomplete += 1;
            continue;
        };
        if !seen_ids.insert(team_id) {
            continue;
        }
        match team_from_record(&record) {
            Some(team) => {
                upsert_team(conn, &team).await?;
                report.loaded += 1;
            }
            None => report.skipped.incomplete += 1,
        }
    }

    report.skipped.malformed += records.malformed();
    Ok(report)
}

pub async fn load_players(conn: &mut SqliteConnection, path: &Path) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::Players);
    let mut mirrored = 0u64;
    let mut records = open_records::<PlayerRecord>(path)?;

    for record in records.by_ref() {
        let record = record?;
        let Some((raw, player)) = player_from_record(&record) else {
            report.skipped.incomplete += 1;
            continue;
        };
        upsert_raw_player(conn, &raw).await?;
        mirrored += 1;
        match player {
            Some(player) => {
                upsert_player(conn, &player).await?;
                report.loaded += 1;
            }
            None => report.skipped.incomplete += 1,
        }
    }

    report.skipped.malformed += records.malformed();
    tracing::debug!("Mirrored {} rows into players_raw", mirrored);
    Ok(report)
}

pub async fn load_games(
    conn: &mut SqliteConnection,
    path: &Path,
    teams: &EntityDirectory,
) -> Result<StageReport> {
    let mut report = StageReport::new(Stage::Games);
    let mut records = open_records::<GameRecord>(path)?;

    for record in records.by_ref() {
        let record = record?;
        let (Some(game_id), Some(game_date_time)) = (
            text(&record.game_id),
            parse_datetime(record.game_date_time_est.as_deref()),
        ) else {
            report.skipped.incomplete += 1;
            continue;
        };

        let home = teams.resolve_fields(&[record.home_team_city.as_deref(), record.home_team_name.as_deref()]);
        let away = teams.resolve_fields(&[record.away_team_city.as_deref(), record.away_team_name.as_deref()]);
        let (Some(home_team_id), Some(away_team_id)) = (home, away) else {
            report.skipped.unknown_team += 1;
            continue;
        };

        let home_score = parse_int(record.home_score.as_deref(), None);
        let away_score = parse_int(record.away_score.as_deref(), None);
        let game = NewGame {
            game_id,
            game_date_time,
            home_team_id,
            away_team_id,
            home_score,
            away_score,
            winner_team_id: winner(home_team_id, away_team_id, home_score, away_score),
            game_type: text(&record.game_type),
            attendance: parse_int(record.attendance.as_deref(), None),
            game_label: text(&record.game_label),
            game_sublabel: text(&record.game_sub_label),
        };
        upsert_game(conn, &game).await?;
        report.loaded += 1;
    }

    report.skipped.malformed += records.malformed();
    Ok(report)
}
