//! Folding per-game lines into one season record per key.

use std::collections::HashMap;

use crate::models::{
    GameLine, PlayerGame, PlayerGameRecord, PlayerSeasonStat, PlayerTotals, StatKey, TeamGame,
    TeamGameRecord, TeamSeasonStat, TeamTotals,
};
use crate::utils::{parse_bool, parse_float, parse_int, per_game, win_percentage};

/// Running totals for one key.
///
/// A totals value only exists once a game has been absorbed, so `games` is
/// always at least one when `finish` runs. Counting sums saturate at
/// `i64::MAX` instead of overflowing on corrupt cells.
pub trait SeasonTotals: Default {
    type Game;
    type Row;

    fn absorb(&mut self, game: &Self::Game);
    fn games(&self) -> u32;
    fn finish(&self, key: StatKey) -> Self::Row;
}

impl SeasonTotals for PlayerTotals {
    type Game = PlayerGame;
    type Row = PlayerSeasonStat;

    fn absorb(&mut self, game: &PlayerGame) {
        let line = &game.line;
        self.games += 1;
        self.team_id = Some(game.team_id);
        self.line.minutes += line.minutes;
        let sums = &mut self.line;
        for (sum, value) in [
            (&mut sums.points, line.points),
            (&mut sums.assists, line.assists),
            (&mut sums.rebounds, line.rebounds),
            (&mut sums.steals, line.steals),
            (&mut sums.blocks, line.blocks),
            (&mut sums.turnovers, line.turnovers),
            (&mut sums.fg_made, line.fg_made),
            (&mut sums.fg_attempted, line.fg_attempted),
            (&mut sums.three_made, line.three_made),
            (&mut sums.three_attempted, line.three_attempted),
            (&mut sums.ft_made, line.ft_made),
            (&mut sums.ft_attempted, line.ft_attempted),
        ] {
            *sum = sum.saturating_add(value);
        }
    }

    fn games(&self) -> u32 {
        self.games
    }

    fn finish(&self, key: StatKey) -> PlayerSeasonStat {
        let games = self.games;
        let sums = &self.line;
        PlayerSeasonStat {
            player_id: key.entity_id,
            season_id: key.season_id,
            team_id: self.team_id,
            games_played: games as i64,
            minutes_played: per_game(sums.minutes, games),
            points: per_game(sums.points as f64, games),
            rebounds: per_game(sums.rebounds as f64, games),
            assists: per_game(sums.assists as f64, games),
            steals: per_game(sums.steals as f64, games),
            blocks: per_game(sums.blocks as f64, games),
            turnovers: per_game(sums.turnovers as f64, games),
            field_goals_made: sums.fg_made,
            field_goals_attempted: sums.fg_attempted,
            three_pointers_made: sums.three_made,
            three_pointers_attempted: sums.three_attempted,
            free_throws_made: sums.ft_made,
            free_throws_attempted: sums.ft_attempted,
        }
    }
}

impl SeasonTotals for TeamTotals {
    type Game = TeamGame;
    type Row = TeamSeasonStat;

    fn absorb(&mut self, game: &TeamGame) {
        self.games += 1;
        if game.won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points = self.points.saturating_add(game.points);
        self.points_allowed = self.points_allowed.saturating_add(game.points_allowed);
    }

    fn games(&self) -> u32 {
        self.games
    }

    fn finish(&self, key: StatKey) -> TeamSeasonStat {
        TeamSeasonStat {
            team_id: key.entity_id,
            season_id: key.season_id,
            wins: self.wins as i64,
            losses: self.losses as i64,
            win_percentage: win_percentage(self.wins, self.losses),
            points_per_game: per_game(self.points as f64, self.games),
            points_allowed_per_game: per_game(self.points_allowed as f64, self.games),
        }
    }
}

/// In-memory accumulator for one stage: key → running totals.
#[derive(Debug)]
pub struct Aggregator<T> {
    totals: HashMap<StatKey, T>,
    rows: u64,
}

impl<T: SeasonTotals> Default for Aggregator<T> {
    fn default() -> Self {
        Self {
            totals: HashMap::new(),
            rows: 0,
        }
    }
}

impl<T: SeasonTotals> Aggregator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: StatKey, game: &T::Game) {
        self.totals.entry(key).or_default().absorb(game);
        self.rows += 1;
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Number of games absorbed.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn get(&self, key: &StatKey) -> Option<&T> {
        self.totals.get(key)
    }

    /// Finished rows in key order.
    pub fn finish(self) -> Vec<T::Row> {
        let mut keyed: Vec<(StatKey, T)> = self
            .totals
            .into_iter()
            .filter(|(_, totals)| totals.games() > 0)
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        keyed.iter().map(|(key, totals)| totals.finish(*key)).collect()
    }
}

/// Counting stats from a box score record. Missing or malformed cells count as zero.
pub fn player_line(record: &PlayerGameRecord) -> GameLine {
    let count = |value: &Option<String>| parse_int(value.as_deref(), None).unwrap_or(0);
    GameLine {
        minutes: parse_float(record.num_minutes.as_deref()).unwrap_or(0.0),
        points: count(&record.points),
        assists: count(&record.assists),
        rebounds: count(&record.rebounds_total),
        steals: count(&record.steals),
        blocks: count(&record.blocks),
        turnovers: count(&record.turnovers),
        fg_made: count(&record.field_goals_made),
        fg_attempted: count(&record.field_goals_attempted),
        three_made: count(&record.three_pointers_made),
        three_attempted: count(&record.three_pointers_attempted),
        ft_made: count(&record.free_throws_made),
        ft_attempted: count(&record.free_throws_attempted),
    }
}

pub fn team_game(record: &TeamGameRecord) -> TeamGame {
    TeamGame {
        won: parse_bool(record.win.as_deref()),
        points: parse_int(record.team_score.as_deref(), None).unwrap_or(0),
        points_allowed: parse_int(record.opponent_score.as_deref(), None).unwrap_or(0),
    }
}
