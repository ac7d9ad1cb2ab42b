use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use std::fmt;

use crate::config::UndatedPolicy;
use crate::db;

/// Month in which a new season starts.
const SEASON_START_MONTH: u32 = 10;

/// An NBA season, named by the calendar year it starts in.
///
/// Games from October onward belong to the season starting that year;
/// January through September belong to the one that started the year before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonLabel {
    start_year: i32,
}

impl SeasonLabel {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        if date.month() >= SEASON_START_MONTH {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    /// Parse "2023-24". Only the start year is significant.
    pub fn parse(label: &str) -> Option<Self> {
        let (start, _) = label.trim().split_once('-')?;
        start.parse::<i32>().ok().map(Self::new)
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Placeholder start date: October 1st.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, SEASON_START_MONTH, 1)
    }

    /// Placeholder end date: June 30th of the following year.
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year + 1, 6, 30)
    }
}

impl fmt::Display for SeasonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, (self.start_year + 1).rem_euclid(100))
    }
}

/// Maps game timestamps to season ids, creating seasons on first sight.
///
/// One resolver lives for one pipeline run; its cache is never shared
/// between runs.
#[derive(Debug)]
pub struct SeasonResolver {
    policy: UndatedPolicy,
    cache: HashMap<SeasonLabel, i64>,
    fallback_available: Option<bool>,
    created: u64,
}

impl SeasonResolver {
    pub fn new(policy: UndatedPolicy) -> Self {
        Self {
            policy,
            cache: HashMap::new(),
            fallback_available: None,
            created: 0,
        }
    }

    /// Season id for a game timestamp.
    ///
    /// `None` means the row cannot be attributed to any season and should be
    /// skipped: the timestamp was missing and either the policy drops such
    /// rows or the fallback season does not exist.
    pub async fn resolve(
        &mut self,
        conn: &mut SqliteConnection,
        game_time: Option<NaiveDateTime>,
    ) -> Result<Option<i64>> {
        match game_time {
            Some(time) => {
                let id = self.resolve_label(conn, SeasonLabel::for_date(time.date())).await?;
                Ok(Some(id))
            }
            None => self.fallback(conn).await,
        }
    }

    /// Season id for a label, looking it up or creating it.
    pub async fn resolve_label(&mut self, conn: &mut SqliteConnection, label: SeasonLabel) -> Result<i64> {
        if let Some(id) = self.cache.get(&label) {
            return Ok(*id);
        }

        let name = label.to_string();
        let id = match db::find_season_id(conn, &name).await? {
            Some(id) => id,
            None => {
                let (start, end) = label
                    .start_date()
                    .zip(label.end_date())
                    .ok_or_else(|| anyhow::anyhow!("season {} is out of the supported date range", name))?;
                let id = db::insert_season(conn, &name, start, end).await?;
                self.created += 1;
                tracing::info!("Created season {} (id {})", name, id);
                id
            }
        };

        self.cache.insert(label, id);
        Ok(id)
    }

    async fn fallback(&mut self, conn: &mut SqliteConnection) -> Result<Option<i64>> {
        let fallback_id = match self.policy {
            UndatedPolicy::Drop => return Ok(None),
            UndatedPolicy::Fallback(id) => id,
        };

        // Only a hit is cached: the fallback season may be created later in the run.
        let available = match self.fallback_available {
            Some(true) => true,
            _ => {
                let available = db::season_exists(conn, fallback_id).await?;
                if !available && self.fallback_available.is_none() {
                    tracing::warn!(
                        "Fallback season id {} does not exist yet; undated rows are skipped until it does",
                        fallback_id
                    );
                }
                self.fallback_available = Some(available);
                available
            }
        };

        Ok(available.then_some(fallback_id))
    }

    /// Seasons inserted by this resolver.
    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
