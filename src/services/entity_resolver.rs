use anyhow::Result;
use sqlx::SqliteConnection;
use std::collections::HashMap;

use crate::db;
use crate::utils::canonical_name;

/// Name → id lookup for entities already persisted.
///
/// Keys are canonical display names ("LeBron James", "Los Angeles Lakers").
/// A miss is not an error; the calling stage counts the skipped row.
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    ids: HashMap<String, i64>,
}

impl EntityDirectory {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        let ids = pairs
            .into_iter()
            .map(|(id, name)| (canonical_name(&[&name]), id))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self { ids }
    }

    pub async fn load_teams(conn: &mut SqliteConnection) -> Result<Self> {
        let directory = Self::from_pairs(db::team_names(conn).await?);
        tracing::debug!("Loaded {} team names", directory.len());
        Ok(directory)
    }

    pub async fn load_players(conn: &mut SqliteConnection) -> Result<Self> {
        let directory = Self::from_pairs(db::player_names(conn).await?);
        tracing::debug!("Loaded {} player names", directory.len());
        Ok(directory)
    }

    /// Resolve a name built from parts, e.g. `["LeBron", "James"]`.
    pub fn resolve(&self, parts: &[&str]) -> Option<i64> {
        let key = canonical_name(parts);
        if key.is_empty() {
            return None;
        }
        self.ids.get(&key).copied()
    }

    /// Same as `resolve` for optional CSV cells.
    pub fn resolve_fields(&self, parts: &[Option<&str>]) -> Option<i64> {
        let parts: Vec<&str> = parts.iter().map(|p| p.unwrap_or("")).collect();
        self.resolve(&parts)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
