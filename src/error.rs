//! Fault classes surfaced by a load run.
//!
//! Malformed cells and unknown names are not errors: the parsers return
//! `None` and the stages count skipped rows instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::services::Stage;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("invalid value '{value}' for {key}")]
    InvalidConfig { key: String, value: String },

    #[error("stage {stage} failed")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    pub fn invalid_config(key: &str, value: impl Into<String>) -> Self {
        LoadError::InvalidConfig {
            key: key.to_string(),
            value: value.into(),
        }
    }

    /// The stage that failed, if this is a storage fault.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LoadError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
