use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::EndpointArgs;
use crate::pipeline::FailurePolicy;

const DB_FILE_NAME: &str = "spacex.db";

/// Resolved settings for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub db_path: PathBuf,
    pub timeout: Option<Duration>,
    pub policy: FailurePolicy,
}

impl Settings {
    pub fn resolve(
        db_path: Option<PathBuf>,
        endpoint: &EndpointArgs,
        policy: FailurePolicy,
    ) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };

        Ok(Self {
            endpoint: endpoint.endpoint.clone(),
            db_path,
            timeout: endpoint.request_timeout(),
            policy,
        })
    }
}

/// `spacex.db` in the platform data directory, created if missing
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "spacex-to-sqlite")
        .context("Could not determine data directory")?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    Ok(data_dir.join(DB_FILE_NAME))
}
