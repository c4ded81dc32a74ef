//! Path management for fmdash
//!
//! This module manages all filesystem paths used by the application.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    /// Get the global paths instance
    pub fn get() -> Result<Arc<Paths>> {
        PATHS.get().map(Arc::clone).context("Paths not initialized")
    }

    fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let config_parent = if let Some(path) = config_override {
            path
        } else {
            directories::ProjectDirs::from("", "", "fmdash")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };

        let config_dir_name = if is_home_dir(&config_parent) {
            ".fmdash"
        } else {
            "fmdash"
        };

        let config_dir = config_parent.join(config_dir_name);
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(Self { config_dir })
    }

    /// Config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path to the settings file
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Path to the application database
    pub fn app_db_path(&self) -> PathBuf {
        self.config_dir.join("fmdash.db")
    }
}

fn is_home_dir(path: &Path) -> bool {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir() == path)
        .unwrap_or(false)
}
