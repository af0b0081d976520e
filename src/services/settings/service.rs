use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::{GridSettings, SettingsError};

const SETTINGS_FILE: &str = "grid.toml";

/// Reads and writes `GridSettings` as TOML.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `grid.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "SalonGrid", "salon-grid")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn at_default_location() -> Result<Self> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow!("Could not determine a configuration directory"))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate settings. A missing file yields the defaults.
    pub fn load(&self) -> Result<GridSettings, SettingsError> {
        let display = self.path.display().to_string();

        if !self.path.exists() {
            log::info!("No settings at {}, using defaults", display);
            return Ok(GridSettings::default());
        }

        let text = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: display.clone(),
            source,
        })?;
        let settings: GridSettings = toml::from_str(&text).map_err(|source| {
            SettingsError::Parse {
                path: display.clone(),
                source,
            }
        })?;
        settings.validate()?;

        log::debug!("Loaded settings from {}", display);
        Ok(settings)
    }

    /// Load settings, falling back to the defaults on any problem.
    pub fn load_or_default(&self) -> GridSettings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {}, using defaults", e);
                GridSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &GridSettings) -> Result<()> {
        settings.validate().context("Refusing to save invalid settings")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }

        let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;

        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
