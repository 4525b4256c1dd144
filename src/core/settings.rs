use crate::shared::paths::{ensure_dir, get_storage_dir};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How the `addedTime` of a new task is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimestampFormat {
    /// `19-October-2026  14:05`
    #[default]
    DateTime,
    /// `19-October-2026`
    DateOnly,
}

impl TimestampFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            TimestampFormat::DateTime => "%d-%B-%Y  %H:%M",
            TimestampFormat::DateOnly => "%d-%B-%Y",
        }
    }

    pub fn format(self, at: &DateTime<Local>) -> String {
        at.format(self.pattern()).to_string()
    }
}

/// When a delete reaches the preferences store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DeletePersistence {
    /// Saved once the undo window closes without an undo.
    #[default]
    Deferred,
    /// Saved as soon as the task is removed, and again when the window closes.
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
    #[serde(default)]
    pub delete_persistence: DeletePersistence,
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
    #[serde(default = "default_preferences_name")]
    pub preferences_name: String,
}

fn default_undo_window_ms() -> u64 {
    2750
}

fn default_preferences_name() -> String {
    "tasks_prefs".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            delete_persistence: DeletePersistence::default(),
            undo_window_ms: default_undo_window_ms(),
            preferences_name: default_preferences_name(),
        }
    }
}

impl AppSettings {
    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub fn get_settings_path() -> std::path::PathBuf {
    get_storage_dir().join("settings.json")
}

pub fn load_settings() -> AppSettings {
    load_or_create_settings(&get_settings_path())
}

/// First run writes the defaults out so there is a file to edit.
pub fn load_or_create_settings(path: &Path) -> AppSettings {
    if path.exists() {
        return load_settings_from(path);
    }

    let settings = AppSettings::default();
    match save_settings_to(path, &settings) {
        Ok(()) => tracing::info!(target: "system", "Wrote default settings to {:?}", path),
        Err(e) => tracing::warn!(target: "system", "Could not write settings to {:?}: {}", path, e),
    }
    settings
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }

    match load_settings_from_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(target: "system", "Ignoring settings at {:?}: {}", path, e);
            AppSettings::default()
        }
    }
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;
    Ok(())
}
