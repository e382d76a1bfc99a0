use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const SETTINGS_FILE_NAME: &str = "florasoul.json";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InsightSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub insight: InsightSettings,
}

impl Settings {
    /// A non-empty key in the environment wins over the file.
    pub fn apply_env_overrides(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.insight.api_key = Some(key);
        }
    }
}

/// Read once at startup. Nothing writes the file back.
pub struct SettingsStore {
    data: Settings,
}

impl SettingsStore {
    /// A missing or unreadable-as-JSON file yields defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data: Settings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Settings::default()
        };
        data.apply_env_overrides(std::env::var(API_KEY_ENV).ok());

        Ok(Self { data })
    }

    pub fn settings(&self) -> Settings {
        self.data.clone()
    }

    pub fn insight(&self) -> InsightSettings {
        self.data.insight.clone()
    }
}
