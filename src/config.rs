use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use iced::Theme;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.json";
pub const API_URL_ENV: &str = "SCHOOL_PORTAL_API_URL";

/// Settings read from `config.json` in the working directory. Every field
/// has a default so a partial or missing file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme_name: String,
    pub api_url: Option<String>,
    pub reports_dir: PathBuf,
    pub school_name: String,
    pub school_address: String,
    /// Endpoint taken from the environment. Never written back to disk.
    #[serde(skip)]
    pub api_url_override: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme_name: Theme::Dark.to_string(),
            api_url: None,
            reports_dir: PathBuf::from("reports"),
            school_name: "School Management System".to_string(),
            school_address: String::new(),
            api_url_override: None,
        }
    }
}

/// What the report generator needs to know about the institution.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub reports_dir: PathBuf,
    pub school_name: String,
    pub school_address: String,
}

impl AppConfig {
    /// Reads `config.json`, then `.env` and the process environment.
    /// Fails when no endpoint is configured anywhere.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded environment file");
        }
        let mut config = Self::read(Path::new(CONFIG_FILE))?;
        config.apply_env(std::env::var(API_URL_ENV).ok());
        let endpoint = config.endpoint()?;
        info!(endpoint, "configuration loaded");
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn apply_env(&mut self, api_url: Option<String>) {
        self.api_url_override = api_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
    }

    pub fn endpoint(&self) -> Result<&str> {
        self.api_url_override
            .as_deref()
            .or(self.api_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                anyhow!("no backend endpoint configured: set `api_url` in {CONFIG_FILE} or {API_URL_ENV}")
            })
    }

    pub fn theme(&self) -> Theme {
        theme_from_str(&self.theme_name).unwrap_or(Theme::Dark)
    }

    pub fn set_theme(&mut self, theme: &Theme) {
        self.theme_name = theme.to_string();
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            reports_dir: self.reports_dir.clone(),
            school_name: self.school_name.clone(),
            school_address: self.school_address.clone(),
        }
    }
}

pub fn theme_from_str(name: &str) -> Option<Theme> {
    Theme::ALL
        .iter()
        .find(|t| t.to_string().eq_ignore_ascii_case(name.trim()))
        .cloned()
}
