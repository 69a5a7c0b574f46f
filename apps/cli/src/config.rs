use std::{collections::HashMap, fs, io, path::Path};

use anyhow::Context;
use client_core::parse_server_url;
use shared::domain::DEFAULT_SUBJECT;

pub const CONFIG_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub default_ticker: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            default_ticker: DEFAULT_SUBJECT.into(),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `analyzer.toml` (or `config_path`), then environment variables.
/// A missing default config file is fine; a missing explicit one is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound && config_path.is_none() => None,
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid settings (config file '{}')", path.display()))
}

fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
            .context("config file must be a flat table of string values")?;
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("default_ticker") {
            settings.default_ticker = v.clone();
        }
        if let Some(v) = file_cfg.get("log_filter") {
            settings.log_filter = v.clone();
        }
    }

    if let Some(v) = env("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__DEFAULT_TICKER") {
        settings.default_ticker = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url)?;
    Ok(settings)
}

pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(Settings::default().server_url);
    }
    parse_server_url(trimmed).with_context(|| format!("invalid server url '{trimmed}'"))?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
