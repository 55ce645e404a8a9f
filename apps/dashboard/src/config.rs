use std::{collections::HashMap, fs};

use anyhow::Context;
use url::Url;

/// Where the service lives and which credential to present. The API key is an
/// opaque externally supplied value; an empty key is passed through as-is and
/// left for the server to judge.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            api_key: String::new(),
        }
    }
}

/// Defaults, overridden by `dashboard.toml` in the working directory,
/// overridden by environment, overridden by CLI flags.
pub fn load_settings(
    flag_server_url: Option<String>,
    flag_api_key: Option<String>,
) -> anyhow::Result<Settings> {
    resolve_settings(
        fs::read_to_string("dashboard.toml").ok().as_deref(),
        std::env::var("DASHBOARD_SERVER_URL").ok(),
        std::env::var("DASHBOARD_API_KEY").ok(),
        flag_server_url,
        flag_api_key,
    )
}

fn resolve_settings(
    file_raw: Option<&str>,
    env_server_url: Option<String>,
    env_api_key: Option<String>,
    flag_server_url: Option<String>,
    flag_api_key: Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file_raw {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("api_key") {
                settings.api_key = v.clone();
            }
        }
    }

    if let Some(v) = env_server_url {
        settings.server_url = v;
    }
    if let Some(v) = env_api_key {
        settings.api_key = v;
    }

    if let Some(v) = flag_server_url {
        settings.server_url = v;
    }
    if let Some(v) = flag_api_key {
        settings.api_key = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url)?;
    Ok(settings)
}

fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).with_context(|| format!("invalid server url '{trimmed}'"))?;
    Ok(trimmed.to_string())
}
