use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::api::normalize_base_url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_SETTINGS_FILE: &str = "macro_studio.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub public_only: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            public_only: false,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Command-line values take precedence over file and environment.
    pub fn apply_overrides(
        &mut self,
        server_url: Option<String>,
        download_dir: Option<PathBuf>,
        public_only: bool,
    ) -> Result<(), ConfigError> {
        if let Some(server_url) = server_url {
            self.server_url = validate_server_url(&server_url)?;
        }
        if let Some(download_dir) = download_dir {
            self.download_dir = download_dir;
        }
        if public_only {
            self.public_only = true;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    download_dir: Option<PathBuf>,
    public_only: Option<bool>,
    request_timeout_secs: Option<u64>,
}

/// Loads defaults, then `path` (or `macro_studio.toml` when present), then
/// `MACRO_STUDIO_*` environment variables.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => Some(raw),
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let file = match raw {
        Some(raw) => {
            toml::from_str::<FileSettings>(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        }
        None => FileSettings::default(),
    };

    resolve_settings(file, |name| std::env::var(name).ok())
}

fn resolve_settings(
    file: FileSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.download_dir {
        settings.download_dir = v;
    }
    if let Some(v) = file.public_only {
        settings.public_only = v;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = timeout_from_secs(v);
    }

    if let Some(v) = env("MACRO_STUDIO_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("MACRO_STUDIO_DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = env("MACRO_STUDIO_PUBLIC_ONLY") {
        settings.public_only = parse_flag("MACRO_STUDIO_PUBLIC_ONLY", &v)?;
    }
    if let Some(v) = env("MACRO_STUDIO_REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "MACRO_STUDIO_REQUEST_TIMEOUT_SECS",
                value: v.clone(),
            })?;
        settings.request_timeout_secs = timeout_from_secs(secs);
    }

    settings.server_url = validate_server_url(&settings.server_url)?;
    Ok(settings)
}

/// Zero means no timeout, in every layer.
fn timeout_from_secs(secs: u64) -> Option<u64> {
    (secs > 0).then_some(secs)
}

fn validate_server_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    normalize_base_url(trimmed).map_err(|_| ConfigError::InvalidValue {
        key: "server_url",
        value: raw.to_string(),
    })?;
    Ok(trimmed.to_string())
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
