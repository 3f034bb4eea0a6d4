use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const MAX_PAGE_SIZE: u32 = 500;
const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to resolve application directories")]
    NoProjectDirs,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Optional overrides read from `config.yml`.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub page_size: Option<u32>,
    pub search_debounce_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub db_path: PathBuf,
}

impl AppConfig {
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_path,
        }
    }

    /// Defaults, then `config.yml` from the config directory, then the
    /// `PROPDASH_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let dirs = project_dirs()?;
        let mut config = Self::with_db_path(dirs.data_local_dir().join("preferences.sqlite"));

        let config_path = dirs.config_dir().join("config.yml");
        if let Some(file) = read_config_file(&config_path)? {
            config.apply_file(file);
        }
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(token) = file.api_token.filter(|token| !token.trim().is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(page_size) = file.page_size {
            self.page_size = page_size;
        }
        if let Some(debounce) = file.search_debounce_ms {
            self.search_debounce_ms = debounce;
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(path) = file.db_path {
            self.db_path = expand_tilde(&path);
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROPDASH_API_URL") {
            self.api_base_url = url;
        }
        if let Some(token) = lookup("PROPDASH_API_TOKEN").filter(|token| !token.trim().is_empty())
        {
            self.api_token = Some(token);
        }
        if let Some(raw) = lookup("PROPDASH_PAGE_SIZE") {
            self.page_size = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "PROPDASH_PAGE_SIZE",
                message: format!("{raw} is not a number"),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("{url} must start with http:// or https://"),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                field: "page_size",
                message: format!("expected 1..={MAX_PAGE_SIZE}, got {}", self.page_size),
            });
        }
        if self.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(ConfigError::Invalid {
                field: "search_debounce_ms",
                message: format!(
                    "expected at most {MAX_SEARCH_DEBOUNCE_MS}, got {}",
                    self.search_debounce_ms
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("com", "propdash", "propdash").ok_or(ConfigError::NoProjectDirs)
}

pub fn read_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config_file(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}

pub fn parse_config_file(raw: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(raw)
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(stripped);
        }
    }
    PathBuf::from(path)
}
