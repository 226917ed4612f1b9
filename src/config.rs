use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "eldercare-tui";
const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
}

// Every key is optional so a partial file only overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    session_path: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Config {
    /// Resolves configuration as env > config file > defaults.
    pub fn load() -> Result<Config, ConfigError> {
        let file = match dirs::config_dir() {
            Some(dir) => read_file_config(&dir.join(APP_DIR).join("config.toml"))?,
            None => FileConfig::default(),
        };
        Ok(Config::resolve(file, |key| env::var(key).ok()))
    }

    fn resolve(file: FileConfig, var: impl Fn(&str) -> Option<String>) -> Config {
        let api_base_url = var("ELDERCARE_API_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let session_path = var("ELDERCARE_SESSION_FILE")
            .map(PathBuf::from)
            .or(file.session_path)
            .unwrap_or_else(|| app_dir(dirs::data_dir()).join("session.json"));

        let download_dir = var("ELDERCARE_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or(file.download_dir)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_file = var("ELDERCARE_LOG_FILE")
            .map(PathBuf::from)
            .or(file.log_file)
            .unwrap_or_else(|| app_dir(dirs::cache_dir()).join("eldercare.log"));

        Config {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_path,
            download_dir,
            log_file,
        }
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        debug!("no config file at {}", path.display());
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let parsed = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    info!("loaded config file {}", path.display());
    Ok(parsed)
}
