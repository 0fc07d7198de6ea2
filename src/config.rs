use std::{env, fs, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";
pub const DEFAULT_STORAGE_KEY: &str = "watchedMovies";
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const LOCAL_STORAGE_DB_FILE: &str = "popcorn.db";
pub const API_KEY_ENV: &str = "POPCORN_OMDB_API_KEY";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cache_dir: Option<String>,
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    pub debounce_ms: u64,
    pub storage_key: String,
    pub worker_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            omdb_api_key: None,
            omdb_base_url: DEFAULT_OMDB_BASE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl AppConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    cache_dir: Option<String>,
    #[serde(alias = "api_key")]
    omdb_api_key: Option<String>,
    omdb_base_url: Option<String>,
    debounce_ms: Option<u64>,
    storage_key: Option<String>,
    worker_count: Option<usize>,
}

/// Merge a raw `config.json` body over the defaults.
fn apply_raw(cfg: &mut AppConfig, raw: &str) -> Result<(), serde_json::Error> {
    let parsed = serde_json::from_str::<RawConfig>(raw)?;
    if parsed.cache_dir.is_some() {
        cfg.cache_dir = parsed.cache_dir;
    }
    if parsed.omdb_api_key.is_some() {
        cfg.omdb_api_key = parsed.omdb_api_key;
        if raw.contains("\"api_key\"") {
            warn!("`api_key` is deprecated; rename it to `omdb_api_key` in config.json.");
        }
    }
    if let Some(url) = parsed.omdb_base_url.filter(|u| !u.trim().is_empty()) {
        cfg.omdb_base_url = url;
    }
    if let Some(ms) = parsed.debounce_ms {
        cfg.debounce_ms = ms;
    }
    if let Some(key) = parsed.storage_key.filter(|k| !k.trim().is_empty()) {
        cfg.storage_key = key;
    }
    if let Some(n) = parsed.worker_count {
        cfg.worker_count = n.clamp(1, 16);
    }
    Ok(())
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from(CONFIG_FILE);
    let mut cfg = AppConfig::default();

    match fs::read_to_string(&cfg_path) {
        Ok(raw) => match apply_raw(&mut cfg, &raw) {
            Ok(()) => info!("Loaded config from {}", cfg_path.display()),
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
                cfg = AppConfig::default();
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
        }
    }

    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            cfg.omdb_api_key = Some(key);
        }
    }

    if cfg.omdb_api_key.is_none() {
        warn!("No OMDb API key configured; set `omdb_api_key` in config.json or {API_KEY_ENV}.");
    }

    cfg
}

/// Resolve a path relative to the current working directory.
pub fn resolve_relative_path(rel: &str) -> String {
    env::current_dir()
        .map(|cwd| cwd.join(rel).to_string_lossy().into_owned())
        .unwrap_or_else(|_| rel.to_string())
}

pub fn local_storage_db_path() -> PathBuf {
    crate::app::cache::cache_dir().join(LOCAL_STORAGE_DB_FILE)
}
