use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::warn;

use crate::config::{load_config, resolve_relative_path};

// Chosen once on first call
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();

const DEFAULT_CACHE_DIR: &str = ".popcorn_cache";

/// Home of the watchlist database and `ui_prefs.txt`. Posters never land here.
pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let cfg = load_config();
            let path = PathBuf::from(
                cfg.cache_dir
                    .clone()
                    .unwrap_or_else(|| resolve_relative_path(DEFAULT_CACHE_DIR)),
            );
            ensure_dir_or_local(path)
        })
        .clone()
}

fn ensure_dir_or_local(path: PathBuf) -> PathBuf {
    if let Err(e) = fs::create_dir_all(&path) {
        warn!("failed to create cache dir {}: {e}", path.display());
        // Fall back to local folder if creation failed
        let local = PathBuf::from(resolve_relative_path(DEFAULT_CACHE_DIR));
        let _ = fs::create_dir_all(&local);
        return local;
    }
    path
}
