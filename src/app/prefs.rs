// src/app/prefs.rs
use std::path::PathBuf;
use std::time::Instant;
use std::{fs, io};

use tracing::warn;

/// Values persisted in `ui_prefs.txt`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiPrefs {
    pub search: String,
    pub list_w: Option<f32>,
}

/// Parse `key=value` lines; unknown keys and `#` comments are skipped.
pub fn parse_prefs(txt: &str) -> UiPrefs {
    let mut out = UiPrefs::default();
    for line in txt.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        match k.trim() {
            "search" => out.search = v.trim().to_string(),
            "list_w" => {
                if let Ok(n) = v.trim().parse::<f32>() {
                    if n.is_finite() {
                        out.list_w = Some(n.clamp(super::LIST_PANEL_MIN_W, super::LIST_PANEL_MAX_W));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

pub fn render_prefs(prefs: &UiPrefs) -> String {
    // one line per key, so a newline in the query would corrupt the file
    let search = prefs.search.replace(['\r', '\n'], " ");
    let mut txt = format!("# popcorn ui prefs\nsearch={search}\n");
    if let Some(w) = prefs.list_w {
        txt.push_str(&format!("list_w={w:.1}\n"));
    }
    txt
}

impl crate::app::PopcornApp {
    // ---- tiny flags ----
    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn mark_dirty(&mut self) {
        self.prefs_dirty = true;
    }

    pub(crate) fn maybe_save_prefs(&mut self) {
        // debounce a bit to avoid writing every frame
        if self.prefs_dirty && self.prefs_last_write.elapsed() >= super::PREFS_SAVE_EVERY {
            self.save_prefs();
            self.prefs_dirty = false;
            self.prefs_last_write = Instant::now();
        }
    }

    // ---- load/save prefs ----
    pub(crate) fn load_prefs(&mut self) {
        let Ok(txt) = fs::read_to_string(prefs_path()) else {
            return;
        };
        let prefs = parse_prefs(&txt);
        self.query_input = prefs.search;
        if let Some(w) = prefs.list_w {
            self.list_panel_width = w;
        }
    }

    pub(crate) fn save_prefs(&self) {
        let prefs = UiPrefs {
            search: self.query_input.clone(),
            list_w: Some(self.list_panel_width),
        };
        if let Err(e) = write_prefs(&prefs) {
            warn!("failed to save ui prefs: {e}");
        }
    }
}

// ---- free helpers kept as functions for reuse at startup ----
pub fn prefs_path() -> PathBuf {
    crate::app::cache::cache_dir().join("ui_prefs.txt")
}

fn write_prefs(prefs: &UiPrefs) -> io::Result<()> {
    let path = prefs_path();
    fs::create_dir_all(path.parent().unwrap_or_else(|| std::path::Path::new(".")))?;
    fs::write(path, render_prefs(prefs))
}
