// src/app/mod.rs: debounced OMDb search, detail panel and the persisted watchlist

// ---- Standard lib imports ----
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{debug, info, warn};

// ---- Local modules ----
pub mod cache;
pub mod cancel;
pub mod debounce;
pub mod details;
pub mod error;
pub mod gfx;
pub mod notify;
pub mod omdb;
pub mod pagination;
pub mod posters;
pub mod prefs;
pub mod search;
pub mod shortcuts;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
pub mod watchlist;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::{load_config, local_storage_db_path, AppConfig};
use details::{DetailController, DetailEvent};
use omdb::{MissingKeyApi, MovieApi, OmdbClient};
use posters::PosterLoader;
use search::SearchController;
use shortcuts::{ShortcutAction, ShortcutRegistry};
use storage::{KeyValueStore, MemoryStore, SqliteStore};
use watchlist::WatchlistStore;
use worker::Waker;

// ---- Tunables ----
pub const APP_TITLE: &str = "usePopcorn // movie tracker";
const LIST_PANEL_MIN_W: f32 = 280.0;
const LIST_PANEL_MAX_W: f32 = 640.0;
const LIST_PANEL_DEFAULT_W: f32 = 380.0;
const PREFS_SAVE_EVERY: Duration = Duration::from_millis(300);

/// Window title for a detail event; `None` leaves the title alone.
pub fn window_title_for(event: &DetailEvent) -> Option<String> {
    match event {
        DetailEvent::Loaded { title, .. } => Some(format!("usePopcorn // {title}")),
        DetailEvent::Closed => Some(APP_TITLE.to_string()),
        DetailEvent::Opened(_) | DetailEvent::Failed { .. } => None,
    }
}

pub struct PopcornApp {
    config: AppConfig,

    // controllers
    search: SearchController,
    detail: DetailController,
    watchlist: WatchlistStore,
    shortcuts: ShortcutRegistry,
    posters: PosterLoader,

    // ui state
    query_input: String,
    list_panel_width: f32,
    notice: Option<String>,

    // prefs autosave
    prefs_dirty: bool,
    prefs_last_write: Instant,

    // one-time init guard
    did_init: bool,
}

impl PopcornApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = load_config();

        let api: Arc<dyn MovieApi> = match config.omdb_api_key.as_deref() {
            Some(key) => match OmdbClient::new(&config.omdb_base_url, key) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    warn!("omdb client unavailable: {e}");
                    Arc::new(MissingKeyApi)
                }
            },
            None => Arc::new(MissingKeyApi),
        };

        let db_path = local_storage_db_path();
        let storage: Box<dyn KeyValueStore> = match SqliteStore::open(&db_path) {
            Ok(store) => {
                info!("watchlist storage at {}", db_path.display());
                Box::new(store)
            }
            Err(e) => {
                warn!(
                    "could not open {} ({e}); watchlist will not survive a restart",
                    db_path.display()
                );
                Box::new(MemoryStore::new())
            }
        };

        let ctx = cc.egui_ctx.clone();
        let waker: Waker = Arc::new(move || ctx.request_repaint());
        let posters = PosterLoader::new(config.worker_count, Some(Arc::clone(&waker)));

        let mut app = Self::from_parts(config, api, storage, posters);
        app.search.set_waker(Arc::clone(&waker));
        app.detail.set_waker(waker);

        let ctx = cc.egui_ctx.clone();
        app.detail.subscribe(move |event| {
            if let Some(title) = window_title_for(event) {
                ctx.send_viewport_cmd(eg::ViewportCommand::Title(title));
            }
        });

        app.watchlist.subscribe(|event| info!(?event, "watchlist changed"));
        app.search.subscribe(|event| debug!(?event, "search"));

        app.load_prefs();
        app
    }

    /// Assemble the app from already-built collaborators (no window, no disk prefs).
    pub fn from_parts(
        config: AppConfig,
        api: Arc<dyn MovieApi>,
        storage: Box<dyn KeyValueStore>,
        posters: PosterLoader,
    ) -> Self {
        let search = SearchController::new(Arc::clone(&api), config.debounce());
        let detail = DetailController::new(api);
        let watchlist = WatchlistStore::load(storage, &config.storage_key);
        info!("loaded {} watched movie(s)", watchlist.len());

        Self {
            config,
            search,
            detail,
            watchlist,
            shortcuts: ShortcutRegistry::new(),
            posters,
            query_input: String::new(),
            list_panel_width: LIST_PANEL_DEFAULT_W,
            notice: None,
            prefs_dirty: false,
            prefs_last_write: Instant::now(),
            did_init: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ---- intents ----
    pub(crate) fn set_query(&mut self, query: &str, now: Instant) {
        if self.query_input != query {
            self.query_input = query.to_string();
        }
        self.search.set_query(query, now);
        self.mark_dirty();
    }

    pub(crate) fn next_page(&mut self, now: Instant) {
        self.search.next_page(now);
    }

    pub(crate) fn prev_page(&mut self, now: Instant) {
        self.search.prev_page(now);
    }

    pub(crate) fn select_movie(&mut self, id: &str) {
        self.notice = None;
        self.detail.select(id, &mut self.shortcuts);
    }

    pub(crate) fn close_detail(&mut self) {
        self.detail.close(&mut self.shortcuts);
    }

    pub(crate) fn set_user_rating(&mut self, rating: u8) {
        self.detail.set_user_rating(rating);
    }

    pub(crate) fn confirm_add(&mut self) {
        match self
            .detail
            .confirm_add(&mut self.watchlist, &mut self.shortcuts)
        {
            Ok(()) => self.notice = None,
            Err(e) => {
                warn!("add to list failed: {e}");
                self.notice = Some(e.to_string());
            }
        }
    }

    pub(crate) fn remove_watched(&mut self, id: &str) {
        if !self.watchlist.remove(id) {
            warn!("remove ignored, {id} is not in the watchlist");
        }
    }

    /// Route a key press through the shortcut registry.
    pub(crate) fn handle_key(&mut self, key: &str) {
        for action in self.shortcuts.dispatch(key) {
            match action {
                ShortcutAction::CloseDetail => self.close_detail(),
            }
        }
    }

    /// Per-frame bookkeeping that does not paint. Returns true if state changed.
    pub(crate) fn step(&mut self, now: Instant) -> bool {
        let mut changed = self.search.poll();
        if self.search.tick(now) {
            // A fresh search replaces whatever the panel was showing.
            self.close_detail();
            changed = true;
        }
        changed |= self.detail.poll();
        changed |= self.posters.poll();
        self.request_visible_posters();
        changed
    }

    /// Request every poster on screen and drop the ones that scrolled out of
    /// the results, detail and watchlist.
    fn request_visible_posters(&mut self) {
        let urls: Vec<String> = self
            .search
            .results()
            .iter()
            .filter_map(|r| r.poster_url.clone())
            .chain(self.detail.detail().and_then(|d| d.poster_url.clone()))
            .chain(
                self.watchlist
                    .entries()
                    .iter()
                    .filter(|w| w.has_poster())
                    .filter_map(|w| w.poster_url.clone()),
            )
            .collect();
        for url in &urls {
            self.posters.request(url);
        }
        let wanted: HashSet<&str> = urls.iter().map(|u| u.trim()).collect();
        self.posters.retain_only(&wanted);
    }

    fn on_first_frame(&mut self, now: Instant) {
        if self.did_init {
            return;
        }
        self.did_init = true;
        if !self.query_input.is_empty() {
            let q = self.query_input.clone();
            info!("restoring last query {q:?}");
            self.search.set_query(&q, now);
        }
    }
}

impl eframe::App for PopcornApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.on_first_frame(now);

        let pressed: Vec<eg::Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    eg::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect()
        });
        for key in pressed {
            self.handle_key(key.name());
        }

        if self.step(now) {
            ctx.request_repaint();
        }
        self.posters.begin_frame();

        self.ui_render_topbar(ctx, now);
        self.ui_render_list_panel(ctx, now);
        self.ui_render_main_panel(ctx);

        if let Some(wait) = self.search.debounce_remaining(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
        self.maybe_save_prefs();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.search.shutdown();
        self.close_detail();
        self.posters.shutdown();
        if self.prefs_dirty {
            self.save_prefs();
        }
    }
}
