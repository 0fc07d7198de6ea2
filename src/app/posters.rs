// src/app/posters.rs
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use super::gfx::{decode_resized_rgba, upload_rgba, PosterImage};
use super::types::PosterState;
use super::worker::Waker;

pub const RESIZE_MAX_W: u32 = 320;
pub const MAX_DONE_PER_FRAME: usize = 12;
pub const MAX_UPLOADS_PER_FRAME: usize = 4;

/// Turns a poster url into decoded pixels. Runs on a worker thread.
pub type FetchFn = Arc<dyn Fn(&str) -> Result<PosterImage, String> + Send + Sync>;

struct PosterDone {
    url: String,
    result: Result<PosterImage, String>,
}

struct PosterSlot {
    state: PosterState,
    image: Option<PosterImage>,
    tex: Option<TextureHandle>,
}

/// Download a poster with a shared client and decode it, shrunk to `max_width`.
pub fn download_poster_rgba(
    client: &Client,
    url: &str,
    max_width: u32,
) -> Result<PosterImage, String> {
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;
    decode_resized_rgba(&bytes, max_width)
}

/// Downloads posters on a small worker pool and hands them to the UI as textures.
/// Nothing is written to disk; a slot lives only while its url is on screen.
pub struct PosterLoader {
    slots: HashMap<String, PosterSlot>,
    work_tx: Option<Sender<String>>,
    done_rx: Receiver<PosterDone>,
    uploads_left: usize,
}

impl PosterLoader {
    /// Pool sharing one HTTP client.
    pub fn new(worker_count: usize, waker: Option<Waker>) -> Self {
        let client = Client::builder()
            .user_agent("popcorn/posters")
            .timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(8)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build();

        let fetch: FetchFn = match client {
            Ok(client) => {
                Arc::new(move |url: &str| download_poster_rgba(&client, url, RESIZE_MAX_W))
            }
            Err(e) => {
                warn!("poster http client build failed: {e}");
                let msg = format!("http client unavailable: {e}");
                Arc::new(move |_: &str| Err(msg.clone()))
            }
        };
        Self::with_fetcher(worker_count, fetch, waker)
    }

    pub fn with_fetcher(worker_count: usize, fetch: FetchFn, waker: Option<Waker>) -> Self {
        let (work_tx, work_rx) = mpsc::channel::<String>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for n in 0..worker_count.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let fetch = Arc::clone(&fetch);
            let waker = waker.clone();

            let spawned = std::thread::Builder::new()
                .name(format!("popcorn-poster-{n}"))
                .spawn(move || loop {
                    let job = {
                        let Ok(rx) = work_rx.lock() else { break };
                        rx.recv()
                    };
                    let Ok(url) = job else { break };

                    let result = fetch(&url);
                    if done_tx.send(PosterDone { url, result }).is_err() {
                        break;
                    }
                    if let Some(w) = &waker {
                        w();
                    }
                });
            if let Err(e) = spawned {
                warn!("failed to spawn poster worker {n}: {e}");
            }
        }

        Self {
            slots: HashMap::new(),
            work_tx: Some(work_tx),
            done_rx,
            uploads_left: MAX_UPLOADS_PER_FRAME,
        }
    }

    /// Queue `url` unless it is already known. Blank urls are ignored.
    pub fn request(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() || self.slots.contains_key(url) {
            return;
        }
        let state = match &self.work_tx {
            Some(tx) if tx.send(url.to_string()).is_ok() => PosterState::Pending,
            _ => PosterState::Failed,
        };
        self.slots.insert(
            url.to_string(),
            PosterSlot {
                state,
                image: None,
                tex: None,
            },
        );
    }

    /// Forget every url not in `wanted`, freeing its pixels and texture.
    /// A download still running for an evicted url is dropped when it lands.
    pub fn retain_only(&mut self, wanted: &HashSet<&str>) {
        let before = self.slots.len();
        self.slots.retain(|url, _| wanted.contains(url.as_str()));
        let evicted = before - self.slots.len();
        if evicted > 0 {
            debug!("evicted {evicted} poster(s), {} kept", self.slots.len());
        }
    }

    pub fn state(&self, url: &str) -> Option<PosterState> {
        self.slots.get(url.trim()).map(|s| s.state)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Drain finished downloads. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut drained = 0usize;
        while drained < MAX_DONE_PER_FRAME {
            match self.done_rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    let Some(slot) = self.slots.get_mut(&msg.url) else {
                        continue;
                    };
                    match msg.result {
                        Ok(image) => {
                            slot.image = Some(image);
                            slot.state = PosterState::Decoded; // uploaded lazily during paint
                        }
                        Err(e) => {
                            debug!("poster download failed: {} - {e}", msg.url);
                            slot.state = PosterState::Failed;
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        drained > 0
    }

    /// Reset the per-frame texture upload budget.
    pub fn begin_frame(&mut self) {
        self.uploads_left = MAX_UPLOADS_PER_FRAME;
    }

    /// Texture for `url`, uploading decoded pixels if this frame still has budget.
    /// (UI thread only)
    pub fn texture(&mut self, ctx: &eg::Context, url: &str) -> Option<TextureHandle> {
        let url = url.trim();
        let slot = self.slots.get_mut(url)?;
        if let Some(tex) = &slot.tex {
            return Some(tex.clone());
        }
        if slot.state != PosterState::Decoded || self.uploads_left == 0 {
            return None;
        }
        let image = slot.image.take()?;
        self.uploads_left -= 1;

        let tex = upload_rgba(ctx, image.width, image.height, &image.rgba, url);
        slot.tex = Some(tex.clone());
        slot.state = PosterState::Ready;
        Some(tex)
    }

    /// Stop the workers once their current job finishes.
    pub fn shutdown(&mut self) {
        self.work_tx = None;
    }
}

impl Drop for PosterLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
