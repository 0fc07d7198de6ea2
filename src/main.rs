// src/main.rs
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const RENDERER_ENV: &str = "POPCORN_RENDERER";

/// `glow` or `wgpu`; anything else means "use the platform default".
fn parse_renderer(value: Option<&str>) -> Option<eframe::Renderer> {
    match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("glow") => Some(eframe::Renderer::Glow),
        Some("wgpu") => Some(eframe::Renderer::Wgpu),
        _ => None,
    }
}

fn pick_renderer() -> eframe::Renderer {
    let requested = env::var(RENDERER_ENV).ok();
    if let Some(r) = parse_renderer(requested.as_deref()) {
        return r;
    }
    if let Some(other) = requested {
        warn!("{RENDERER_ENV}={other:?} is not glow or wgpu; using the default");
    }
    // Unset or unknown: wgpu on Windows, glow everywhere else
    #[cfg(target_os = "windows")]
    { eframe::Renderer::Wgpu }
    #[cfg(not(target_os = "windows"))]
    { eframe::Renderer::Glow }
}

/// Linux only: true when neither a Wayland nor an X11 display is reachable.
#[cfg(target_os = "linux")]
fn no_display() -> bool {
    env::var_os("WAYLAND_DISPLAY").is_none() && env::var_os("DISPLAY").is_none()
}

#[cfg(not(target_os = "linux"))]
fn no_display() -> bool {
    false
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let renderer = pick_renderer();
    info!(?renderer, "starting {}", popcorn::app::APP_TITLE);
    if no_display() {
        warn!("no WAYLAND_DISPLAY or DISPLAY set; the window will likely fail to open");
    }

    let options = eframe::NativeOptions {
        renderer,
        multisampling: 0,
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(popcorn::app::APP_TITLE)
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    match eframe::run_native(
        popcorn::app::APP_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(popcorn::app::PopcornApp::new(cc)))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("popcorn window failed to open: {e:?}");
            let other = if matches!(renderer, eframe::Renderer::Glow) {
                "wgpu"
            } else {
                "glow"
            };
            error!("Hint: retry with {RENDERER_ENV}={other}. Your watchlist is untouched.");
            Err(e)
        }
    }
}
