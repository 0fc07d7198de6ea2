// src/app/ui/mod.rs
pub mod detail;
pub mod list;
pub mod stars;
pub mod topbar;
pub mod watched;

use eframe::egui as eg;

impl crate::app::PopcornApp {
    /// Right-hand area: the open movie, or the watched list when nothing is selected.
    pub(crate) fn ui_render_main_panel(&mut self, ctx: &eg::Context) {
        eg::CentralPanel::default().show(ctx, |ui| {
            if self.detail.is_open() {
                self.ui_render_detail(ui, ctx);
            } else {
                self.ui_render_watched(ui, ctx);
            }
            if self.config().omdb_api_key.is_none() {
                ui.with_layout(eg::Layout::bottom_up(eg::Align::Min), |ui| {
                    ui.label(
                        eg::RichText::new(format!(
                            "No OMDb API key. Set omdb_api_key in config.json or {}.",
                            crate::config::API_KEY_ENV
                        ))
                        .weak()
                        .small(),
                    );
                });
            }
        });
    }
}
