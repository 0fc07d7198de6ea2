// src/app/ui/topbar.rs
use std::time::Instant;

use eframe::egui as eg;

/// "Found N results" only once the API reported any.
pub fn results_caption(total_results: u32) -> Option<String> {
    (total_results > 0).then(|| format!("Found {total_results} results"))
}

impl crate::app::PopcornApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ctx: &eg::Context, now: Instant) {
        eg::TopBottomPanel::top("topbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("🍿 usePopcorn");
                ui.separator();

                let mut query = self.query_input.clone();
                let resp = ui.add(
                    eg::TextEdit::singleline(&mut query)
                        .hint_text("Search movies...")
                        .desired_width(280.0),
                );
                if resp.changed() {
                    self.set_query(&query, now);
                }

                ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                    if let Some(caption) = results_caption(self.search.total_results()) {
                        ui.label(eg::RichText::new(caption).strong());
                    }
                });
            });
            ui.add_space(4.0);
        });
    }
}
