// src/app/ui/watched.rs
use eframe::egui as eg;

use crate::app::gfx::paint_poster;
use crate::app::utils::poster_title_line;
use crate::app::watchlist::WatchedSummary;

use super::list::{THUMB_H, THUMB_W};

pub fn summary_line(s: &WatchedSummary) -> String {
    format!(
        "#️⃣ {} movies   ⭐ {}   🌟 {}   ⏳ {} min",
        s.count, s.avg_imdb_rating, s.avg_user_rating, s.avg_runtime
    )
}

impl crate::app::PopcornApp {
    pub(crate) fn ui_render_watched(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let summary = self.watchlist.summary();
        eg::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(eg::RichText::new("Movies you watched").strong().size(16.0));
            ui.label(summary_line(&summary));
        });
        ui.add_space(8.0);

        if self.watchlist.is_empty() {
            ui.label(eg::RichText::new("Nothing here yet. Rate a movie to add it.").weak());
            return;
        }

        let entries = self.watchlist.entries().to_vec();
        let mut remove: Option<String> = None;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for w in &entries {
                    ui.horizontal(|ui| {
                        let (rect, _) = ui
                            .allocate_exact_size(eg::vec2(THUMB_W, THUMB_H), eg::Sense::hover());
                        let tex = w
                            .poster_url
                            .as_deref()
                            .filter(|_| w.has_poster())
                            .and_then(|url| self.posters.texture(ctx, url));
                        paint_poster(ui, rect, tex.as_ref(), "🎞");

                        ui.vertical(|ui| {
                            ui.label(eg::RichText::new(poster_title_line(&w.title, &w.year)).strong());
                            ui.horizontal(|ui| {
                                let imdb = w
                                    .imdb_rating
                                    .map(|r| format!("{r:.1}"))
                                    .unwrap_or_else(|| "—".into());
                                let runtime = w
                                    .runtime_minutes
                                    .map(|m| format!("{m} min"))
                                    .unwrap_or_else(|| "—".into());
                                ui.label(format!("⭐ {imdb}"));
                                ui.label(format!("🌟 {}", w.user_rating));
                                ui.label(format!("⏳ {runtime}"));
                            });
                        });

                        ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                            if ui
                                .small_button("✖")
                                .on_hover_text("Remove from list")
                                .clicked()
                            {
                                remove = Some(w.id.clone());
                            }
                        });
                    });
                    ui.separator();
                }
            });

        if let Some(id) = remove {
            self.remove_watched(&id);
        }
    }
}
