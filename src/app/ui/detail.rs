// src/app/ui/detail.rs
use eframe::egui as eg;

use crate::app::gfx::paint_poster;
use crate::app::types::MovieDetail;
use crate::app::utils::poster_title_line;
use crate::app::watchlist::MAX_USER_RATING;

/// "16 Jul 2010 • 148 min", skipping missing halves.
pub fn meta_line(d: &MovieDetail) -> String {
    match (d.released.as_deref(), d.runtime.as_deref()) {
        (Some(r), Some(t)) => format!("{r} • {t}"),
        (Some(r), None) => r.to_string(),
        (None, Some(t)) => t.to_string(),
        (None, None) => "—".into(),
    }
}

pub fn imdb_line(rating: Option<f32>) -> String {
    match rating {
        Some(r) => format!("⭐ {r:.1} IMDb rating"),
        None => "No IMDb rating".into(),
    }
}

pub fn rated_line(user_rating: u8) -> String {
    format!("You rated this movie {user_rating} ⭐")
}

enum DetailAction {
    Back,
    Rate(u8),
    Add,
}

impl crate::app::PopcornApp {
    /// Detail view for the selected movie. Caller guarantees a selection.
    pub(crate) fn ui_render_detail(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("← Back").clicked() {
                action = Some(DetailAction::Back);
            }
            ui.label(eg::RichText::new("Esc").weak().small());
        });
        ui.separator();

        if self.detail.is_loading() {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.add(eg::Spinner::new().size(18.0));
                ui.label("Loading...");
            });
        } else if let Some(err) = self.detail.error() {
            ui.add_space(12.0);
            ui.label(
                eg::RichText::new(format!("⛔ {err}"))
                    .color(eg::Color32::from_rgb(250, 82, 82))
                    .size(16.0),
            );
        } else if let Some(d) = self.detail.detail().cloned() {
            let watched_rating = self.watchlist.get(&d.id).map(|w| w.user_rating);

            eg::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    // Header: poster + facts side by side
                    ui.horizontal_top(|ui| {
                        let poster_w = 160.0;
                        let (rect, _) = ui.allocate_exact_size(
                            eg::vec2(poster_w, poster_w * 1.5),
                            eg::Sense::hover(),
                        );
                        let tex = d
                            .poster_url
                            .as_deref()
                            .and_then(|url| self.posters.texture(ctx, url));
                        paint_poster(ui, rect, tex.as_ref(), &d.title);

                        ui.add_space(12.0);
                        ui.vertical(|ui| {
                            ui.heading(poster_title_line(&d.title, d.year.as_deref().unwrap_or_default()));
                            ui.label(eg::RichText::new(meta_line(&d)).weak());
                            if let Some(genre) = &d.genre {
                                ui.label(genre);
                            }
                            ui.label(imdb_line(d.imdb_rating));
                        });
                    });

                    ui.add_space(10.0);
                    eg::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        if let Some(rating) = watched_rating {
                            ui.label(rated_line(rating));
                        } else {
                            let current = self.detail.user_rating();
                            if let Some(n) =
                                super::stars::star_rating(ui, &d.id, current, MAX_USER_RATING)
                            {
                                action = Some(DetailAction::Rate(n));
                            }
                            if self.detail.can_add(&self.watchlist)
                                && ui.button("+ Add to list").clicked()
                            {
                                action = Some(DetailAction::Add);
                            }
                        }
                        if let Some(notice) = &self.notice {
                            ui.colored_label(eg::Color32::from_rgb(250, 82, 82), notice);
                        }
                    });

                    ui.add_space(10.0);
                    match &d.plot {
                        Some(plot) => ui.label(eg::RichText::new(plot).italics()),
                        None => ui.label(eg::RichText::new("No description").weak()),
                    };
                    if let Some(actors) = &d.actors {
                        ui.label(format!("Starring {actors}"));
                    }
                    if let Some(director) = &d.director {
                        ui.label(format!("Directed by {director}"));
                    }
                });
        }

        match action {
            Some(DetailAction::Back) => self.close_detail(),
            Some(DetailAction::Rate(n)) => self.set_user_rating(n),
            Some(DetailAction::Add) => self.confirm_add(),
            None => {}
        }
    }
}
