// src/app/ui/list.rs
use std::time::Instant;

use eframe::egui as eg;

use crate::app::gfx::paint_poster;
use crate::app::pagination::Pagination;

pub const THUMB_W: f32 = 46.0;
pub const THUMB_H: f32 = THUMB_W * 1.5;
pub const ROW_SPACING: f32 = 6.0;

/// Which pagination buttons to draw: (prev, next). Nothing for a single page.
pub fn pager_buttons(p: &Pagination) -> Option<(bool, bool)> {
    (p.page_count() > 1).then(|| (p.has_prev(), p.has_next()))
}

enum ListAction {
    Select(String),
    Prev,
    Next,
}

impl crate::app::PopcornApp {
    pub(crate) fn ui_render_list_panel(&mut self, ctx: &eg::Context, now: Instant) {
        let panel = eg::SidePanel::left("results_panel")
            .resizable(true)
            .default_width(self.list_panel_width)
            .min_width(super::super::LIST_PANEL_MIN_W)
            .max_width(super::super::LIST_PANEL_MAX_W)
            .show(ctx, |ui| self.ui_render_results(ui, ctx));

        if let Some(action) = panel.inner {
            match action {
                ListAction::Select(id) => self.select_movie(&id),
                ListAction::Prev => self.prev_page(now),
                ListAction::Next => self.next_page(now),
            }
        }

        // Persist the width so it sticks between runs
        let actual_w = panel.response.rect.width();
        if (actual_w - self.list_panel_width).abs() > 0.5 {
            self.list_panel_width = actual_w;
            self.mark_dirty();
        }
    }

    fn ui_render_results(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) -> Option<ListAction> {
        ui.add_space(6.0);

        if self.search.is_loading() {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.add(eg::Spinner::new().size(18.0));
                ui.label("Loading...");
            });
            return None;
        }

        if let Some(err) = self.search.error() {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    eg::RichText::new(format!("⛔ {err}"))
                        .color(eg::Color32::from_rgb(250, 82, 82))
                        .size(16.0),
                );
            });
            return None;
        }

        let mut action = None;
        let results = self.search.results().to_vec();
        let selected = self.detail.selected().map(str::to_string);

        if let Some((show_prev, show_next)) = pager_buttons(self.search.pagination()) {
            ui.horizontal(|ui| {
                if show_prev && ui.button("◀ Prev").clicked() {
                    action = Some(ListAction::Prev);
                }
                ui.label(format!(
                    "Page {} / {}",
                    self.search.page(),
                    self.search.page_count()
                ));
                if show_next && ui.button("Next ▶").clicked() {
                    action = Some(ListAction::Next);
                }
            });
            ui.separator();
        }

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = ROW_SPACING;
                for movie in &results {
                    let is_selected = selected.as_deref() == Some(movie.id.as_str());
                    let row_w = ui.available_width();
                    let (rect, resp) = ui.allocate_exact_size(
                        eg::vec2(row_w, THUMB_H + 8.0),
                        eg::Sense::click(),
                    );

                    if is_selected {
                        ui.painter()
                            .rect_filled(rect, 6.0, ui.visuals().selection.bg_fill);
                    } else if resp.hovered() {
                        ui.painter()
                            .rect_filled(rect, 6.0, ui.visuals().faint_bg_color);
                    }

                    let thumb = eg::Rect::from_min_size(
                        rect.min + eg::vec2(4.0, 4.0),
                        eg::vec2(THUMB_W, THUMB_H),
                    );
                    let tex = movie
                        .poster_url
                        .as_deref()
                        .and_then(|url| self.posters.texture(ctx, url));
                    paint_poster(ui, thumb, tex.as_ref(), "🎞");

                    let text_pos = eg::pos2(thumb.max.x + 12.0, thumb.min.y + 6.0);
                    ui.painter().text(
                        text_pos,
                        eg::Align2::LEFT_TOP,
                        &movie.title,
                        eg::FontId::proportional(15.0),
                        ui.visuals().strong_text_color(),
                    );
                    ui.painter().text(
                        text_pos + eg::vec2(0.0, 24.0),
                        eg::Align2::LEFT_TOP,
                        format!("🗓 {}", movie.year),
                        eg::FontId::proportional(13.0),
                        ui.visuals().weak_text_color(),
                    );

                    if resp.clicked() {
                        action = Some(ListAction::Select(movie.id.clone()));
                    }
                }
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pager_hidden_for_single_page() {
        let mut p = Pagination::default();
        p.set_total_results(9);
        assert_eq!(pager_buttons(&p), None);
    }

    #[test]
    fn pager_hides_prev_on_first_and_next_on_last() {
        let mut p = Pagination::default();
        p.set_total_results(25);
        assert_eq!(pager_buttons(&p), Some((false, true)));
        p.next();
        assert_eq!(pager_buttons(&p), Some((true, true)));
        p.next();
        assert_eq!(pager_buttons(&p), Some((true, false)));
    }
}
