// src/app/ui/stars.rs
use eframe::egui as eg;

const STAR_SIZE: f32 = 22.0;
const STAR_GAP: f32 = 2.0;
const FILLED: eg::Color32 = eg::Color32::from_rgb(252, 196, 25);

/// Paint `max` stars; returns the clicked rating (1-based) if any.
/// Hovering previews the rating the click would set.
pub fn star_rating(ui: &mut eg::Ui, id_source: &str, current: u8, max: u8) -> Option<u8> {
    let mut clicked = None;
    let hover_id = eg::Id::new(("star_hover", id_source));
    let hovered_prev: u8 = ui.data(|d| d.get_temp(hover_id)).unwrap_or(0);
    let mut hovered_now = 0u8;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = STAR_GAP;
        for n in 1..=max {
            let (rect, resp) =
                ui.allocate_exact_size(eg::vec2(STAR_SIZE, STAR_SIZE), eg::Sense::click());
            if resp.hovered() {
                hovered_now = n;
            }
            if resp.clicked() {
                clicked = Some(n);
            }

            let shown = if hovered_prev > 0 { hovered_prev } else { current };
            let color = if n <= shown {
                FILLED
            } else {
                ui.visuals().weak_text_color()
            };
            let glyph = if n <= shown { "★" } else { "☆" };
            ui.painter().text(
                rect.center(),
                eg::Align2::CENTER_CENTER,
                glyph,
                eg::FontId::proportional(STAR_SIZE),
                color,
            );
        }

        let label = match (hovered_prev, current) {
            (h, _) if h > 0 => h.to_string(),
            (_, c) if c > 0 => c.to_string(),
            _ => String::new(),
        };
        ui.add_space(8.0);
        ui.label(eg::RichText::new(label).size(18.0).color(FILLED));
    });

    ui.data_mut(|d| d.insert_temp(hover_id, hovered_now));
    if hovered_now != hovered_prev {
        ui.ctx().request_repaint();
    }
    clicked
}
