// src/app/gfx.rs
use eframe::egui::{self as eg, ColorImage, TextureHandle};
use image::GenericImageView;

/// Decoded poster pixels, held in memory until the UI thread uploads them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode `bytes`, shrink to `max_width` (keeping aspect) and return RGBA8.
pub fn decode_resized_rgba(bytes: &[u8], max_width: u32) -> Result<PosterImage, String> {
    use image::imageops::FilterType;

    let img = image::load_from_memory(bytes).map_err(|e| format!("decode: {e}"))?;
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(format!("empty image {w}x{h}"));
    }
    let img = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };
    let (width, height) = img.dimensions();
    Ok(PosterImage {
        width,
        height,
        rgba: img.to_rgba8().into_raw(),
    })
}

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(
    ctx: &eg::Context,
    w: u32,
    h: u32,
    bytes: &[u8],
    name: &str,
) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Paint a poster or, when no texture is ready, a grey placeholder with `label`.
pub fn paint_poster(ui: &eg::Ui, rect: eg::Rect, tex: Option<&TextureHandle>, label: &str) {
    if let Some(tex) = tex {
        ui.painter().image(
            tex.id(),
            rect,
            eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
            eg::Color32::WHITE,
        );
    } else {
        ui.painter().rect_filled(rect, 6.0, eg::Color32::from_gray(40));
        if !label.is_empty() {
            ui.painter().text(
                rect.center(),
                eg::Align2::CENTER_CENTER,
                label,
                eg::FontId::proportional(12.0),
                eg::Color32::GRAY,
            );
        }
    }
}
