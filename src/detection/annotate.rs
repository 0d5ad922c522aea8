//! Rectangle and label rendering for annotated detection output.

use std::sync::OnceLock;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::models::Detection;

/// Candidate label font locations, checked in order.
const FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Stroke width of detection rectangles.
const BOX_THICKNESS: i32 = 2;
/// Text size of class labels on the annotated image.
const LABEL_SCALE: f32 = 24.0;
/// Text size of the preview panel captions.
const CAPTION_SCALE: f32 = 16.0;

/// The shared label font, or `None` when no system font could be found.
/// Resolved once; a miss is logged a single time and labels degrade to
/// boxes-only.
pub fn label_font() -> Option<&'static FontVec> {
    static FONT: OnceLock<Option<FontVec>> = OnceLock::new();
    FONT.get_or_init(|| {
        for path in FONT_PATHS {
            if let Ok(bytes) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(bytes) {
                    return Some(font);
                }
            }
        }
        tracing::warn!("no label font found; detections will be drawn without text");
        None
    })
    .as_ref()
}

/// One random color per class index, fixed for a detector's lifetime.
pub fn class_colors(count: usize) -> Vec<Rgb<u8>> {
    (0..count)
        .map(|_| Rgb([rand::random(), rand::random(), rand::random()]))
        .collect()
}

/// Draw one detection: a hollow rectangle plus the class label just above
/// its top-left corner.
pub fn draw_detection(image: &mut RgbImage, detection: &Detection, color: Rgb<u8>, label: &str) {
    let (x1, y1) = detection.bbox.top_left();
    let width = detection.bbox.width() as i32;
    let height = detection.bbox.height() as i32;

    for inset in 0..BOX_THICKNESS {
        let w = width - 2 * inset;
        let h = height - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            image,
            Rect::at(x1 + inset, y1 + inset).of_size(w as u32, h as u32),
            color,
        );
    }

    if let Some(font) = label_font() {
        let scale = PxScale::from(LABEL_SCALE);
        let (_, text_height) = text_size(scale, font, label);
        // Offset the text above the box for better legibility.
        let text_y = (y1 - text_height as i32 - 5).max(0);
        draw_text_mut(image, color, x1.max(0), text_y, scale, font, label);
    }
}

/// Stamp a caption into the top-left corner, backed by a white rectangle so
/// it stays legible over any image content.
pub fn draw_caption(image: &mut RgbaImage, caption: &str) {
    let Some(font) = label_font() else {
        return;
    };

    let scale = PxScale::from(CAPTION_SCALE);
    let (text_width, text_height) = text_size(scale, font, caption);
    draw_filled_rect_mut(
        image,
        Rect::at(0, 0).of_size(text_width + 10, text_height + 10),
        Rgba([255, 255, 255, 255]),
    );
    draw_text_mut(image, Rgba([0, 0, 0, 255]), 5, 5, scale, font, caption);
}
