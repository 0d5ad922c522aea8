use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use memdetect::models::{BoundingBox, Detection};

/// Creates a solid-color test image.
pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, _| Rgb(color))
}

/// Writes `count` sequentially named images (`0.png`, `1.png`, …) into `dir`.
pub fn write_indexed_images(dir: &Path, count: u32) -> anyhow::Result<()> {
    for index in 0..count {
        solid_image(32, 32, [0, 128, 255]).save(dir.join(format!("{index}.png")))?;
    }
    Ok(())
}

/// Builds a detection from corner coordinates.
pub fn detection(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_index: usize,
    confidence: f32,
) -> Detection {
    Detection {
        bbox: BoundingBox { x1, y1, x2, y2 },
        class_index,
        confidence,
    }
}

/// Builds a raw YOLO-style output buffer with layout `[4 + classes][proposals]`
/// from `(cx, cy, w, h, class, score)` rows. All scores other than the given
/// class score stay zero.
pub fn raw_predictions(
    num_classes: usize,
    proposals: &[(f32, f32, f32, f32, usize, f32)],
) -> Vec<f32> {
    let n = proposals.len();
    let mut data = vec![0.0f32; (4 + num_classes) * n];
    for (i, &(cx, cy, w, h, class, score)) in proposals.iter().enumerate() {
        data[i] = cx;
        data[n + i] = cy;
        data[2 * n + i] = w;
        data[3 * n + i] = h;
        data[(4 + class) * n + i] = score;
    }
    data
}
