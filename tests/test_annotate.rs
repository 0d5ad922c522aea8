//! Integration tests for box drawing and caption overlays.
//!
//! Tests cover:
//! - Color table size per class count
//! - Rectangle strokes landing on the box border, not the interior
//! - Degenerate and off-image boxes not panicking
//! - Caption overlay legibility backing

mod common;

use common::*;
use image::{Rgb, Rgba};
use memdetect::detection::annotate::{class_colors, draw_caption, draw_detection, label_font};

#[test]
fn test_color_table_matches_class_count() {
    assert_eq!(class_colors(80).len(), 80);
    assert_eq!(class_colors(0).len(), 0);
}

#[test]
fn test_draw_detection_strokes_border() {
    let mut image = solid_image(64, 64, [0, 0, 0]);
    let target = detection(10.0, 10.0, 40.0, 40.0, 0, 0.9);
    let color = Rgb([255, 0, 0]);

    draw_detection(&mut image, &target, color, "");

    // 2 px stroke on the top-left corner of the box.
    assert_eq!(*image.get_pixel(10, 10), color);
    assert_eq!(*image.get_pixel(11, 11), color);
    // The interior stays untouched.
    assert_eq!(*image.get_pixel(25, 25), Rgb([0, 0, 0]));
}

#[test]
fn test_draw_detection_handles_degenerate_boxes() {
    let mut image = solid_image(16, 16, [0, 0, 0]);

    // Zero-size and off-image boxes must not panic.
    draw_detection(&mut image, &detection(5.0, 5.0, 5.0, 5.0, 0, 0.9), Rgb([255, 0, 0]), "x");
    draw_detection(
        &mut image,
        &detection(-20.0, -20.0, -10.0, -10.0, 0, 0.9),
        Rgb([255, 0, 0]),
        "x",
    );
}

#[test]
fn test_caption_draws_white_backing() {
    let mut image = image::RgbaImage::from_pixel(128, 64, Rgba([10, 10, 10, 255]));
    draw_caption(&mut image, "Input");

    if label_font().is_some() {
        // The backing rectangle starts in the top-left corner.
        assert_eq!(*image.get_pixel(1, 1), Rgba([255, 255, 255, 255]));
    } else {
        // Without a font the overlay is skipped entirely.
        assert_eq!(*image.get_pixel(1, 1), Rgba([10, 10, 10, 255]));
    }
}

#[test]
fn test_caption_survives_tiny_images() {
    let mut image = image::RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
    draw_caption(&mut image, "Detected objects");
}
