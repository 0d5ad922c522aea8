//! Integration tests for the domain types.
//!
//! Tests cover:
//! - Model variant naming and weight paths
//! - Device availability and display names
//! - Bounding box geometry helpers

use memdetect::detection::model::weight_path;
use memdetect::models::{BoundingBox, Device, ModelVariant};

#[test]
fn test_variant_names_cover_the_family() {
    let names: Vec<_> = ModelVariant::ALL
        .iter()
        .map(ModelVariant::file_stem)
        .collect();
    assert_eq!(names, ["yolov8n", "yolov8s", "yolov8m", "yolov8l", "yolov8x"]);
    assert_eq!(ModelVariant::default(), ModelVariant::XLarge);
}

#[test]
fn test_weight_path_lives_under_models_dir() {
    assert_eq!(
        weight_path(ModelVariant::Nano),
        std::path::Path::new("models").join("yolov8n.onnx")
    );
}

#[test]
fn test_cpu_is_always_available() {
    let devices = Device::available();
    assert!(devices.contains(&Device::Cpu));
    assert!(devices.contains(&Device::default_device()));
    assert_eq!(Device::Cpu.to_string(), "CPU");
    assert_eq!(Device::Cuda(0).to_string(), "CUDA 0");
}

#[test]
fn test_bounding_box_corners() {
    let bbox = BoundingBox {
        x1: 1.9,
        y1: 2.9,
        x2: 10.5,
        y2: 20.5,
    };
    assert_eq!(bbox.top_left(), (1, 2));
    assert_eq!(bbox.bottom_right(), (10, 20));
    assert!((bbox.width() - 8.6).abs() < 1e-4);
    assert!((bbox.height() - 17.6).abs() < 1e-4);
}
