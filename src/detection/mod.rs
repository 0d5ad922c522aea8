pub mod annotate;
pub mod model;

use std::time::{Duration, Instant};

use anyhow::Result;
use image::{Rgb, RgbImage};

use crate::models::{Detection, Device, ModelVariant};
use model::YoloModel;

/// Detections at or below this confidence are not drawn while filtering is
/// enabled.
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;

/// Detections eligible for drawing under the current filter settings.
pub fn drawable(
    detections: &[Detection],
    should_filter: bool,
    threshold: f32,
) -> impl Iterator<Item = &Detection> {
    detections
        .iter()
        .filter(move |detection| !should_filter || detection.confidence > threshold)
}

/// Wraps a pretrained YOLO model together with per-cycle detection state.
///
/// [`ObjectDetector::detect`] stores its outputs — the detection list, the
/// annotated image copy and both timing measurements — as instance state for
/// the caller to read afterwards.
pub struct ObjectDetector {
    model: YoloModel,
    colors: Vec<Rgb<u8>>,
    conf_threshold: f32,
    pub should_filter: bool,
    results: Vec<Detection>,
    last_image: Option<RgbImage>,
    result_image: Option<RgbImage>,
    prediction_time: Option<Duration>,
    box_draw_time: Option<Duration>,
}

impl ObjectDetector {
    /// Load the given model variant onto `device` and generate a fresh color
    /// table for its classes.
    pub fn new(variant: ModelVariant, device: Device) -> Result<Self> {
        let model = YoloModel::load(variant, device)?;
        let colors = annotate::class_colors(model.class_count());

        Ok(Self {
            model,
            colors,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            should_filter: true,
            results: Vec::new(),
            last_image: None,
            result_image: None,
            prediction_time: None,
            box_draw_time: None,
        })
    }

    /// Run the model on `image`, then draw every detection passing the
    /// confidence filter onto a copy of it. Inference errors propagate.
    pub fn detect(&mut self, image: &RgbImage) -> Result<()> {
        let started = Instant::now();
        let results = self.model.predict(image)?;
        let prediction_time = started.elapsed();

        let draw_started = Instant::now();
        let mut result_image = image.clone();
        for detection in drawable(&results, self.should_filter, self.conf_threshold) {
            annotate::draw_detection(
                &mut result_image,
                detection,
                self.color_of(detection.class_index),
                self.class_name(detection.class_index),
            );
        }
        let box_draw_time = draw_started.elapsed();

        self.results = results;
        self.last_image = Some(image.clone());
        self.result_image = Some(result_image);
        self.prediction_time = Some(prediction_time);
        self.box_draw_time = Some(box_draw_time);

        Ok(())
    }

    /// Detections from the most recent cycle, unfiltered.
    pub fn results(&self) -> &[Detection] {
        &self.results
    }

    /// Input image of the most recent cycle.
    pub fn last_image(&self) -> Option<&RgbImage> {
        self.last_image.as_ref()
    }

    /// Annotated copy produced by the most recent cycle.
    pub fn result_image(&self) -> Option<&RgbImage> {
        self.result_image.as_ref()
    }

    pub fn prediction_time(&self) -> Option<Duration> {
        self.prediction_time
    }

    pub fn box_draw_time(&self) -> Option<Duration> {
        self.box_draw_time
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn class_name(&self, class_index: usize) -> &str {
        self.model
            .class_names()
            .get(class_index)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn color_of(&self, class_index: usize) -> Rgb<u8> {
        self.colors
            .get(class_index)
            .copied()
            .unwrap_or(Rgb([255, 255, 255]))
    }
}
