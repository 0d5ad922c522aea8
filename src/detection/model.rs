//! YOLOv8 ONNX session wrapper: preprocessing, inference, decoding, NMS.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{RgbImage, imageops::FilterType};
use ort::execution_providers as ep;
use ort::session::Session;
use ort::value::Tensor;

use crate::models::{BoundingBox, Detection, Device, ModelVariant};

/// Directory model weights are read from, created if absent.
pub const MODELS_DIR: &str = "models";

/// YOLOv8 input size (square).
const INPUT_SIZE: u32 = 640;
/// Minimum score for a raw proposal to survive decoding.
const CANDIDATE_THRESHOLD: f32 = 0.25;
/// IoU threshold for NMS.
const IOU_THRESHOLD: f32 = 0.45;

/// COCO class table used when the model carries no `names` metadata.
const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Path of the weight file for a model variant, e.g. `models/yolov8x.onnx`.
pub fn weight_path(variant: ModelVariant) -> PathBuf {
    Path::new(MODELS_DIR).join(format!("{variant}.onnx"))
}

/// A loaded YOLOv8 detection session.
pub struct YoloModel {
    session: Session,
    class_names: Vec<String>,
}

impl YoloModel {
    /// Load `models/<variant>.onnx` configured for `device`, creating the
    /// `models/` directory if it does not exist yet.
    pub fn load(variant: ModelVariant, device: Device) -> Result<Self> {
        std::fs::create_dir_all(MODELS_DIR).context("failed to create models directory")?;

        let path = weight_path(variant);
        let session = Session::builder()
            .context("failed to create session builder")?
            .with_execution_providers(execution_providers(device))
            .context("failed to register execution providers")?
            .commit_from_file(&path)
            .with_context(|| format!("failed to load model {}", path.display()))?;

        let class_names = metadata_class_names(&session).unwrap_or_else(|| {
            COCO_CLASSES.iter().map(|name| name.to_string()).collect()
        });

        Ok(Self {
            session,
            class_names,
        })
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn class_count(&self) -> usize {
        self.class_names.len()
    }

    /// Run inference on `image`, returning detections mapped back to its
    /// pixel coordinates.
    pub fn predict(&mut self, image: &RgbImage) -> Result<Vec<Detection>> {
        let input = preprocess(image)?;

        let outputs = self
            .session
            .run(ort::inputs!["images" => input])
            .context("inference failed")?;

        let (_name, value) = outputs
            .iter()
            .next()
            .context("model produced no outputs")?;
        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .context("failed to extract output tensor")?;

        let scale_x = image.width() as f32 / INPUT_SIZE as f32;
        let scale_y = image.height() as f32 / INPUT_SIZE as f32;

        let candidates = decode_predictions(
            data,
            self.class_names.len(),
            scale_x,
            scale_y,
            image.width() as f32,
            image.height() as f32,
            CANDIDATE_THRESHOLD,
        );

        Ok(non_max_suppression(candidates, IOU_THRESHOLD))
    }
}

fn execution_providers(device: Device) -> Vec<ep::ExecutionProviderDispatch> {
    match device {
        Device::Cpu => vec![ep::CPUExecutionProvider::default().build()],
        Device::Cuda(index) => vec![
            ep::CUDAExecutionProvider::default()
                .with_device_id(index as i32)
                .build(),
            ep::CPUExecutionProvider::default().build(),
        ],
    }
}

/// Class names from the exporter's `names` metadata entry, when present.
fn metadata_class_names(session: &Session) -> Option<Vec<String>> {
    let metadata = session.metadata().ok()?;
    let names = metadata.custom("names").ok()??;
    parse_names_map(&names)
}

/// Parse an ultralytics `names` map, e.g. `{0: 'person', 1: 'bicycle'}`.
fn parse_names_map(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;

    let mut entries: Vec<(usize, String)> = Vec::new();
    for part in inner.split(',') {
        let (index, name) = part.split_once(':')?;
        let index: usize = index.trim().parse().ok()?;
        let name = name.trim().trim_matches(|c| c == '\'' || c == '"');
        entries.push((index, name.to_string()));
    }

    entries.sort_by_key(|(index, _)| *index);
    Some(entries.into_iter().map(|(_, name)| name).collect())
}

/// Resize to the model's input square, NCHW float tensor normalized to
/// [0, 1].
fn preprocess(image: &RgbImage) -> Result<ort::value::DynValue> {
    let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let raw = resized.as_raw();

    let size = (INPUT_SIZE * INPUT_SIZE) as usize;
    let mut tensor_data = vec![0f32; 3 * size];
    for idx in 0..size {
        tensor_data[idx] = raw[idx * 3] as f32 / 255.0;
        tensor_data[size + idx] = raw[idx * 3 + 1] as f32 / 255.0;
        tensor_data[2 * size + idx] = raw[idx * 3 + 2] as f32 / 255.0;
    }

    let shape = [1usize, 3, INPUT_SIZE as usize, INPUT_SIZE as usize];
    Ok(Tensor::from_array((shape, tensor_data.into_boxed_slice()))
        .context("failed to create input tensor")?
        .into_dyn())
}

/// Decode a raw YOLOv8 output buffer.
///
/// The buffer is laid out `[1, 4 + classes, proposals]`: rows 0-3 hold
/// `cx, cy, w, h` in input-square coordinates, the remaining rows one score
/// per class. Each proposal takes the arg-max class; proposals under
/// `threshold` are dropped, the rest are scaled back to original-image
/// coordinates and clamped to the frame.
pub fn decode_predictions(
    data: &[f32],
    num_classes: usize,
    scale_x: f32,
    scale_y: f32,
    frame_width: f32,
    frame_height: f32,
    threshold: f32,
) -> Vec<Detection> {
    let stride = 4 + num_classes;
    let num_proposals = data.len() / stride;

    let mut detections = Vec::new();
    for i in 0..num_proposals {
        let cx = data[i];
        let cy = data[num_proposals + i];
        let w = data[2 * num_proposals + i];
        let h = data[3 * num_proposals + i];

        let mut class_index = 0;
        let mut confidence = 0f32;
        for c in 0..num_classes {
            let score = data[(4 + c) * num_proposals + i];
            if score > confidence {
                confidence = score;
                class_index = c;
            }
        }

        if confidence < threshold {
            continue;
        }

        let bbox = BoundingBox {
            x1: ((cx - w / 2.0) * scale_x).max(0.0),
            y1: ((cy - h / 2.0) * scale_y).max(0.0),
            x2: ((cx + w / 2.0) * scale_x).min(frame_width),
            y2: ((cy + h / 2.0) * scale_y).min(frame_height),
        };

        detections.push(Detection {
            bbox,
            class_index,
            confidence,
        });
    }

    detections
}

/// Greedy NMS: sort by confidence descending, suppress same-class boxes
/// overlapping a kept box beyond `iou_threshold`.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_unstable_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(detections[i]);
        for j in (i + 1)..detections.len() {
            if detections[j].class_index == detections[i].class_index
                && detections[i].bbox.iou(&detections[j].bbox) > iou_threshold
            {
                suppressed[j] = true;
            }
        }
    }

    kept
}
