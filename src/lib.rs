pub mod detection;
pub mod models;
pub mod nav;
pub mod perf;

pub use detection::ObjectDetector;
pub use models::{BoundingBox, Detection, Device, ModelVariant};

#[cfg(feature = "gui")]
pub mod gui;
