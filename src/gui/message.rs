use std::path::PathBuf;

use crate::models::{Device, ModelVariant};

/// Top-level application messages.
#[derive(Debug, Clone)]
pub enum Message {
    /// One-shot detection timer fired; the payload is the timer generation
    /// the tick belongs to, so stale ticks can be discarded.
    DetectTick(u64),
    /// Fixed-interval preview repaint tick.
    PreviewRefresh(iced::time::Instant),
    ModelSelected(ModelVariant),
    DeviceSelected(Device),
    FilterToggled(bool),
    LabelToggled(bool),
    OpenImage,
    ImageChosen(Option<PathBuf>),
    OpenFolder,
    FolderChosen(Option<PathBuf>),
    PrevClicked,
    NextClicked,
    /// Dismissed dialogs and other fire-and-forget completions.
    Noop,
}
