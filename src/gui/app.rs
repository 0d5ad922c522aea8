use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use iced::widget::{button, checkbox, column, container, pick_list, row, scrollable, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use image::RgbImage;
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageLevel};

use super::message::Message;
use super::preview::PreviewPanel;
use crate::detection::ObjectDetector;
use crate::models::{Device, ModelVariant};
use crate::nav::ImageFolder;
use crate::perf::PerfDisplay;

/// Delay before the next detection cycle; the timer is one-shot and re-armed
/// only after a cycle completes, so cycles never overlap.
const DETECT_INTERVAL: Duration = Duration::from_millis(50);
/// Fixed preview repaint cadence.
const PREVIEW_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Launch the application window with `initial_image` preloaded.
pub fn run(initial_image: PathBuf) -> iced::Result {
    iced::application(
        move || App::new(initial_image.clone()),
        App::update,
        App::view,
    )
    .title("Memory Detector")
    .subscription(App::subscription)
    .theme(App::theme)
    .window_size((1700.0, 560.0))
    .run()
}

pub struct App {
    devices: Vec<Device>,
    current_model: ModelVariant,
    current_device: Device,
    detector: Option<ObjectDetector>,
    image: Option<RgbImage>,
    folder: Option<ImageFolder>,
    input_panel: PreviewPanel,
    detection_panel: PreviewPanel,
    detection_time: PerfDisplay,
    box_draw_time: PerfDisplay,
    paint_time: PerfDisplay,
    filter_confidences: bool,
    label_previews: bool,
    detections: Vec<(String, f32)>,
    timer_generation: u64,
}

impl App {
    fn new(initial_image: PathBuf) -> (Self, Task<Message>) {
        let current_model = ModelVariant::default();
        let current_device = Device::default_device();

        let detector = match ObjectDetector::new(current_model, current_device) {
            Ok(detector) => Some(detector),
            Err(error) => {
                tracing::error!(%error, "failed to load object detector");
                None
            }
        };

        let mut app = Self {
            devices: Device::available(),
            current_model,
            current_device,
            detector,
            image: None,
            folder: None,
            input_panel: PreviewPanel::new("Input"),
            detection_panel: PreviewPanel::new("Detected objects"),
            detection_time: PerfDisplay::new("Detection"),
            box_draw_time: PerfDisplay::new("Box drawing"),
            paint_time: PerfDisplay::new("Paint"),
            filter_confidences: true,
            label_previews: true,
            detections: Vec::new(),
            timer_generation: 0,
        };

        match load_image(&initial_image) {
            Ok(image) => {
                app.input_panel.update_image(&image);
                app.image = Some(image);
            }
            Err(error) => {
                tracing::warn!(%error, path = %initial_image.display(), "could not load startup image");
            }
        }

        let task = app.restart_detection();
        (app, task)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(PREVIEW_REFRESH_INTERVAL).map(Message::PreviewRefresh)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DetectTick(generation) => self.on_detect_tick(generation),
            // Re-rendering happens after every message; the tick itself is
            // what keeps the previews repainting with no other input.
            Message::PreviewRefresh(_) => Task::none(),
            Message::ModelSelected(variant) => {
                self.current_model = variant;
                self.reload_detector()
            }
            Message::DeviceSelected(device) => {
                self.current_device = device;
                self.reload_detector()
            }
            Message::FilterToggled(checked) => {
                self.filter_confidences = checked;
                if let Some(detector) = self.detector.as_mut() {
                    detector.should_filter = checked;
                }
                Task::none()
            }
            Message::LabelToggled(checked) => {
                self.label_previews = checked;
                self.input_panel.set_labeled(checked);
                self.detection_panel.set_labeled(checked);
                Task::none()
            }
            Message::OpenImage => {
                self.stop_detection();
                Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Open an image")
                        .add_filter("Image files", &["png", "jpg", "jpeg"])
                        .pick_file(),
                    |handle| Message::ImageChosen(handle.map(|file| file.path().to_path_buf())),
                )
            }
            Message::ImageChosen(None) => self.restart_detection(),
            Message::ImageChosen(Some(path)) => self.open_image(path),
            Message::OpenFolder => {
                self.stop_detection();
                Task::perform(
                    AsyncFileDialog::new().set_title("Open a folder").pick_folder(),
                    |handle| Message::FolderChosen(handle.map(|dir| dir.path().to_path_buf())),
                )
            }
            Message::FolderChosen(None) => self.restart_detection(),
            Message::FolderChosen(Some(dir)) => self.open_folder(dir),
            Message::PrevClicked => self.show_previous(),
            Message::NextClicked => self.show_next(),
            Message::Noop => Task::none(),
        }
    }

    /// Invalidate the current one-shot timer; pending ticks become stale.
    fn stop_detection(&mut self) {
        self.timer_generation += 1;
    }

    /// Arm a fresh one-shot detection timer.
    fn restart_detection(&mut self) -> Task<Message> {
        self.timer_generation += 1;
        let generation = self.timer_generation;
        Task::perform(tokio::time::sleep(DETECT_INTERVAL), move |_| {
            Message::DetectTick(generation)
        })
    }

    fn reset_timers(&mut self) {
        self.detection_time.reset();
        self.box_draw_time.reset();
        self.paint_time.reset();
    }

    /// Tear down and reconstruct the detector for the current model/device
    /// selection. The detection timer restarts either way.
    fn reload_detector(&mut self) -> Task<Message> {
        self.stop_detection();

        match ObjectDetector::new(self.current_model, self.current_device) {
            Ok(mut detector) => {
                detector.should_filter = self.filter_confidences;
                self.detector = Some(detector);
            }
            Err(error) => {
                tracing::error!(%error, model = %self.current_model, device = %self.current_device, "failed to reload object detector");
                self.detector = None;
                self.reset_timers();
                return Task::batch([
                    error_dialog(format!("Couldn't load model: {error:#}")),
                    self.restart_detection(),
                ]);
            }
        }

        self.reset_timers();
        self.restart_detection()
    }

    /// One detection cycle: detect, update the detection panel, feed the
    /// performance displays, repopulate the detection list, re-arm.
    fn on_detect_tick(&mut self, generation: u64) -> Task<Message> {
        if generation != self.timer_generation {
            return Task::none();
        }

        if let (Some(detector), Some(image)) = (self.detector.as_mut(), self.image.as_ref()) {
            if let Err(error) = detector.detect(image) {
                tracing::error!(%error, "inference failed; detection cycle stopped");
                return Task::none();
            }

            let paint_started = Instant::now();
            if let Some(annotated) = detector.result_image() {
                self.detection_panel.update_image(annotated);
            }
            let paint_elapsed = paint_started.elapsed();

            self.detection_time
                .update_time(millis(detector.prediction_time().unwrap_or_default()), "ms");
            self.box_draw_time
                .update_time(millis(detector.box_draw_time().unwrap_or_default()), "ms");
            self.paint_time.update_time(millis(paint_elapsed), "ms");

            self.detections = detector
                .results()
                .iter()
                .map(|detection| {
                    (
                        detector.class_name(detection.class_index).to_string(),
                        detection.confidence,
                    )
                })
                .collect();
        }

        self.restart_detection()
    }

    /// Load a single image chosen from the file dialog. On failure the UI
    /// state is left unchanged; the timer restarts on every path.
    fn open_image(&mut self, path: PathBuf) -> Task<Message> {
        match load_image(&path) {
            Ok(image) => {
                self.folder = None;
                self.input_panel.update_image(&image);
                self.detection_panel.update_image(&image);
                self.image = Some(image);
                self.reset_timers();
                self.restart_detection()
            }
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "couldn't load image");
                Task::batch([
                    error_dialog(format!("Couldn't load image: {error:#}")),
                    self.restart_detection(),
                ])
            }
        }
    }

    /// Open a folder of indexed images, starting at `0.png`.
    fn open_folder(&mut self, dir: PathBuf) -> Task<Message> {
        let folder = ImageFolder::open(dir);
        match load_image(&folder.current_path()) {
            Ok(image) => {
                self.input_panel.update_image(&image);
                self.detection_panel.update_image(&image);
                self.image = Some(image);
                self.folder = Some(folder);
                self.reset_timers();
                self.restart_detection()
            }
            Err(error) => {
                tracing::error!(%error, dir = %folder.dir().display(), "couldn't load folder");
                Task::batch([
                    error_dialog(format!("Couldn't load image: {error:#}")),
                    self.restart_detection(),
                ])
            }
        }
    }

    fn show_previous(&mut self) -> Task<Message> {
        match self.folder.as_ref().and_then(ImageFolder::peek_prev) {
            Some(index) => self.load_folder_index(index),
            None => {
                bell();
                Task::none()
            }
        }
    }

    fn show_next(&mut self) -> Task<Message> {
        match self.folder.as_ref().and_then(ImageFolder::peek_next) {
            Some(index) => self.load_folder_index(index),
            None => {
                bell();
                Task::none()
            }
        }
    }

    /// Load the image at `index` in the open folder; the index is only
    /// committed once the image loaded.
    fn load_folder_index(&mut self, index: u32) -> Task<Message> {
        self.stop_detection();

        let path = match &self.folder {
            Some(folder) => folder.image_path(index),
            None => return self.restart_detection(),
        };

        match load_image(&path) {
            Ok(image) => {
                if let Some(folder) = self.folder.as_mut() {
                    folder.set_index(index);
                }
                self.input_panel.update_image(&image);
                self.image = Some(image);
                self.restart_detection()
            }
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "couldn't load image");
                Task::batch([
                    error_dialog(format!("Couldn't load image: {error:#}")),
                    self.restart_detection(),
                ])
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let open_row = row![
            button("Open image…").on_press(Message::OpenImage),
            button("Open folder…").on_press(Message::OpenFolder),
        ]
        .spacing(5);

        let model_row = row![
            text("YOLO model"),
            pick_list(
                ModelVariant::ALL,
                Some(self.current_model),
                Message::ModelSelected,
            ),
            text("Device"),
            pick_list(
                self.devices.as_slice(),
                Some(self.current_device),
                Message::DeviceSelected,
            ),
        ]
        .spacing(5)
        .align_y(Alignment::Center);

        let perf = column![
            text(self.detection_time.text()).size(14),
            text(self.box_draw_time.text()).size(14),
            text(self.paint_time.text()).size(14),
        ]
        .spacing(2);

        let toggles = column![
            checkbox(self.filter_confidences)
                .label("Suppress confidences under 50%")
                .on_toggle(Message::FilterToggled),
            checkbox(self.label_previews)
                .label("Label preview images")
                .on_toggle(Message::LabelToggled),
        ]
        .spacing(5);

        let nav_row = row![
            button("Previous").on_press_maybe(self.folder.as_ref().map(|_| Message::PrevClicked)),
            button("Next").on_press_maybe(self.folder.as_ref().map(|_| Message::NextClicked)),
            text(match &self.folder {
                Some(folder) => format!("Current image: {}", folder.index()),
                None => String::new(),
            }),
        ]
        .spacing(5)
        .align_y(Alignment::Center);

        let mut list = column![
            row![
                text("Class").width(Length::Fill),
                text("Confidence").width(Length::Fill),
            ]
        ]
        .spacing(2);
        for (class_name, confidence) in &self.detections {
            list = list.push(row![
                text(class_name.as_str()).width(Length::Fill),
                text(format!("{:.2}%", confidence * 100.0)).width(Length::Fill),
            ]);
        }

        let config = column![
            open_row,
            model_row,
            perf,
            toggles,
            nav_row,
            scrollable(list).height(Length::Fill),
        ]
        .spacing(10)
        .width(Length::FillPortion(1));

        let content = row![
            container(self.input_panel.view())
                .width(Length::FillPortion(2))
                .height(Length::Fill),
            container(self.detection_panel.view())
                .width(Length::FillPortion(2))
                .height(Length::Fill),
            config,
        ]
        .spacing(10);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(10)
            .into()
    }
}

fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(image.into_rgb8())
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Modal error dialog; the timer task it is batched with keeps the app
/// ticking once the dialog is dismissed.
fn error_dialog(description: String) -> Task<Message> {
    Task::perform(
        AsyncMessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title("Error")
            .set_description(description)
            .show(),
        |_| Message::Noop,
    )
}

/// Audible out-of-range alert.
fn bell() {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}
