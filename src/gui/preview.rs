use iced::widget::image::Handle;
use iced::widget::{Image, column, container};
use iced::{ContentFit, Element, Length};
use image::RgbImage;

use crate::detection::annotate;

/// Scale-to-fit image panel with an optional caption overlay.
///
/// Stores a copy of the most recent image and a pre-composed display buffer;
/// the view letterboxes it into whatever space the layout grants the panel.
pub struct PreviewPanel {
    caption: &'static str,
    image: Option<RgbImage>,
    handle: Option<Handle>,
    labeled: bool,
}

impl PreviewPanel {
    pub fn new(caption: &'static str) -> Self {
        Self {
            caption,
            image: None,
            handle: None,
            labeled: true,
        }
    }

    /// Store a copy of `image` and rebuild the display buffer.
    pub fn update_image(&mut self, image: &RgbImage) {
        self.image = Some(image.clone());
        self.rebuild();
    }

    /// Toggle the caption overlay.
    pub fn set_labeled(&mut self, labeled: bool) {
        self.labeled = labeled;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let Some(image) = &self.image else {
            self.handle = None;
            return;
        };

        let mut rgba = image::DynamicImage::ImageRgb8(image.clone()).into_rgba8();
        if self.labeled {
            annotate::draw_caption(&mut rgba, self.caption);
        }
        let (width, height) = rgba.dimensions();
        self.handle = Some(Handle::from_rgba(width, height, rgba.into_raw()));
    }

    /// Letterboxed view of the stored image; empty until the first update.
    pub fn view<Message: 'static>(&self) -> Element<'_, Message> {
        match &self.handle {
            Some(handle) => Image::new(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(column![])
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
        }
    }
}
