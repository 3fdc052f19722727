/// Full-screen carousel over the images of the current page
///
/// Navigation only walks the already-loaded list; it never fetches
/// another page.
use chrono::Local;
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, image, row, scrollable, text, Column,
};
use iced::{Alignment, ContentFit, Element, Length};

use crate::app::Message;
use crate::state::data::ImageInfo;

/// Height of the scrollable panel listing extra parameters
const EXTRA_PANEL_HEIGHT: f32 = 250.0;

/// Which slide is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewer {
    index: usize,
    /// Id of the image at `index`
    id: String,
}

impl DetailViewer {
    /// Open at `index`, or `None` if it is outside the list
    pub fn open(index: usize, images: &[ImageInfo]) -> Option<Self> {
        images.get(index).map(|image| Self {
            index,
            id: image.id.clone(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Move one slide forward; stays on the last slide
    pub fn next(&mut self, images: &[ImageInfo]) -> bool {
        self.go_to(self.index + 1, images)
    }

    /// Move one slide back; stays on the first slide
    pub fn previous(&mut self, images: &[ImageInfo]) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.go_to(index, images),
            None => false,
        }
    }

    /// Find the open image in a replaced list. Returns `false` when it
    /// is no longer there and the viewer should close.
    pub fn follow(&mut self, images: &[ImageInfo]) -> bool {
        match images.iter().position(|image| image.id == self.id) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    fn go_to(&mut self, index: usize, images: &[ImageInfo]) -> bool {
        match images.get(index) {
            Some(image) => {
                self.index = index;
                self.id = image.id.clone();
                true
            }
            None => false,
        }
    }
}

/// Load state of the full-size image on the open slide
#[derive(Debug, Clone, Copy)]
pub enum Picture<'a> {
    Loading,
    Ready(&'a Handle),
    Failed,
}

/// Labelled fixed fields shown for every image
pub fn fixed_fields(image: &ImageInfo) -> Vec<(&'static str, String)> {
    vec![
        ("ID", image.id.clone()),
        ("Prompt", image.prompt.clone()),
        ("Negative Prompt", image.negative_prompt.clone()),
        ("Checkpoint", image.checkpoint.clone()),
        ("Creation Date", image.creation_time_in(&Local)),
    ]
}

pub fn view<'a>(
    viewer: &DetailViewer,
    images: &'a [ImageInfo],
    picture: Picture<'a>,
) -> Element<'a, Message> {
    let Some(image_info) = images.get(viewer.index) else {
        return text("").into();
    };

    let picture: Element<'a, Message> = match picture {
        Picture::Ready(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Picture::Loading => container(text("Loading image…"))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
        Picture::Failed => container(text("Failed to load image"))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
    };

    let fields = fixed_fields(image_info)
        .into_iter()
        .fold(Column::new().spacing(12), |col, (label, value)| {
            col.push(column![text(format!("{}:", label)).size(20), text(value)].spacing(2))
        });

    let extras = image_info
        .extra_fields()
        .into_iter()
        .fold(Column::new().spacing(8), |col, (key, value)| {
            col.push(column![text(format!("{}:", key)).size(16), text(value)].spacing(2))
        });

    let sidebar = column![fields, scrollable(extras).height(EXTRA_PANEL_HEIGHT)]
        .spacing(16)
        .width(Length::FillPortion(3));

    let nav = row![
        button(text("‹ Previous"))
            .on_press_maybe((viewer.index > 0).then_some(Message::PreviousSlide)),
        text(format!("{} / {}", viewer.index + 1, images.len())),
        button(text("Next ›"))
            .on_press_maybe((viewer.index + 1 < images.len()).then_some(Message::NextSlide)),
        horizontal_space(),
        button(text("Close")).on_press(Message::CloseDetail),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    column![
        nav,
        row![
            container(picture).width(Length::FillPortion(9)).height(Length::Fill),
            sidebar
        ]
        .spacing(16)
        .height(Length::Fill),
    ]
    .spacing(12)
    .padding(16)
    .into()
}
