/// Thumbnail grid
///
/// Each cell spans `thumb_size` of the 12 layout units in a row, so the
/// number of columns is `12 / thumb_size`. Pagination happens upstream;
/// the grid lays out whatever the current page returned.
use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, text, Space};
use iced::{ContentFit, Element, Length};
use std::collections::HashMap;
use std::ops::Range;

use crate::app::Message;
use crate::state::data::ImageInfo;
use crate::state::filter::ThumbSize;

/// Split `count` items into row ranges for the given thumbnail size
pub fn rows(count: usize, thumb_size: ThumbSize) -> Vec<Range<usize>> {
    let columns = thumb_size.columns();
    (0..count)
        .step_by(columns)
        .map(|start| start..(start + columns).min(count))
        .collect()
}

/// Build the grid for the current page
pub fn view<'a>(
    images: &'a [ImageInfo],
    thumb_size: ThumbSize,
    thumbnails: &'a HashMap<String, Handle>,
) -> Element<'a, Message> {
    let span = u16::from(thumb_size.get());
    let cell_height = Length::Fixed(f32::from(span) * 60.0);

    let grid = rows(images.len(), thumb_size).into_iter().fold(
        column![].spacing(8),
        |grid, range| {
            let filled = range.len();
            let mut line = row![].spacing(8);
            for index in range {
                let image_info = &images[index];
                let content: Element<'a, Message> = match thumbnails.get(&image_info.id) {
                    Some(handle) => image(handle.clone())
                        .content_fit(ContentFit::ScaleDown)
                        .width(Length::Fill)
                        .height(Length::Fill)
                        .into(),
                    None => container(text("…").size(24))
                        .center_x(Length::Fill)
                        .center_y(Length::Fill)
                        .into(),
                };
                line = line.push(
                    button(content)
                        .on_press(Message::OpenDetail(index))
                        .style(button::text)
                        .padding(0)
                        .width(Length::FillPortion(span))
                        .height(cell_height),
                );
            }
            // Keep cells the same width on a short last row
            let missing = thumb_size.columns() - filled;
            for _ in 0..missing {
                line = line.push(Space::new(Length::FillPortion(span), cell_height));
            }
            grid.push(line)
        },
    );

    grid.into()
}
