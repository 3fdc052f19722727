/// Filter controls across the top of the gallery
use chrono::Datelike;
use iced::widget::{button, pick_list, row, slider, text, text_input, Row};
use iced::{Alignment, Element, Length, Theme};
use iced_aw::date_picker::Date;
use iced_aw::helpers::date_picker;
use iced_aw::Wrap;
use std::fmt;

use crate::app::Message;
use crate::state::filter::{FilterState, SizeClass, SortOrder, ThumbSize};

/// Entry of the checkpoint picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointChoice {
    All,
    Named(String),
}

impl CheckpointChoice {
    pub fn into_filter(self) -> Option<String> {
        match self {
            CheckpointChoice::All => None,
            CheckpointChoice::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for CheckpointChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointChoice::All => f.write_str("All checkpoints"),
            CheckpointChoice::Named(name) => f.write_str(name),
        }
    }
}

/// Picker options: "all" first, then the names from the backend
pub fn checkpoint_choices(names: &[String]) -> Vec<CheckpointChoice> {
    std::iter::once(CheckpointChoice::All)
        .chain(names.iter().cloned().map(CheckpointChoice::Named))
        .collect()
}

/// Segmented control: the selected option is highlighted and inert
fn segmented<'a, T: Copy + PartialEq>(
    options: &[T],
    selected: T,
    label: impl Fn(T) -> &'static str,
    on_select: impl Fn(T) -> Message,
) -> Row<'a, Message> {
    options.iter().fold(row![].spacing(2), |segments, &option| {
        let chosen = option == selected;
        let style: fn(&Theme, button::Status) -> button::Style = if chosen {
            button::primary
        } else {
            button::secondary
        };
        segments.push(
            button(text(label(option)))
                .style(style)
                .on_press_maybe((!chosen).then(|| on_select(option))),
        )
    })
}

pub fn view<'a>(
    filter: &FilterState,
    search_draft: &'a str,
    checkpoints: &'a [String],
    show_date_picker: bool,
) -> Element<'a, Message> {
    let order = segmented(
        &[SortOrder::Desc, SortOrder::Asc],
        filter.order(),
        |order| order.label(),
        Message::OrderSelected,
    );

    let thumb = slider(
        ThumbSize::MIN..=ThumbSize::MAX,
        filter.thumb_size().get(),
        Message::ThumbSizeChanged,
    )
    .step(1u8)
    .width(Length::Fixed(120.0));

    let search = text_input("Search keywords", search_draft)
        .on_input(Message::SearchChanged)
        .on_submit(Message::SearchSubmitted)
        .width(Length::Fixed(280.0));

    let selected = match filter.checkpoint() {
        Some(name) => CheckpointChoice::Named(name.to_string()),
        None => CheckpointChoice::All,
    };
    let checkpoint = pick_list(
        checkpoint_choices(checkpoints),
        Some(selected),
        Message::CheckpointSelected,
    );

    let date_label = match filter.date() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "Filter by date".to_string(),
    };
    let picked = match filter.date() {
        Some(date) => Date::from_ymd(date.year(), date.month(), date.day()),
        None => Date::today(),
    };
    let date = row![
        date_picker(
            show_date_picker,
            picked,
            button(text(date_label)).on_press(Message::ToggleDatePicker),
            Message::CancelDatePicker,
            Message::DateSubmitted,
        ),
        button(text("✕"))
            .style(button::text)
            .on_press_maybe(filter.date().is_some().then_some(Message::ClearDate)),
    ]
    .spacing(2)
    .align_y(Alignment::Center);

    let size = segmented(
        &SizeClass::ALL,
        filter.size(),
        |size| size.label(),
        Message::SizeSelected,
    );

    Wrap::with_elements(vec![
        order.into(),
        thumb.into(),
        search.into(),
        checkpoint.into(),
        date.into(),
        size.into(),
    ])
    .spacing(12.0)
    .line_spacing(8.0)
    .into()
}
