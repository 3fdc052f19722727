/// Page selector shown under the grid
use iced::widget::{button, row, text};
use iced::{Alignment, Element};

use crate::app::Message;

/// Pages kept visible on each side of the current one
const SIBLINGS: u32 = 1;

/// Pages always visible at each end
const BOUNDARIES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Gap,
}

/// Visible page buttons for `current` out of `total`, eliding long runs
pub fn page_items(current: u32, total: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }

    let current = current.clamp(1, total);
    let visible = SIBLINGS * 2 + 3 + BOUNDARIES * 2;
    if total <= visible {
        return (1..=total).map(PageItem::Page).collect();
    }

    let left = current.saturating_sub(SIBLINGS).max(BOUNDARIES);
    let right = (current + SIBLINGS).min(total - BOUNDARIES + 1);
    let show_left_gap = left > BOUNDARIES + 2;
    let show_right_gap = right < total - (BOUNDARIES + 1);
    let edge_run = SIBLINGS * 2 + BOUNDARIES + 2;

    let mut items = Vec::with_capacity(visible as usize);
    match (show_left_gap, show_right_gap) {
        (false, true) => {
            items.extend((1..=edge_run).map(PageItem::Page));
            items.push(PageItem::Gap);
            items.extend((total - BOUNDARIES + 1..=total).map(PageItem::Page));
        }
        (true, false) => {
            items.extend((1..=BOUNDARIES).map(PageItem::Page));
            items.push(PageItem::Gap);
            items.extend((total - edge_run + 1..=total).map(PageItem::Page));
        }
        _ => {
            items.extend((1..=BOUNDARIES).map(PageItem::Page));
            items.push(PageItem::Gap);
            items.extend((left..=right).map(PageItem::Page));
            items.push(PageItem::Gap);
            items.extend((total - BOUNDARIES + 1..=total).map(PageItem::Page));
        }
    }
    items
}

/// Prev / page buttons / next
pub fn view<'a>(current: u32, total: u32) -> Element<'a, Message> {
    let prev = button(text("‹"))
        .on_press_maybe((current > 1).then(|| Message::PageSelected(current - 1)));
    let next = button(text("›"))
        .on_press_maybe((current < total).then(|| Message::PageSelected(current + 1)));

    let mut controls = row![prev].spacing(6).align_y(Alignment::Center);
    for item in page_items(current, total) {
        let control: Element<'a, Message> = match item {
            PageItem::Page(page) if page == current => {
                button(text(page.to_string())).style(button::primary).into()
            }
            PageItem::Page(page) => button(text(page.to_string()))
                .style(button::secondary)
                .on_press(Message::PageSelected(page))
                .into(),
            PageItem::Gap => text("…").into(),
        };
        controls = controls.push(control);
    }
    controls.push(next).into()
}
