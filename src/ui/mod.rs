/// User interface components
///
/// Each viewer owns its state machine, its messages and its view:
/// - gallery.rs: filters and the tile grid
/// - lightbox.rs: single artwork detail with navigation
/// - comic.rs: vertical comic reader
/// - video.rs: video modal
/// - contact.rs: contact form page

pub mod comic;
pub mod contact;
pub mod gallery;
pub mod lightbox;
pub mod video;

use iced::widget::{container, row, text};
use iced::{Background, Color, Element, Length, Task};
use std::time::Duration;

/// Emit `message` once `delay` has elapsed
pub fn after<T>(delay: Duration, message: T) -> Task<T>
where
    T: Clone + Send + 'static,
{
    Task::perform(
        async move {
            tokio::time::sleep(delay).await;
        },
        move |()| message.clone(),
    )
}

/// Full-window dimmed layer that hosts an overlay
pub fn backdrop<'a, Message: 'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(32)
        .center_x(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.92))),
            ..container::Style::default()
        })
        .into()
}

/// Software tags as small pills
pub fn software_pills<'a, Message: 'a>(software: &'a [String]) -> Element<'a, Message> {
    software
        .iter()
        .fold(row![].spacing(6), |pills, name| {
            pills.push(
                container(text(name.as_str()).size(12))
                    .padding([3, 10])
                    .style(container::rounded_box),
            )
        })
        .into()
}
