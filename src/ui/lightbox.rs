/// Lightbox: full-detail view of one artwork with sibling navigation
use iced::widget::scrollable::AbsoluteOffset;
use iced::widget::{
    button, column, container, image, mouse_area, opaque, row, scrollable, text, Space,
};
use iced::{Alignment, Color, Element, Length, Task};
use std::time::Duration;

use crate::media::cache::ImageCache;
use crate::state::data::{Artwork, ImageRef};
use crate::ui::{after, backdrop, software_pills};

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("lightbox-scroll")
}

/// Step `index` by `direction` over a list of `len` items, wrapping at both ends
pub fn wrap_index(index: usize, direction: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + direction).rem_euclid(len as isize) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open { index: usize, faded_out: bool },
}

#[derive(Debug, Clone)]
pub enum Message {
    Close,
    Previous,
    Next,
    /// The fade-out for the given navigation finished
    FadeIn(u64),
}

#[derive(Debug)]
pub struct Lightbox {
    state: State,
    /// Bumped on every navigation so a superseded fade is ignored
    generation: u64,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self {
            state: State::Closed,
            generation: 0,
        }
    }
}

impl Lightbox {
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            State::Open { index, .. } => Some(index),
            State::Closed => None,
        }
    }

    pub fn is_faded_out(&self) -> bool {
        matches!(self.state, State::Open { faded_out: true, .. })
    }

    /// Open at `index` of the view list and reset the detail scroll position
    pub fn open(&mut self, index: usize, len: usize) -> Task<Message> {
        if index >= len {
            tracing::warn!(index, len, "lightbox index out of range");
            return Task::none();
        }
        self.state = State::Open {
            index,
            faded_out: false,
        };
        scrollable::scroll_to(scroll_id(), AbsoluteOffset::default())
    }

    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    /// Step to a sibling. The index changes now; the content reappears after the fade.
    pub fn navigate(&mut self, direction: isize, len: usize, fade: Duration) -> Task<Message> {
        let State::Open { index, .. } = self.state else {
            return Task::none();
        };

        self.generation += 1;
        self.state = State::Open {
            index: wrap_index(index, direction, len),
            faded_out: true,
        };

        after(fade, Message::FadeIn(self.generation))
    }

    pub fn update(&mut self, message: Message, len: usize, fade: Duration) -> Task<Message> {
        match message {
            Message::Close => {
                self.close();
                Task::none()
            }
            Message::Previous => self.navigate(-1, len, fade),
            Message::Next => self.navigate(1, len, fade),
            Message::FadeIn(generation) => match self.state {
                State::Open { index, faded_out: true } if generation == self.generation => {
                    self.state = State::Open {
                        index,
                        faded_out: false,
                    };
                    scrollable::scroll_to(scroll_id(), AbsoluteOffset::default())
                }
                _ => Task::none(),
            },
        }
    }

    pub fn view<'a>(&self, items: &'a [Artwork], images: &'a ImageCache) -> Element<'a, Message> {
        let Some(item) = self.index().and_then(|index| items.get(index)) else {
            return Space::new(0, 0).into();
        };
        let alpha = if self.is_faded_out() { 0.0 } else { 1.0 };

        let header = row![
            text(item.title.as_str()).size(26).color(fade(alpha)),
            Space::with_width(Length::Fill),
            software_pills(&item.software),
            button(text("✕")).on_press(Message::Close).style(button::text),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let hero = picture(item.hero(), images, alpha, 640.0);

        let related = item
            .secondary_images()
            .iter()
            .fold(column![].spacing(16), |column, related| {
                column.push(
                    column![
                        picture(Some(related), images, alpha, 480.0),
                        text(related.label.as_str()).size(13).color(fade(alpha)),
                    ]
                    .spacing(6),
                )
            });

        let detail = column![
            header,
            hero,
            text(item.full_description()).size(15).color(fade(alpha)),
            related,
        ]
        .spacing(20)
        .max_width(960);

        let content = container(
            scrollable(container(detail).padding(24))
                .id(scroll_id())
                .height(Length::Fill),
        )
        .style(container::rounded_box)
        .max_width(1000);

        let navigation = row![
            column![
                button(text("✕ Close")).on_press(Message::Close).style(button::secondary),
                Space::with_height(Length::Fill),
                button(text("‹").size(32)).on_press(Message::Previous).style(button::text),
                Space::with_height(Length::Fill),
            ]
            .height(Length::Fill),
            opaque(content),
            column![
                Space::with_height(Length::Fill),
                button(text("›").size(32)).on_press(Message::Next).style(button::text),
                Space::with_height(Length::Fill),
            ]
            .height(Length::Fill),
        ]
        .spacing(16)
        .align_y(Alignment::Center);

        // Clicks on the content are captured by `opaque`; only the backdrop closes
        mouse_area(backdrop(navigation))
            .on_press(Message::Close)
            .into()
    }
}

fn fade(alpha: f32) -> Color {
    Color { a: alpha, ..Color::WHITE }
}

fn picture<'a>(
    source: Option<&ImageRef>,
    images: &'a ImageCache,
    alpha: f32,
    max_height: f32,
) -> Element<'a, Message> {
    match source.and_then(|source| images.ready(&source.url)) {
        Some(loaded) => image(loaded.handle.clone())
            .width(Length::Fill)
            .height(Length::Shrink)
            .opacity(alpha)
            .into(),
        None => container(text("Loading image...").size(13))
            .width(Length::Fill)
            .height(max_height.min(240.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE: Duration = Duration::from_millis(150);

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 5), 4);
        assert_eq!(wrap_index(4, 1, 5), 0);
        assert_eq!(wrap_index(2, 1, 5), 3);
        assert_eq!(wrap_index(0, 1, 1), 0);
        assert_eq!(wrap_index(3, 1, 0), 0);
    }

    #[test]
    fn test_open_and_close() {
        let mut lightbox = Lightbox::default();
        assert!(!lightbox.is_open());

        let _ = lightbox.open(2, 5);
        assert_eq!(lightbox.index(), Some(2));
        assert!(!lightbox.is_faded_out());

        let _ = lightbox.update(Message::Close, 5, FADE);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_open_out_of_range_stays_closed() {
        let mut lightbox = Lightbox::default();
        let _ = lightbox.open(5, 5);
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_navigation_wraps_and_fades() {
        let mut lightbox = Lightbox::default();
        let _ = lightbox.open(0, 5);

        let _ = lightbox.update(Message::Previous, 5, FADE);
        assert_eq!(lightbox.index(), Some(4));
        assert!(lightbox.is_faded_out());

        let _ = lightbox.update(Message::FadeIn(1), 5, FADE);
        assert!(!lightbox.is_faded_out());

        let _ = lightbox.update(Message::Next, 5, FADE);
        assert_eq!(lightbox.index(), Some(0));
    }

    #[test]
    fn test_superseded_fade_is_ignored() {
        let mut lightbox = Lightbox::default();
        let _ = lightbox.open(0, 5);

        let _ = lightbox.update(Message::Next, 5, FADE);
        let _ = lightbox.update(Message::Next, 5, FADE);
        assert_eq!(lightbox.index(), Some(2));

        // The first navigation's fade completes late
        let _ = lightbox.update(Message::FadeIn(1), 5, FADE);
        assert!(lightbox.is_faded_out());

        let _ = lightbox.update(Message::FadeIn(2), 5, FADE);
        assert!(!lightbox.is_faded_out());
    }

    #[test]
    fn test_navigation_while_closed_is_noop() {
        let mut lightbox = Lightbox::default();
        let _ = lightbox.update(Message::Next, 5, FADE);
        assert!(!lightbox.is_open());
    }
}
