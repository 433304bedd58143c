/// Comic reader: vertical multi-page view with auto-hiding header
use iced::widget::scrollable::AbsoluteOffset;
use iced::widget::{button, column, container, image, row, scrollable, stack, text, Space};
use iced::{time, Alignment, Element, Length, Subscription, Task};
use std::time::{Duration, Instant};

use crate::media::cache::ImageCache;
use crate::state::data::Artwork;
use crate::ui::backdrop;

/// Downward scroll past this offset hides the header
const HEADER_HIDE_OFFSET: f32 = 100.0;
/// Scroll past this offset shows the scroll-to-top button
const TO_TOP_OFFSET: f32 = 500.0;
const SCROLL_TO_TOP_DURATION: Duration = Duration::from_millis(300);
const FRAME: Duration = Duration::from_millis(16);

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("comic-scroll")
}

/// "1 Page" / "N Pages"
pub fn page_counter(pages: usize) -> String {
    format!("{} {}", pages, if pages == 1 { "Page" } else { "Pages" })
}

/// Smooth scroll back to the first page
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollAnimation {
    from: f32,
    started: Instant,
}

impl ScrollAnimation {
    /// Offset at `now` and whether the animation is finished
    fn offset_at(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f32() / SCROLL_TO_TOP_DURATION.as_secs_f32()).min(1.0);
        // ease-out cubic
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from * (1.0 - eased), t >= 1.0)
    }
}

/// One open reading session
#[derive(Debug, Clone)]
pub struct Session {
    item: Artwork,
    last_offset: f32,
    header_hidden: bool,
    to_top_visible: bool,
    animation: Option<ScrollAnimation>,
}

impl Session {
    fn new(item: Artwork) -> Self {
        Self {
            item,
            last_offset: 0.0,
            header_hidden: false,
            to_top_visible: false,
            animation: None,
        }
    }

    pub fn header_hidden(&self) -> bool {
        self.header_hidden
    }

    pub fn to_top_visible(&self) -> bool {
        self.to_top_visible
    }

    /// Update chrome visibility from a new scroll offset
    pub fn on_scroll(&mut self, offset: f32) {
        self.header_hidden = offset > self.last_offset && offset > HEADER_HIDE_OFFSET;
        self.to_top_visible = offset > TO_TOP_OFFSET;
        self.last_offset = offset;
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Close,
    Scrolled(AbsoluteOffset),
    ScrollToTop,
    Tick(Instant),
}

#[derive(Debug, Default)]
pub struct ComicReader {
    session: Option<Session>,
}

impl ComicReader {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn open(&mut self, item: Artwork) -> Task<Message> {
        tracing::debug!(title = %item.title, pages = item.images.len(), "opening comic reader");
        self.session = Some(Session::new(item));
        scrollable::scroll_to(scroll_id(), AbsoluteOffset::default())
    }

    /// Dropping the session also drops its scroll callback and animation ticks
    pub fn close(&mut self) {
        self.session = None;
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let Some(session) = self.session.as_mut() else {
            return Task::none();
        };

        match message {
            Message::Close => {
                self.close();
                Task::none()
            }
            Message::Scrolled(offset) => {
                session.on_scroll(offset.y);
                Task::none()
            }
            Message::ScrollToTop => {
                session.animation = Some(ScrollAnimation {
                    from: session.last_offset,
                    started: Instant::now(),
                });
                Task::none()
            }
            Message::Tick(now) => {
                let Some(animation) = session.animation else {
                    return Task::none();
                };
                let (y, finished) = animation.offset_at(now);
                if finished {
                    session.animation = None;
                }
                scrollable::scroll_to(scroll_id(), AbsoluteOffset { x: 0.0, y })
            }
        }
    }

    /// Frame ticks, only while a scroll-to-top animation runs
    pub fn subscription(&self) -> Subscription<Message> {
        match &self.session {
            Some(Session {
                animation: Some(_), ..
            }) => time::every(FRAME).map(Message::Tick),
            _ => Subscription::none(),
        }
    }

    pub fn view<'a>(&'a self, images: &'a ImageCache) -> Element<'a, Message> {
        let Some(session) = &self.session else {
            return Space::new(0, 0).into();
        };
        let item = &session.item;

        let pages = item
            .images
            .iter()
            .fold(column![].spacing(0).align_x(Alignment::Center), |pages, page| {
                let page: Element<'a, Message> = match images.ready(&page.url) {
                    Some(loaded) => image(loaded.handle.clone())
                        .width(Length::Fill)
                        .into(),
                    None => container(text(page.label.as_str()).size(13))
                        .width(Length::Fill)
                        .height(400)
                        .center_x(Length::Fill)
                        .center_y(Length::Fill)
                        .into(),
                };
                pages.push(page)
            });

        let reader = scrollable(container(pages).max_width(900).center_x(Length::Fill))
            .id(scroll_id())
            .on_scroll(|viewport| Message::Scrolled(viewport.absolute_offset()))
            .height(Length::Fill);

        let mut body = column![].spacing(12).height(Length::Fill);
        if !session.header_hidden {
            body = body.push(
                row![
                    text(item.title.as_str()).size(22),
                    text(page_counter(item.images.len())).size(14),
                    Space::with_width(Length::Fill),
                    button(text("✕ Close")).on_press(Message::Close).style(button::secondary),
                ]
                .spacing(16)
                .align_y(Alignment::Center),
            );
        }
        body = body.push(reader);

        let to_top: Element<'a, Message> = if session.to_top_visible {
            container(button(text("↑ Top")).on_press(Message::ScrollToTop))
                .width(Length::Fill)
                .height(Length::Fill)
                .align_right(Length::Fill)
                .align_bottom(Length::Fill)
                .padding(24)
                .into()
        } else {
            Space::new(0, 0).into()
        };

        backdrop(stack![body, to_top])
    }
}
