/// Video modal for timelapse entries
///
/// The overlay is built the first time a video is opened and reused for
/// every later one. Frames come from a `Player`; the production player
/// decodes in-app with FFmpeg.

use iced::widget::{button, column, container, image, mouse_area, opaque, row, text, Space};
use iced::{Alignment, ContentFit, Element, Length, Subscription};

use crate::media::cache::ImageCache;
use crate::media::playback::{DecoderPlayer, PlaybackEvent, Player};
use crate::state::catalog::CatalogSource;
use crate::state::data::Artwork;
use crate::ui::{backdrop, software_pills};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The lazily built overlay
#[derive(Debug, Clone, Default)]
struct Overlay {
    visible: bool,
    item: Option<Artwork>,
    playback: Playback,
}

#[derive(Debug, Clone)]
pub enum Message {
    Close,
    Replay,
    Playback(PlaybackEvent),
}

#[derive(Debug)]
pub struct VideoModal {
    overlay: Option<Overlay>,
    player: Box<dyn Player>,
}

impl Default for VideoModal {
    fn default() -> Self {
        Self::new(Box::new(DecoderPlayer::once()))
    }
}

impl VideoModal {
    pub fn new(player: Box<dyn Player>) -> Self {
        Self {
            overlay: None,
            player,
        }
    }

    /// False when the overlay was never built or is hidden
    pub fn is_visible(&self) -> bool {
        self.overlay.as_ref().is_some_and(|overlay| overlay.visible)
    }

    pub fn is_constructed(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn playback(&self) -> Playback {
        self.overlay
            .as_ref()
            .map(|overlay| overlay.playback)
            .unwrap_or_default()
    }

    /// Load the item's video and start playing it
    pub fn open(&mut self, item: Artwork, source: CatalogSource) {
        let overlay = self.overlay.get_or_insert_with(|| {
            tracing::debug!("building video modal");
            Overlay::default()
        });

        self.player.load(source);
        overlay.item = Some(item);
        overlay.visible = true;
        overlay.playback = Playback::Playing;
        self.player.play();
    }

    pub fn close(&mut self) {
        let Some(overlay) = self.overlay.as_mut().filter(|overlay| overlay.visible) else {
            return;
        };
        self.player.pause();
        overlay.playback = Playback::Paused;
        overlay.visible = false;
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Close => self.close(),
            Message::Replay => {
                if let Some(overlay) = self.overlay.as_mut().filter(|overlay| overlay.visible) {
                    overlay.playback = Playback::Playing;
                    self.player.rewind();
                    self.player.play();
                }
            }
            Message::Playback(event) => {
                let ended = matches!(event, PlaybackEvent::EndOfStream { .. });
                self.player.on_event(event);
                if let Some(overlay) = self.overlay.as_mut().filter(|_| ended) {
                    overlay.playback = Playback::Stopped;
                }
            }
        }
    }

    /// Decoded frames of the loaded video
    pub fn subscription(&self) -> Subscription<Message> {
        self.player.subscription().map(Message::Playback)
    }

    pub fn view<'a>(&'a self, images: &'a ImageCache) -> Element<'a, Message> {
        let Some(item) = self
            .overlay
            .as_ref()
            .filter(|overlay| overlay.visible)
            .and_then(|overlay| overlay.item.as_ref())
        else {
            return Space::new(0, 0).into();
        };

        let poster = item.cover().and_then(|cover| images.ready(cover));
        let screen: Element<'a, Message> = match (self.player.frame(), poster) {
            (Some(frame), _) => image(frame.clone())
                .width(Length::Fill)
                .content_fit(ContentFit::Contain)
                .into(),
            (None, Some(loaded)) => image(loaded.handle.clone()).width(Length::Fill).into(),
            (None, None) => Space::with_height(240).into(),
        };

        let status = match self.playback() {
            Playback::Playing => "▶ Playing",
            Playback::Paused => "Paused",
            Playback::Stopped => "Finished",
        };

        let panel = container(
            column![
                row![
                    text(item.title.as_str()).size(24),
                    Space::with_width(Length::Fill),
                    button(text("✕")).on_press(Message::Close).style(button::text),
                ]
                .align_y(Alignment::Center),
                screen,
                row![
                    text(status).size(13),
                    Space::with_width(Length::Fill),
                    button(text("Play again")).on_press(Message::Replay),
                ]
                .align_y(Alignment::Center),
                text(item.full_description()).size(15),
                software_pills(&item.software),
            ]
            .spacing(16),
        )
        .padding(24)
        .max_width(900)
        .style(container::rounded_box);

        mouse_area(backdrop(opaque(panel)))
            .on_press(Message::Close)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::playback::recording::RecordingPlayer;
    use crate::state::data::{ArtworkKind, Category, ImageRef};

    fn timelapse() -> Artwork {
        Artwork {
            title: "Speedpaint".into(),
            description: "Timelapse".into(),
            full_description: None,
            category: Category::new("timelapse"),
            year: "2025".into(),
            date: None,
            main_image: Some("poster.jpg".into()),
            images: vec![ImageRef::new("poster.jpg", "Final")],
            software: vec!["Krita".into()],
            kind: ArtworkKind::Video {
                video_file: "speedpaint.mp4".into(),
            },
        }
    }

    fn modal() -> (VideoModal, RecordingPlayer) {
        let player = RecordingPlayer::default();
        (VideoModal::new(Box::new(player.clone())), player)
    }

    #[test]
    fn test_built_lazily_on_first_open() {
        let (mut modal, _) = modal();
        assert!(!modal.is_constructed());

        modal.open(timelapse(), CatalogSource::Url("https://example.com/v.mp4".into()));
        assert!(modal.is_constructed());
        assert!(modal.is_visible());
        assert_eq!(modal.playback(), Playback::Playing);
    }

    #[test]
    fn test_open_loads_then_plays_and_close_pauses() {
        let (mut modal, player) = modal();
        modal.open(timelapse(), CatalogSource::Url("v.mp4".into()));
        modal.update(Message::Close);

        assert!(!modal.is_visible());
        assert!(modal.is_constructed());
        assert_eq!(modal.playback(), Playback::Paused);

        let calls = player.calls();
        assert!(calls[0].starts_with("load"));
        assert_eq!(calls[1..], ["play".to_string(), "pause".to_string()]);
    }

    #[test]
    fn test_close_before_construction_is_noop() {
        let (mut modal, player) = modal();
        modal.close();
        assert!(!modal.is_constructed());
        assert!(player.calls().is_empty());
    }

    #[test]
    fn test_reopen_reuses_overlay() {
        let (mut modal, player) = modal();
        modal.open(timelapse(), CatalogSource::Url("a.mp4".into()));
        modal.close();
        modal.open(timelapse(), CatalogSource::Url("b.mp4".into()));

        assert!(modal.is_visible());
        let loads = player.calls().iter().filter(|call| call.starts_with("load")).count();
        assert_eq!(loads, 2);
    }

    #[test]
    fn test_replay_rewinds_before_playing() {
        let (mut modal, player) = modal();
        modal.open(timelapse(), CatalogSource::Url("a.mp4".into()));
        modal.update(Message::Replay);

        let calls = player.calls();
        assert_eq!(calls[calls.len() - 2..], ["rewind".to_string(), "play".to_string()]);
    }

    #[test]
    fn test_decoder_player_pauses_on_close() {
        let mut modal = VideoModal::default();
        modal.open(timelapse(), CatalogSource::Url("a.mp4".into()));
        modal.close();
        assert_eq!(modal.playback(), Playback::Paused);
        assert!(!modal.is_visible());
    }
}
