/// Video playback for the modal and the tile previews
///
/// `Player` is the seam the UI drives. `DecoderPlayer` implements it on top
/// of the FFmpeg worker: each loaded source gets its own playback session,
/// run as an iced subscription that forwards decoded frames as messages.
/// Video only; no audio track is played.

use iced::futures::SinkExt;
use iced::widget::image;
use iced::{stream, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::decoder::{AsyncDecoder, DecoderCommand, DecoderEvent, VideoError};
use crate::state::catalog::CatalogSource;

/// Session ids are process-wide so two players never share a subscription
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Playback control seam
pub trait Player: std::fmt::Debug {
    /// Point the player at a new source; it starts paused
    fn load(&mut self, source: CatalogSource);
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek back to the start without playing
    fn rewind(&mut self);
    /// Drop the current source and stop its decoder
    fn unload(&mut self);

    /// Latest decoded frame of the current source
    fn frame(&self) -> Option<&image::Handle> {
        None
    }

    fn subscription(&self) -> Subscription<PlaybackEvent> {
        Subscription::none()
    }

    fn on_event(&mut self, _event: PlaybackEvent) {}
}

/// Steers a running decoder from the UI
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    session: u64,
    commands: mpsc::UnboundedSender<DecoderCommand>,
}

impl PlaybackHandle {
    fn send(&self, command: DecoderCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!(session = self.session, ?command, "video decoder already stopped");
        }
    }
}

/// Messages produced by a playback subscription
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    Started(PlaybackHandle),
    Frame { session: u64, handle: image::Handle },
    EndOfStream { session: u64 },
    Error { session: u64, error: VideoError },
}

impl PlaybackEvent {
    pub fn session(&self) -> u64 {
        match self {
            PlaybackEvent::Started(handle) => handle.session,
            PlaybackEvent::Frame { session, .. }
            | PlaybackEvent::EndOfStream { session }
            | PlaybackEvent::Error { session, .. } => *session,
        }
    }
}

/// One loaded source
#[derive(Debug, Clone)]
struct Session {
    id: u64,
    location: String,
    looping: bool,
}

/// Decode `session` and forward its frames as messages
fn playback(session: Session) -> Subscription<PlaybackEvent> {
    Subscription::run_with_id(
        session.id,
        stream::channel(4, move |mut output| async move {
            let Session {
                id,
                location,
                looping,
            } = session;
            let mut decoder = AsyncDecoder::spawn(location, looping);

            let handle = PlaybackHandle {
                session: id,
                commands: decoder.commands(),
            };
            let _ = output.send(PlaybackEvent::Started(handle)).await;

            while let Some(event) = decoder.recv_event().await {
                let message = match event {
                    DecoderEvent::FrameReady(frame) => PlaybackEvent::Frame {
                        session: id,
                        handle: image::Handle::from_rgba(
                            frame.width,
                            frame.height,
                            frame.rgba.as_ref().clone(),
                        ),
                    },
                    DecoderEvent::EndOfStream => PlaybackEvent::EndOfStream { session: id },
                    DecoderEvent::Error(error) => PlaybackEvent::Error { session: id, error },
                };
                if output.send(message).await.is_err() {
                    break;
                }
            }

            std::future::pending::<()>().await;
        }),
    )
}

/// What the UI last asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    #[default]
    Paused,
    Playing,
}

/// FFmpeg-backed player
///
/// Commands issued before the decoder reports `Started` are folded into
/// the intent and applied once the handle arrives.
#[derive(Debug, Default)]
pub struct DecoderPlayer {
    looping: bool,
    session: Option<Session>,
    handle: Option<PlaybackHandle>,
    intent: Intent,
    frame: Option<image::Handle>,
    finished: bool,
}

impl DecoderPlayer {
    /// Plays the source once
    pub fn once() -> Self {
        Self::default()
    }

    /// Restarts from the first frame at the end; used for hover previews
    pub fn looping() -> Self {
        Self {
            looping: true,
            ..Self::default()
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// True after a non-looping source played to its end
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(|session| session.id)
    }

    fn send(&self, command: DecoderCommand) {
        if let Some(handle) = &self.handle {
            handle.send(command);
        }
    }
}

impl Player for DecoderPlayer {
    fn load(&mut self, source: CatalogSource) {
        let location = match source {
            CatalogSource::File(path) => path.to_string_lossy().into_owned(),
            CatalogSource::Url(url) => url,
        };
        let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, %location, looping = self.looping, "loading video");

        self.session = Some(Session {
            id,
            location,
            looping: self.looping,
        });
        self.handle = None;
        self.intent = Intent::Paused;
        self.frame = None;
        self.finished = false;
    }

    fn play(&mut self) {
        self.intent = Intent::Playing;
        self.finished = false;
        self.send(DecoderCommand::Play);
    }

    fn pause(&mut self) {
        self.intent = Intent::Paused;
        self.send(DecoderCommand::Pause);
    }

    fn rewind(&mut self) {
        self.intent = Intent::Paused;
        self.frame = None;
        self.send(DecoderCommand::Rewind);
    }

    fn unload(&mut self) {
        self.send(DecoderCommand::Stop);
        self.session = None;
        self.handle = None;
        self.intent = Intent::Paused;
        self.frame = None;
    }

    fn frame(&self) -> Option<&image::Handle> {
        self.frame.as_ref()
    }

    fn subscription(&self) -> Subscription<PlaybackEvent> {
        match &self.session {
            Some(session) => playback(session.clone()),
            None => Subscription::none(),
        }
    }

    fn on_event(&mut self, event: PlaybackEvent) {
        // Events from a replaced session are dropped
        if self.session_id() != Some(event.session()) {
            return;
        }

        match event {
            PlaybackEvent::Started(handle) => {
                if self.intent == Intent::Playing {
                    handle.send(DecoderCommand::Play);
                }
                self.handle = Some(handle);
            }
            PlaybackEvent::Frame { handle, .. } => self.frame = Some(handle),
            PlaybackEvent::EndOfStream { .. } => {
                self.intent = Intent::Paused;
                self.finished = true;
            }
            PlaybackEvent::Error { error, .. } => {
                tracing::error!(%error, "video playback failed");
                self.intent = Intent::Paused;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every call, for asserting what the UI asked of its player
    #[derive(Debug, Default, Clone)]
    pub struct RecordingPlayer {
        pub calls: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingPlayer {
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Player for RecordingPlayer {
        fn load(&mut self, source: CatalogSource) {
            self.calls.borrow_mut().push(format!("load {:?}", source));
        }
        fn play(&mut self) {
            self.calls.borrow_mut().push("play".into());
        }
        fn pause(&mut self) {
            self.calls.borrow_mut().push("pause".into());
        }
        fn rewind(&mut self) {
            self.calls.borrow_mut().push("rewind".into());
        }
        fn unload(&mut self) {
            self.calls.borrow_mut().push("unload".into());
        }
    }
}
