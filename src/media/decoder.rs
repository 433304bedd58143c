/// FFmpeg video decoding on a blocking worker
///
/// The worker owns every FFmpeg object (they are not `Send`) and talks to
/// the UI side through two channels: commands in, decoded frames out.
/// Frames are paced against their presentation timestamps.

use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

use ffmpeg_next as ffmpeg;

/// Poll interval of a paused worker
const IDLE_POLL: Duration = Duration::from_millis(10);
/// Frames in flight between the worker and the UI
const EVENT_CAPACITY: usize = 2;

static FFMPEG_INIT: Once = Once::new();

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VideoError {
    #[error("FFmpeg initialization failed: {0}")]
    Init(String),

    #[error("Failed to open video {location}: {message}")]
    Open { location: String, message: String },

    #[error("No video stream in {0}")]
    NoVideoStream(String),

    #[error("Video decoding failed: {0}")]
    Decode(String),
}

/// Initialise FFmpeg once per process and keep its logging to errors
pub fn init_ffmpeg() -> Result<(), VideoError> {
    let mut result = Ok(());
    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg::init() {
            result = Err(VideoError::Init(e.to_string()));
            return;
        }
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
    });
    result
}

/// One decoded frame in tightly packed RGBA
#[derive(Clone)]
pub struct DecodedFrame {
    pub rgba: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub pts_secs: f64,
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts_secs", &self.pts_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderCommand {
    Play,
    Pause,
    /// Seek back to the first frame and stay paused
    Rewind,
    Stop,
}

#[derive(Debug, Clone)]
pub enum DecoderEvent {
    FrameReady(DecodedFrame),
    /// The last frame was shown; only sent by non-looping decoders
    EndOfStream,
    Error(VideoError),
}

/// Handle to a running decoder worker
///
/// Dropping the handle (or both of its channel ends) stops the worker.
pub struct AsyncDecoder {
    command_tx: mpsc::UnboundedSender<DecoderCommand>,
    event_rx: mpsc::Receiver<DecoderEvent>,
}

impl AsyncDecoder {
    /// Start a worker for `location` (a file path or a URL FFmpeg can open)
    ///
    /// The worker starts paused. A looping decoder restarts from the first
    /// frame at the end of the stream instead of reporting it.
    pub fn spawn(location: String, looping: bool) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);

        tokio::task::spawn_blocking(move || {
            if let Err(error) = decode_loop(&location, looping, command_rx, &event_tx) {
                tracing::error!(%error, %location, "video decoder stopped");
                let _ = event_tx.blocking_send(DecoderEvent::Error(error));
            }
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    /// A sender the UI can keep to steer the worker
    pub fn commands(&self) -> mpsc::UnboundedSender<DecoderCommand> {
        self.command_tx.clone()
    }

    /// Next event, or None once the worker has exited
    pub async fn recv_event(&mut self) -> Option<DecoderEvent> {
        self.event_rx.recv().await
    }
}

/// Frame pacing state of a playing worker
struct Clock {
    started: Instant,
    first_pts: Option<f64>,
}

impl Clock {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            first_pts: None,
        }
    }

    /// How long to wait before showing a frame with `pts_secs`
    fn delay_for(&mut self, pts_secs: f64) -> Duration {
        let first = *self.first_pts.get_or_insert(pts_secs);
        let due = self.started + Duration::from_secs_f64((pts_secs - first).max(0.0));
        due.saturating_duration_since(Instant::now())
    }
}

fn decode_loop(
    location: &str,
    looping: bool,
    mut command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
    event_tx: &mpsc::Sender<DecoderEvent>,
) -> Result<(), VideoError> {
    init_ffmpeg()?;

    let mut input = ffmpeg::format::input(location).map_err(|e| VideoError::Open {
        location: location.to_string(),
        message: e.to_string(),
    })?;

    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or_else(|| VideoError::NoVideoStream(location.to_string()))?;
    let stream_index = stream.index();
    let time_base = stream.time_base();
    let time_base = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

    let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| VideoError::Decode(e.to_string()))?;
    let mut decoder = context
        .decoder()
        .video()
        .map_err(|e| VideoError::Decode(e.to_string()))?;

    let (width, height) = (decoder.width(), decoder.height());
    let mut scaler = ffmpeg::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        ffmpeg::format::Pixel::RGBA,
        width,
        height,
        ffmpeg::software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| VideoError::Decode(e.to_string()))?;

    tracing::debug!(location, width, height, looping, "video decoder ready");

    let mut clock: Option<Clock> = None;

    loop {
        match command_rx.try_recv() {
            Ok(DecoderCommand::Play) => {
                if clock.is_none() {
                    clock = Some(Clock::start());
                }
            }
            Ok(DecoderCommand::Pause) => clock = None,
            Ok(DecoderCommand::Rewind) => {
                clock = None;
                rewind(&mut input, &mut decoder)?;
            }
            Ok(DecoderCommand::Stop) | Err(mpsc::error::TryRecvError::Disconnected) => break,
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        let Some(playing) = clock.as_mut() else {
            if event_tx.is_closed() {
                break;
            }
            std::thread::sleep(IDLE_POLL);
            continue;
        };

        match next_frame(&mut input, &mut decoder, &mut scaler, stream_index, time_base)? {
            Some(frame) => {
                std::thread::sleep(playing.delay_for(frame.pts_secs));
                if event_tx.blocking_send(DecoderEvent::FrameReady(frame)).is_err() {
                    break;
                }
            }
            None if looping => {
                rewind(&mut input, &mut decoder)?;
                clock = Some(Clock::start());
            }
            None => {
                clock = None;
                if event_tx.blocking_send(DecoderEvent::EndOfStream).is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn rewind(
    input: &mut ffmpeg::format::context::Input,
    decoder: &mut ffmpeg::decoder::Video,
) -> Result<(), VideoError> {
    input
        .seek(0, ..0)
        .map_err(|e| VideoError::Decode(format!("seek to start failed: {}", e)))?;
    decoder.flush();
    Ok(())
}

/// Decode packets until one frame comes out; None at the end of the stream
fn next_frame(
    input: &mut ffmpeg::format::context::Input,
    decoder: &mut ffmpeg::decoder::Video,
    scaler: &mut ffmpeg::software::scaling::Context,
    stream_index: usize,
    time_base: f64,
) -> Result<Option<DecodedFrame>, VideoError> {
    for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        if let Err(e) = decoder.send_packet(&packet) {
            tracing::warn!(error = %e, "skipping undecodable packet");
            continue;
        }

        let mut decoded = ffmpeg::frame::Video::empty();
        if decoder.receive_frame(&mut decoded).is_err() {
            continue;
        }

        let mut rgba = ffmpeg::frame::Video::empty();
        scaler
            .run(&decoded, &mut rgba)
            .map_err(|e| VideoError::Decode(format!("scaling failed: {}", e)))?;

        return Ok(Some(DecodedFrame {
            rgba: Arc::new(packed_rgba(&rgba)),
            width: rgba.width(),
            height: rgba.height(),
            pts_secs: decoded.timestamp().map_or(0.0, |pts| pts as f64 * time_base),
        }));
    }
    Ok(None)
}

/// Copy plane 0 row by row, dropping the stride padding
fn packed_rgba(frame: &ffmpeg::frame::Video) -> Vec<u8> {
    pack_rows(
        frame.data(0),
        frame.stride(0),
        frame.width() as usize * 4,
        frame.height() as usize,
    )
}

fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    let mut packed = Vec::with_capacity(row_bytes * rows);
    for row in 0..rows {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_bytes]);
    }
    packed
}
