/// Media module
///
/// This module handles:
/// - Fetching images from disk or HTTP and probing their size (loader.rs)
/// - Caching fetched images for the session (cache.rs)
/// - Classifying tile orientation from image dimensions (orientation.rs)
/// - Decoding video with FFmpeg (decoder.rs) and driving playback (playback.rs)

pub mod cache;
pub mod decoder;
pub mod loader;
pub mod orientation;
pub mod playback;
