//! Capture client for the argus pipeline.
//!
//! Owns the camera stream, captures and encodes frames on a fixed cadence,
//! transmits them when the connection admits sends, caches the most recent
//! detection set, and redraws overlays on an independent cadence.

pub mod cache;
pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod overlay;
pub mod session;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use cache::DetectionCache;
pub use camera::{Camera, RgbFrame, TestPatternCamera};
pub use config::{CameraConfig, SessionConfig};
pub use display::{BufferSink, DisplaySink, NullSink};
pub use error::CameraError;
pub use session::StreamSession;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
