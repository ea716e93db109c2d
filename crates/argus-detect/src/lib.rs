//! Detection service for the argus pipeline.
//!
//! The model is an opaque capability behind the [`Model`] trait: given an
//! image tensor, return a list of detections. [`DetectorService`] wraps one
//! process-wide model instance with lazy, exactly-once construction and
//! shares it read-only across all connections.

pub mod backends;
pub mod detection;
pub mod error;
pub mod frametensor;
pub mod model;
pub mod service;

pub use backends::BlobModel;
#[cfg(feature = "onnx")]
pub use backends::OnnxModel;
pub use detection::{Detection, DetectionSet};
pub use error::DetectError;
pub use frametensor::FrameTensor;
pub use model::{Model, ModelLoader, ModelSource};
pub use service::DetectorService;
