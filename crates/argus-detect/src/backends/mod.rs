pub mod blob;

#[cfg(feature = "onnx")]
pub mod labels;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use blob::BlobModel;

#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
