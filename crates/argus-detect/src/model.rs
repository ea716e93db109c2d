use std::path::PathBuf;
use std::sync::Arc;

use argus_base::Tensor;

use crate::{DetectError, DetectionSet};

/// Where a model's weights come from.
pub enum ModelSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// An object-detection model.
///
/// Implementations are immutable after construction and shared read-only
/// across all connections, so `infer` must be safe to call concurrently.
///
/// The input is an RGB HWC tensor with shape `[height, width, 3]` and
/// samples in `[0, 255]`. Detections are returned in model output order.
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    fn infer(&self, frame: &Tensor<u8>) -> Result<DetectionSet, DetectError>;
}

/// Factory invoked at most once concurrently to construct the shared model.
///
/// A failed load is retryable: the next `ensure_loaded` call runs the
/// loader again.
pub type ModelLoader = Arc<dyn Fn() -> Result<Arc<dyn Model>, DetectError> + Send + Sync>;
