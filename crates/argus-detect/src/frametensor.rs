use std::fmt;

use argus_base::Tensor;

use crate::DetectError;

/// Detector-ready input tensor for a single inference call.
///
/// Constructed fresh per frame and consumed by `DetectorService::detect`;
/// it never survives past the call. An optional release hook fires exactly
/// once when the tensor is dropped, letting callers account for the buffer's
/// lifetime.
pub struct FrameTensor {
    tensor: Tensor<u8>,
    release_hook: Option<Box<dyn FnOnce() + Send>>,
}

impl FrameTensor {
    /// Wrap an RGB HWC tensor of shape `[height, width, 3]`.
    ///
    /// # Errors
    ///
    /// Returns `DetectError::Shape` for any other shape.
    pub fn new(tensor: Tensor<u8>) -> Result<Self, DetectError> {
        if tensor.shape.len() != 3 || tensor.shape[2] != 3 {
            return Err(DetectError::Shape(format!(
                "expected [h, w, 3] tensor, got shape {:?}",
                tensor.shape
            )));
        }
        Ok(Self {
            tensor,
            release_hook: None,
        })
    }

    /// Attach a hook invoked exactly once when this tensor is released.
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release_hook = Some(Box::new(hook));
        self
    }

    pub fn view(&self) -> &Tensor<u8> {
        &self.tensor
    }

    pub fn height(&self) -> usize {
        self.tensor.shape[0]
    }

    pub fn width(&self) -> usize {
        self.tensor.shape[1]
    }
}

impl fmt::Debug for FrameTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameTensor")
            .field("shape", &self.tensor.shape)
            .finish()
    }
}

impl Drop for FrameTensor {
    fn drop(&mut self) {
        if let Some(hook) = self.release_hook.take() {
            hook();
        }
    }
}
