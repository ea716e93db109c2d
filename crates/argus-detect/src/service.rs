use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{DetectError, DetectionSet, FrameTensor, Model, ModelLoader};

/// Shared handle to the process-wide detection model.
///
/// Built once in `main` and passed to every connection handler. The model is
/// constructed lazily on first use: concurrent first callers wait on the same
/// in-flight load, and a failed load is retried on the next call rather than
/// poisoning the service. Once loaded, the model is immutable and shared
/// read-only.
pub struct DetectorService {
    loader: ModelLoader,
    model: OnceCell<Arc<dyn Model>>,
}

impl DetectorService {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Build a service around an already-constructed model.
    pub fn with_model(model: Arc<dyn Model>) -> Self {
        Self::new(Arc::new(move || Ok(model.clone())))
    }

    /// Ensure the model is constructed, returning the shared handle.
    ///
    /// Idempotent. The first call runs the loader on the blocking pool;
    /// concurrent callers during the load all wait for that one attempt.
    ///
    /// # Errors
    ///
    /// Returns `DetectError::ModelLoad` if construction fails. The failure
    /// is not sticky: a later call runs the loader again.
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn Model>, DetectError> {
        let model = self
            .model
            .get_or_try_init(|| {
                let loader = self.loader.clone();
                async move {
                    log::info!("loading detection model");
                    let model = tokio::task::spawn_blocking(move || loader())
                        .await
                        .map_err(|e| {
                            DetectError::ModelLoad(format!("model load task failed: {e}"))
                        })??;
                    log::info!("detection model ready: {}", model.name());
                    Ok::<_, DetectError>(model)
                }
            })
            .await?;
        Ok(model.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Run one inference call against the shared model.
    ///
    /// Consumes the tensor on every exit path; it is released exactly once
    /// whether inference succeeds or fails. Safe to call concurrently from
    /// many connection handlers.
    ///
    /// # Errors
    ///
    /// `DetectError::ModelLoad` if the model cannot be constructed,
    /// `DetectError::Inference` on model failure.
    pub async fn detect(&self, frame: FrameTensor) -> Result<DetectionSet, DetectError> {
        let model = self.ensure_loaded().await?;

        tokio::task::spawn_blocking(move || {
            let detections = model.infer(frame.view());
            drop(frame);
            detections
        })
        .await
        .map_err(|e| DetectError::Inference(format!("inference task failed: {e}")))?
    }
}
