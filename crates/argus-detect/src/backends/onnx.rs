use std::sync::Mutex;

use argus_base::Tensor;
use ort::inputs;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor as OrtTensor;

use crate::backends::labels::coco_label;
use crate::{DetectError, Detection, DetectionSet, Model, ModelSource};

/// SSD-style ONNX detection model executed through `ort`.
///
/// Expects a model taking a `uint8` NHWC image tensor `[1, h, w, 3]` and
/// producing `detection_boxes` `[1, n, 4]` (normalized
/// `[ymin, xmin, ymax, xmax]`), `detection_scores` `[1, n]`, and
/// `detection_classes` `[1, n]` (COCO 90-range ids).
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    score_threshold: f32,
    max_detections: usize,
}

impl OnnxModel {
    /// Load the model and prepare an optimized session.
    ///
    /// # Errors
    ///
    /// Returns `DetectError::ModelLoad` if the model cannot be read or the
    /// session cannot be built.
    pub fn load(source: ModelSource) -> Result<Self, DetectError> {
        let builder = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(2))
            .map_err(|e| DetectError::ModelLoad(format!("failed to create session: {e}")))?;

        let session = match source {
            ModelSource::File(path) => builder.commit_from_file(&path).map_err(|e| {
                DetectError::ModelLoad(format!("failed to load {}: {e}", path.display()))
            })?,
            ModelSource::Memory(bytes) => builder.commit_from_memory(&bytes).map_err(|e| {
                DetectError::ModelLoad(format!("failed to load model from memory: {e}"))
            })?,
        };

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| DetectError::ModelLoad("model declares no inputs".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            score_threshold: 0.5,
            max_detections: 20,
        })
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_max_detections(mut self, max_detections: usize) -> Self {
        self.max_detections = max_detections;
        self
    }
}

fn extract_f32(
    outputs: &ort::session::SessionOutputs,
    name: &str,
) -> Result<Vec<f32>, DetectError> {
    let value = outputs
        .get(name)
        .ok_or_else(|| DetectError::Inference(format!("model output '{name}' missing")))?;
    let (_, data) = value
        .try_extract_tensor::<f32>()
        .map_err(|e| DetectError::Inference(format!("output '{name}' was not f32: {e}")))?;
    Ok(data.to_vec())
}

impl Model for OnnxModel {
    fn name(&self) -> &str {
        "onnx"
    }

    fn infer(&self, frame: &Tensor<u8>) -> Result<DetectionSet, DetectError> {
        if frame.shape.len() != 3 || frame.shape[2] != 3 {
            return Err(DetectError::Shape(format!(
                "expected [h, w, 3] tensor, got shape {:?}",
                frame.shape
            )));
        }
        let height = frame.shape[0];
        let width = frame.shape[1];

        let input = OrtTensor::from_array(([1, height, width, 3], frame.data.clone()))
            .map_err(|e| DetectError::Inference(format!("failed to build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(inputs![self.input_name.as_str() => input])
            .map_err(|e| DetectError::Inference(format!("model run failed: {e}")))?;

        let boxes = extract_f32(&outputs, "detection_boxes")?;
        let scores = extract_f32(&outputs, "detection_scores")?;
        let classes = extract_f32(&outputs, "detection_classes")?;

        let count = scores.len().min(boxes.len() / 4).min(classes.len());
        let mut detections = Vec::new();
        for i in 0..count {
            let score = scores[i];
            if score < self.score_threshold {
                continue;
            }
            let ymin = boxes[i * 4].clamp(0.0, 1.0);
            let xmin = boxes[i * 4 + 1].clamp(0.0, 1.0);
            let ymax = boxes[i * 4 + 2].clamp(0.0, 1.0);
            let xmax = boxes[i * 4 + 3].clamp(0.0, 1.0);

            detections.push(Detection {
                class: coco_label(classes[i] as usize).to_string(),
                score,
                bbox: [
                    xmin * width as f32,
                    ymin * height as f32,
                    (xmax - xmin) * width as f32,
                    (ymax - ymin) * height as f32,
                ],
            });
            if detections.len() >= self.max_detections {
                break;
            }
        }

        Ok(detections)
    }
}
