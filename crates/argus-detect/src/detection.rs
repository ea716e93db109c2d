use serde::{Deserialize, Serialize};

/// One recognized object.
///
/// `bbox` is `[x, y, width, height]` in pixel coordinates of the frame the
/// detection was computed from. `score` lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: String,
    pub score: f32,
    pub bbox: [f32; 4],
}

/// All detections computed from one frame, in model output order.
pub type DetectionSet = Vec<Detection>;
