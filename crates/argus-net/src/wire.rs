use serde::{Deserialize, Serialize};

use argus_detect::Detection;

use crate::NetError;

/// One downstream message: the detection array computed from a frame, or a
/// structured error payload when decode or inference failed.
///
/// Serializes to either a bare JSON array of detection objects or
/// `{"error": "..."}` — the two shapes the wire protocol allows. Anything
/// else is rejected at the deserialization boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameReply {
    Detections(Vec<Detection>),
    Error(ErrorReply),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorReply {
    pub error: String,
}

impl FrameReply {
    pub fn error(message: impl Into<String>) -> Self {
        FrameReply::Error(ErrorReply {
            error: message.into(),
        })
    }

    pub fn to_json(&self) -> Result<String, NetError> {
        serde_json::to_string(self)
            .map_err(|e| NetError::Protocol(format!("failed to serialize reply: {e}")))
    }

    pub fn from_json(text: &str) -> Result<Self, NetError> {
        serde_json::from_str(text)
            .map_err(|e| NetError::Protocol(format!("unexpected reply shape: {e}")))
    }
}
