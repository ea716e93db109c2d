use std::fmt;

#[derive(Debug)]
pub enum DetectError {
    ModelLoad(String),
    Inference(String),
    Shape(String),
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            DetectError::Inference(msg) => write!(f, "inference error: {msg}"),
            DetectError::Shape(msg) => write!(f, "shape error: {msg}"),
        }
    }
}

impl std::error::Error for DetectError {}

impl From<argus_base::TensorError> for DetectError {
    fn from(err: argus_base::TensorError) -> Self {
        DetectError::Shape(err.to_string())
    }
}
