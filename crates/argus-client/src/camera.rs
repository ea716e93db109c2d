use std::future::Future;
use std::time::SystemTime;

use argus_base::Tensor;

use crate::CameraError;

/// One captured frame: RGB pixels in HWC layout plus the capture instant.
#[derive(Debug, Clone)]
pub struct RgbFrame {
    pub pixels: Tensor<u8>,
    pub captured_at: SystemTime,
}

impl RgbFrame {
    /// Wrap an RGB tensor of shape `[height, width, 3]`, stamping the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Stream` for any other shape.
    pub fn new(pixels: Tensor<u8>) -> Result<Self, CameraError> {
        if pixels.shape.len() != 3 || pixels.shape[2] != 3 {
            return Err(CameraError::Stream(format!(
                "expected [h, w, 3] frame, got shape {:?}",
                pixels.shape
            )));
        }
        Ok(Self {
            pixels,
            captured_at: SystemTime::now(),
        })
    }

    pub fn height(&self) -> usize {
        self.pixels.shape[0]
    }

    pub fn width(&self) -> usize {
        self.pixels.shape[1]
    }
}

/// Async camera trait for frame capture.
///
/// The capture loop owns the camera exclusively; dropping the
/// implementation must release the underlying device.
pub trait Camera {
    /// Receive the next frame from the camera.
    fn recv(&mut self) -> impl Future<Output = Result<RgbFrame, CameraError>> + Send;
}

/// Synthetic camera producing a bright square drifting over a dark
/// background. Deterministic, needs no hardware; useful for demos and
/// integration tests.
pub struct TestPatternCamera {
    width: usize,
    height: usize,
    frame_index: u64,
}

impl TestPatternCamera {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
        }
    }

    fn render(&self) -> Tensor<u8> {
        let mut data = vec![8u8; self.width * self.height * 3];

        let square = (self.width.min(self.height) / 4).max(1);
        let step = self.frame_index as usize * 2;
        let x0 = step % self.width.saturating_sub(square).max(1);
        let y0 = (step / 3) % self.height.saturating_sub(square).max(1);

        for y in y0..(y0 + square).min(self.height) {
            for x in x0..(x0 + square).min(self.width) {
                let idx = (y * self.width + x) * 3;
                data[idx] = 240;
                data[idx + 1] = 240;
                data[idx + 2] = 240;
            }
        }

        Tensor {
            shape: vec![self.height, self.width, 3],
            data,
        }
    }
}

impl Camera for TestPatternCamera {
    async fn recv(&mut self) -> Result<RgbFrame, CameraError> {
        let frame = RgbFrame::new(self.render())?;
        self.frame_index = self.frame_index.wrapping_add(1);
        Ok(frame)
    }
}
