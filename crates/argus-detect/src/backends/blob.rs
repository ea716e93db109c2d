use argus_base::Tensor;

use crate::{DetectError, Detection, DetectionSet, Model};

/// Built-in detector that finds bright connected regions.
///
/// Needs no external weights: a pixel is foreground when its luminance
/// exceeds the frame mean by `contrast_threshold`, and each 4-connected
/// foreground region of at least `min_area` pixels becomes one detection.
/// Uniform frames (all black, all white) produce an empty set.
pub struct BlobModel {
    contrast_threshold: u16,
    min_area: usize,
}

impl BlobModel {
    pub fn new() -> Self {
        Self {
            contrast_threshold: 32,
            min_area: 16,
        }
    }

    /// Luminance delta above the frame mean required for foreground.
    pub fn with_contrast_threshold(mut self, threshold: u16) -> Self {
        self.contrast_threshold = threshold;
        self
    }

    /// Minimum region size in pixels.
    pub fn with_min_area(mut self, min_area: usize) -> Self {
        self.min_area = min_area;
        self
    }
}

impl Default for BlobModel {
    fn default() -> Self {
        Self::new()
    }
}

/// BT.601 integer luma approximation.
fn luma(r: u8, g: u8, b: u8) -> u16 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u16
}

struct Region {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    area: usize,
    luma_sum: u64,
}

impl Model for BlobModel {
    fn name(&self) -> &str {
        "blob"
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
        if height == 0 || width == 0 {
            return Ok(Vec::new());
        }

        let pixel_count = height * width;
        let mut lumas = Vec::with_capacity(pixel_count);
        let mut sum: u64 = 0;
        for pixel in frame.data.chunks_exact(3) {
            let value = luma(pixel[0], pixel[1], pixel[2]);
            sum += value as u64;
            lumas.push(value);
        }
        let mean = (sum / pixel_count as u64) as u16;
        let threshold = mean.saturating_add(self.contrast_threshold);

        let mut visited = vec![false; pixel_count];
        let mut stack = Vec::new();
        let mut detections = Vec::new();

        // Raster-order region discovery fixes the output order.
        for start in 0..pixel_count {
            if visited[start] || lumas[start] <= threshold {
                continue;
            }

            let mut region = Region {
                min_x: width,
                min_y: height,
                max_x: 0,
                max_y: 0,
                area: 0,
                luma_sum: 0,
            };

            visited[start] = true;
            stack.push(start);
            while let Some(idx) = stack.pop() {
                let x = idx % width;
                let y = idx / width;
                region.min_x = region.min_x.min(x);
                region.min_y = region.min_y.min(y);
                region.max_x = region.max_x.max(x);
                region.max_y = region.max_y.max(y);
                region.area += 1;
                region.luma_sum += lumas[idx] as u64;

                // 4-connected neighbors
                if x > 0 && !visited[idx - 1] && lumas[idx - 1] > threshold {
                    visited[idx - 1] = true;
                    stack.push(idx - 1);
                }
                if x + 1 < width && !visited[idx + 1] && lumas[idx + 1] > threshold {
                    visited[idx + 1] = true;
                    stack.push(idx + 1);
                }
                if y > 0 && !visited[idx - width] && lumas[idx - width] > threshold {
                    visited[idx - width] = true;
                    stack.push(idx - width);
                }
                if y + 1 < height && !visited[idx + width] && lumas[idx + width] > threshold {
                    visited[idx + width] = true;
                    stack.push(idx + width);
                }
            }

            if region.area < self.min_area {
                continue;
            }

            let region_mean = (region.luma_sum / region.area as u64) as f32;
            let score = ((region_mean - mean as f32) / 255.0).clamp(0.0, 1.0);
            detections.push(Detection {
                class: "object".to_string(),
                score,
                bbox: [
                    region.min_x as f32,
                    region.min_y as f32,
                    (region.max_x - region.min_x + 1) as f32,
                    (region.max_y - region.min_y + 1) as f32,
                ],
            });
        }

        Ok(detections)
    }
}
