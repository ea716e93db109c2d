use std::time::Duration;

/// Configuration for camera capture devices.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    device: String,
    width: u32,
    height: u32,
    fps: u32,
    buffer_count: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            buffer_count: 4,
        }
    }
}

impl CameraConfig {
    /// Set the device path (e.g., "/dev/video0").
    pub fn with_device(mut self, device: String) -> Self {
        self.device = device;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }
}

/// Configuration for a streaming session.
///
/// Capture and redraw run on independent timers; the two cadences are
/// deliberately separate knobs.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    capture_interval: Duration,
    redraw_interval: Duration,
    jpeg_quality: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_millis(100),
            redraw_interval: Duration::from_millis(100),
            jpeg_quality: 75,
        }
    }
}

impl SessionConfig {
    /// Set the interval between frame captures.
    pub fn with_capture_interval(mut self, interval: Duration) -> Self {
        self.capture_interval = interval;
        self
    }

    /// Set the interval between overlay redraws.
    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    /// Set the JPEG quality (1-100) used when encoding outgoing frames.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn capture_interval(&self) -> Duration {
        self.capture_interval
    }

    pub fn redraw_interval(&self) -> Duration {
        self.redraw_interval
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}
