use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::{Camera, CameraConfig, CameraError, RgbFrame};

type FrameResult = Result<RgbFrame, CameraError>;

/// V4L2 camera capturing MJPEG and decoding each frame to RGB.
///
/// A background thread owns the capture stream; frames arrive over a
/// bounded channel. Dropping the camera stops the thread and releases the
/// device.
pub struct V4l2Camera {
    config: CameraConfig,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl V4l2Camera {
    /// Open the device from `config` and negotiate MJPEG at the requested
    /// resolution and frame rate.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the device cannot be opened, does
    /// not accept MJPEG, or rejects the parameters.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device())?;

        let mut format = Format::new(config.width(), config.height(), FourCC::new(b"MJPG"));
        format = Capture::set_format(&device, &format)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(CameraError::Device(
                "MJPEG format not supported by device".to_string(),
            ));
        }

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        Capture::set_params(&device, &params)?;

        Ok(Self {
            config,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count() as usize;
        let (tx, rx) = mpsc::channel(buffer_count.max(1));

        let handle = thread::spawn(move || {
            if let Err(e) = capture_loop(device, tx, buffer_count) {
                log::error!("capture thread stopped: {e}");
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        Ok(())
    }
}

impl Camera for V4l2Camera {
    async fn recv(&mut self) -> Result<RgbFrame, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        receiver
            .recv()
            .await
            .ok_or_else(|| CameraError::Channel("channel closed".to_string()))?
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // Dropping the receiver signals the capture thread to stop.
        drop(self.receiver.take());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn capture_loop(
    device: Device,
    tx: mpsc::Sender<FrameResult>,
    buffer_count: usize,
) -> Result<(), CameraError> {
    let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count as u32)
        .map_err(|e| CameraError::Stream(e.to_string()))?;

    loop {
        let frame = match stream.next() {
            Ok((data, _meta)) => decode_mjpeg(data),
            Err(e) => {
                let _ = tx.blocking_send(Err(CameraError::Stream(e.to_string())));
                break;
            }
        };
        if tx.blocking_send(frame).is_err() {
            // Receiver dropped: the camera is being released.
            break;
        }
    }

    Ok(())
}

fn decode_mjpeg(data: &[u8]) -> FrameResult {
    let raw = argus_image::decode(data)?;
    let tensor = argus_image::detector_tensor(&raw)?;
    RgbFrame::new(tensor)
}
