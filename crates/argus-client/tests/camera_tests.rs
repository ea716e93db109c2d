use argus_base::Tensor;
use argus_client::{Camera, CameraError, RgbFrame, TestPatternCamera};

struct MockCamera {
    frames: usize,
}

impl Camera for MockCamera {
    async fn recv(&mut self) -> Result<RgbFrame, CameraError> {
        self.frames += 1;
        RgbFrame::new(Tensor::zeros(vec![2, 2, 3]).unwrap())
    }
}

#[tokio::test]
async fn test_camera_trait_mock_implementation() {
    let mut cam = MockCamera { frames: 0 };

    let frame = cam.recv().await.unwrap();
    assert_eq!(frame.pixels.shape, vec![2, 2, 3]);
    assert_eq!(cam.frames, 1);

    cam.recv().await.unwrap();
    assert_eq!(cam.frames, 2);
}

#[tokio::test]
async fn test_camera_trait_polymorphism() {
    async fn capture_frames(
        camera: &mut impl Camera,
        count: usize,
    ) -> Result<Vec<RgbFrame>, CameraError> {
        let mut frames = Vec::new();
        for _ in 0..count {
            frames.push(camera.recv().await?);
        }
        Ok(frames)
    }

    let mut cam = TestPatternCamera::new(32, 32);
    let frames = capture_frames(&mut cam, 3).await.unwrap();
    assert_eq!(frames.len(), 3);
}

#[tokio::test]
async fn test_test_pattern_shape_and_motion() {
    let mut cam = TestPatternCamera::new(64, 48);

    let first = cam.recv().await.unwrap();
    assert_eq!(first.pixels.shape, vec![48, 64, 3]);
    assert_eq!(first.width(), 64);
    assert_eq!(first.height(), 48);

    let second = cam.recv().await.unwrap();
    // The bright square drifts, so consecutive frames differ.
    assert_ne!(first.pixels.data, second.pixels.data);
}

#[test]
fn test_rgb_frame_rejects_bad_shape() {
    let result = RgbFrame::new(Tensor::zeros(vec![2, 2, 4]).unwrap());
    assert!(matches!(result, Err(CameraError::Stream(_))));
}
