use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use argus_base::Tensor;
use argus_detect::{
    DetectError, Detection, DetectionSet, DetectorService, FrameTensor, Model,
};

struct FakeModel {
    fail: bool,
}

impl FakeModel {
    fn new(fail: bool) -> Self {
        Self { fail }
    }
}

impl Model for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    fn infer(&self, frame: &Tensor<u8>) -> Result<DetectionSet, DetectError> {
        if self.fail {
            return Err(DetectError::Inference("synthetic failure".to_string()));
        }
        // Echo the first sample so callers can tell results apart.
        Ok(vec![Detection {
            class: "echo".to_string(),
            score: frame.data.first().copied().unwrap_or(0) as f32 / 255.0,
            bbox: [0.0, 0.0, 1.0, 1.0],
        }])
    }
}

fn frame(fill: u8) -> FrameTensor {
    FrameTensor::new(Tensor::new(vec![2, 2, 3], vec![fill; 12]).unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_ensure_loaded_constructs_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let loader_loads = loads.clone();

    let service = Arc::new(DetectorService::new(Arc::new(move || {
        loader_loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        Ok(Arc::new(FakeModel::new(false)) as Arc<dyn Model>)
    })));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.ensure_loaded().await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(service.is_loaded());
}

#[tokio::test]
async fn test_failed_load_retries_instead_of_poisoning() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let loader_attempts = attempts.clone();

    let service = DetectorService::new(Arc::new(move || {
        if loader_attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DetectError::ModelLoad("transient failure".to_string()))
        } else {
            Ok(Arc::new(FakeModel::new(false)) as Arc<dyn Model>)
        }
    }));

    let first = service.ensure_loaded().await;
    assert!(matches!(first, Err(DetectError::ModelLoad(_))));
    assert!(!service.is_loaded());

    service.ensure_loaded().await.unwrap();
    assert!(service.is_loaded());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_detect_releases_tensor_on_success() {
    let service = DetectorService::with_model(Arc::new(FakeModel::new(false)));
    let releases = Arc::new(AtomicUsize::new(0));

    let hook_releases = releases.clone();
    let frame = frame(128).with_release_hook(move || {
        hook_releases.fetch_add(1, Ordering::SeqCst);
    });

    let detections = service.detect(frame).await.unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_detect_releases_tensor_on_inference_failure() {
    let service = DetectorService::with_model(Arc::new(FakeModel::new(true)));
    let releases = Arc::new(AtomicUsize::new(0));

    let hook_releases = releases.clone();
    let frame = frame(128).with_release_hook(move || {
        hook_releases.fetch_add(1, Ordering::SeqCst);
    });

    let result = service.detect(frame).await;
    assert!(matches!(result, Err(DetectError::Inference(_))));
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_detect_releases_tensor_on_load_failure() {
    let service = DetectorService::new(Arc::new(|| {
        Err(DetectError::ModelLoad("no weights".to_string()))
    }));
    let releases = Arc::new(AtomicUsize::new(0));

    let hook_releases = releases.clone();
    let frame = frame(128).with_release_hook(move || {
        hook_releases.fetch_add(1, Ordering::SeqCst);
    });

    let result = service.detect(frame).await;
    assert!(matches!(result, Err(DetectError::ModelLoad(_))));
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_detect_keeps_results_separate() {
    let service = Arc::new(DetectorService::with_model(Arc::new(FakeModel::new(false))));

    let bright = service.clone();
    let dark = service.clone();
    let (bright_result, dark_result) = tokio::join!(
        tokio::spawn(async move { bright.detect(frame(255)).await }),
        tokio::spawn(async move { dark.detect(frame(51)).await }),
    );

    let bright_set = bright_result.unwrap().unwrap();
    let dark_set = dark_result.unwrap().unwrap();
    assert!((bright_set[0].score - 1.0).abs() < 1e-6);
    assert!((dark_set[0].score - 0.2).abs() < 1e-6);
}

#[test]
fn test_frame_tensor_rejects_bad_shape() {
    let tensor = Tensor::new(vec![4, 4], vec![0u8; 16]).unwrap();
    assert!(matches!(
        FrameTensor::new(tensor),
        Err(DetectError::Shape(_))
    ));
}

#[test]
fn test_detection_wire_shape() {
    let det = Detection {
        class: "person".to_string(),
        score: 0.875,
        bbox: [10.0, 20.0, 30.0, 40.0],
    };
    let json = serde_json::to_value(&det).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "class": "person",
            "score": 0.875,
            "bbox": [10.0, 20.0, 30.0, 40.0]
        })
    );
}
