use argus_base::Tensor;
use argus_detect::{BlobModel, DetectError, Model};

/// Build an RGB HWC frame filled with `background`, then paint
/// `rects` (x, y, w, h) with `foreground`.
fn frame_with_rects(
    width: usize,
    height: usize,
    background: [u8; 3],
    foreground: [u8; 3],
    rects: &[(usize, usize, usize, usize)],
) -> Tensor<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for _ in 0..width * height {
        data.extend_from_slice(&background);
    }
    for &(x, y, w, h) in rects {
        for py in y..(y + h).min(height) {
            for px in x..(x + w).min(width) {
                let idx = (py * width + px) * 3;
                data[idx..idx + 3].copy_from_slice(&foreground);
            }
        }
    }
    Tensor::new(vec![height, width, 3], data).unwrap()
}

#[test]
fn test_all_black_frame_yields_empty_set() {
    let frame = frame_with_rects(100, 100, [0, 0, 0], [0, 0, 0], &[]);
    let detections = BlobModel::new().infer(&frame).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn test_uniform_white_frame_yields_empty_set() {
    let frame = frame_with_rects(64, 64, [255, 255, 255], [255, 255, 255], &[]);
    let detections = BlobModel::new().infer(&frame).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn test_bright_region_detected_with_bbox() {
    let frame = frame_with_rects(80, 60, [0, 0, 0], [255, 255, 255], &[(20, 10, 16, 12)]);
    let detections = BlobModel::new().infer(&frame).unwrap();

    assert_eq!(detections.len(), 1);
    let det = &detections[0];
    assert_eq!(det.class, "object");
    assert_eq!(det.bbox, [20.0, 10.0, 16.0, 12.0]);
    assert!(det.score > 0.0 && det.score <= 1.0);
}

#[test]
fn test_two_regions_reported_in_raster_order() {
    let frame = frame_with_rects(
        100,
        100,
        [0, 0, 0],
        [200, 200, 200],
        &[(60, 70, 10, 10), (5, 5, 10, 10)],
    );
    let detections = BlobModel::new().infer(&frame).unwrap();

    assert_eq!(detections.len(), 2);
    // Discovery is raster order, so the top-left region comes first.
    assert_eq!(detections[0].bbox[..2], [5.0, 5.0]);
    assert_eq!(detections[1].bbox[..2], [60.0, 70.0]);
}

#[test]
fn test_min_area_filters_specks() {
    let frame = frame_with_rects(100, 100, [0, 0, 0], [255, 255, 255], &[(50, 50, 2, 2)]);
    let detections = BlobModel::new().with_min_area(16).infer(&frame).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn test_rejects_non_rgb_shape() {
    let frame = Tensor::new(vec![10, 10], vec![0u8; 100]).unwrap();
    let result = BlobModel::new().infer(&frame);
    assert!(matches!(result, Err(DetectError::Shape(_))));
}

#[test]
fn test_empty_frame_dimensions() {
    let frame = Tensor::new(vec![0, 10, 3], Vec::new()).unwrap();
    let detections = BlobModel::new().infer(&frame).unwrap();
    assert!(detections.is_empty());
}
