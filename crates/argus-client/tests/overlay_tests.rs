use argus_base::Tensor;
use argus_client::overlay::{self, BOX_COLOR, LABEL_BACKING};
use argus_client::RgbFrame;
use argus_detect::Detection;

fn black_frame(width: usize, height: usize) -> RgbFrame {
    RgbFrame::new(Tensor::zeros(vec![height, width, 3]).unwrap()).unwrap()
}

fn detection(class: &str, score: f32, bbox: [f32; 4]) -> Detection {
    Detection {
        class: class.to_string(),
        score,
        bbox,
    }
}

fn pixel(surface: &Tensor<u8>, x: usize, y: usize) -> [u8; 3] {
    let width = surface.shape[1];
    let idx = (y * width + x) * 3;
    [
        surface.data[idx],
        surface.data[idx + 1],
        surface.data[idx + 2],
    ]
}

#[test]
fn test_label_format_two_decimal_percentage() {
    let det = detection("person", 0.8725, [0.0, 0.0, 10.0, 10.0]);
    assert_eq!(overlay::label_for(&det), "person 87.25%");

    let det = detection("cat", 1.0, [0.0, 0.0, 10.0, 10.0]);
    assert_eq!(overlay::label_for(&det), "cat 100.00%");
}

#[test]
fn test_empty_set_draws_zero_boxes() {
    let frame = black_frame(50, 50);
    let surface = overlay::render(&frame, &[]);
    assert_eq!(surface, frame.pixels);
}

#[test]
fn test_box_and_label_drawn() {
    let frame = black_frame(50, 50);
    let det = detection("object", 0.5, [5.0, 5.0, 40.0, 40.0]);
    let surface = overlay::render(&frame, std::slice::from_ref(&det));

    // Border corners
    assert_eq!(pixel(&surface, 5, 5), BOX_COLOR);
    assert_eq!(pixel(&surface, 45, 5), BOX_COLOR);
    assert_eq!(pixel(&surface, 5, 45), BOX_COLOR);
    assert_eq!(pixel(&surface, 45, 45), BOX_COLOR);

    // Label backing sits just inside the top-left corner.
    assert_eq!(pixel(&surface, 8, 8), LABEL_BACKING);

    // Interior below the label stays untouched.
    assert_eq!(pixel(&surface, 25, 30), [0, 0, 0]);

    // The input frame itself is unchanged.
    assert!(frame.pixels.data.iter().all(|&v| v == 0));
}

#[test]
fn test_bbox_clamped_to_surface() {
    let frame = black_frame(40, 40);
    let det = detection("object", 0.9, [-10.0, -10.0, 30.0, 30.0]);
    let surface = overlay::render(&frame, std::slice::from_ref(&det));

    // Clamped top-left corner is painted, nothing panics.
    assert_eq!(pixel(&surface, 0, 0), BOX_COLOR);
}

#[test]
fn test_each_detection_gets_a_box() {
    let frame = black_frame(60, 60);
    let detections = vec![
        detection("a", 0.4, [2.0, 2.0, 10.0, 10.0]),
        detection("b", 0.6, [40.0, 40.0, 15.0, 15.0]),
    ];
    let surface = overlay::render(&frame, &detections);

    assert_eq!(pixel(&surface, 2, 2), BOX_COLOR);
    assert_eq!(pixel(&surface, 40, 40), BOX_COLOR);
}
