//! Overlay rendering: rectangles and text labels drawn over the live frame.
//!
//! Every redraw starts from a fresh copy of the current video frame, so
//! stale overlays never accumulate.

use argus_base::Tensor;
use argus_detect::Detection;

use crate::RgbFrame;

pub const BOX_COLOR: [u8; 3] = [235, 40, 40];
pub const LABEL_COLOR: [u8; 3] = [255, 255, 255];
pub const LABEL_BACKING: [u8; 3] = [20, 20, 20];

const BOX_THICKNESS: usize = 2;
const GLYPH_ADVANCE: i32 = 6;
const GLYPH_HEIGHT: i32 = 7;

/// Label text for one detection: class plus confidence as a percentage
/// with two decimal places.
pub fn label_for(detection: &Detection) -> String {
    format!("{} {:.2}%", detection.class, detection.score * 100.0)
}

/// Render the frame with every detection drawn as a rectangle and label.
///
/// Returns a fresh surface; the input frame is untouched.
pub fn render(frame: &RgbFrame, detections: &[Detection]) -> Tensor<u8> {
    let mut surface = frame.pixels.clone();
    for detection in detections {
        draw_detection(&mut surface, detection);
    }
    surface
}

fn draw_detection(surface: &mut Tensor<u8>, detection: &Detection) {
    let width = surface.shape[1] as i32;
    let height = surface.shape[0] as i32;
    if width == 0 || height == 0 {
        return;
    }

    let [x, y, w, h] = detection.bbox;
    let left = (x.round() as i32).clamp(0, width - 1);
    let top = (y.round() as i32).clamp(0, height - 1);
    let right = ((x + w).round() as i32).clamp(0, width - 1);
    let bottom = ((y + h).round() as i32).clamp(0, height - 1);

    stroke_rect(surface, left, top, right, bottom, BOX_COLOR);

    let label = label_for(detection);
    let label_w = label.chars().count() as i32 * GLYPH_ADVANCE;
    let label_x = (left + BOX_THICKNESS as i32).min(width - 1);
    let label_y = (top + BOX_THICKNESS as i32).min(height - 1);
    fill_rect(
        surface,
        label_x,
        label_y,
        label_x + label_w,
        label_y + GLYPH_HEIGHT + 1,
        LABEL_BACKING,
    );
    draw_text(surface, label_x + 1, label_y + 1, &label, LABEL_COLOR);
}

fn put_pixel(surface: &mut Tensor<u8>, x: i32, y: i32, color: [u8; 3]) {
    let width = surface.shape[1] as i32;
    let height = surface.shape[0] as i32;
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }
    let idx = (y as usize * width as usize + x as usize) * 3;
    surface.data[idx..idx + 3].copy_from_slice(&color);
}

fn fill_rect(surface: &mut Tensor<u8>, left: i32, top: i32, right: i32, bottom: i32, color: [u8; 3]) {
    for y in top..=bottom {
        for x in left..=right {
            put_pixel(surface, x, y, color);
        }
    }
}

fn stroke_rect(surface: &mut Tensor<u8>, left: i32, top: i32, right: i32, bottom: i32, color: [u8; 3]) {
    for t in 0..BOX_THICKNESS as i32 {
        for x in left..=right {
            put_pixel(surface, x, top + t, color);
            put_pixel(surface, x, bottom - t, color);
        }
        for y in top..=bottom {
            put_pixel(surface, left + t, y, color);
            put_pixel(surface, right - t, y, color);
        }
    }
}

fn draw_text(surface: &mut Tensor<u8>, mut x: i32, y: i32, text: &str, color: [u8; 3]) {
    for ch in text.chars().flat_map(|c| c.to_uppercase()) {
        if let Some(rows) = glyph(ch) {
            for (row, pattern) in rows.iter().enumerate() {
                for col in 0..5 {
                    if (pattern >> (4 - col)) & 1 == 1 {
                        put_pixel(surface, x + col, y + row as i32, color);
                    }
                }
            }
        }
        x += GLYPH_ADVANCE;
    }
}

/// 5x7 bitmap glyphs; rows are 5-bit patterns, MSB leftmost.
fn glyph(ch: char) -> Option<[u8; 7]> {
    match ch {
        'A' => Some([0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'B' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
        'C' => Some([0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
        'D' => Some([0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
        'E' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111]),
        'F' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000]),
        'G' => Some([0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => Some([0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'I' => Some([0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        'J' => Some([0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'K' => Some([0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
        'L' => Some([0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
        'M' => Some([0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
        'N' => Some([0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001]),
        'O' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'P' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'Q' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
        'R' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
        'S' => Some([0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
        'T' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'U' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'V' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'W' => Some([0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001]),
        'X' => Some([0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001]),
        'Y' => Some([0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'Z' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        '0' => Some([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => Some([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => Some([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => Some([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => Some([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        '%' => Some([0b10001, 0b10010, 0b00100, 0b01000, 0b10010, 0b10001, 0b00000]),
        '.' => Some([0, 0, 0, 0, 0, 0b00110, 0b00110]),
        ' ' => Some([0, 0, 0, 0, 0, 0, 0]),
        _ => None,
    }
}
