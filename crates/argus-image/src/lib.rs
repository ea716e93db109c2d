//! Image codec adapter for the argus pipeline.
//!
//! Wraps the `image` crate to decode compressed still images from memory and
//! repackage them into the detector's tensor layout, and to encode RGB frames
//! back to JPEG on the capture side.
//!
//! Detector tensors use HWC layout: `[height, width, 3]`.

pub mod error;
pub mod types;

pub use error::ImageError;
pub use types::{Channels, RawImage};

use argus_base::Tensor;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};

/// Decodes a compressed image from raw bytes.
///
/// The format is auto-detected. 8-bit RGB and RGBA buffers are passed
/// through unchanged; every other variant (grayscale, 16-bit, float) is
/// normalized to RGBA.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is malformed, truncated, or in
/// an unsupported format. Never panics on bad input.
pub fn decode(data: &[u8]) -> Result<RawImage, ImageError> {
    let img = image::load_from_memory(data)?;

    Ok(match img {
        DynamicImage::ImageRgb8(buf) => {
            let (width, height) = buf.dimensions();
            RawImage {
                width,
                height,
                channels: Channels::Rgb,
                pixels: buf.into_raw(),
            }
        }
        DynamicImage::ImageRgba8(buf) => {
            let (width, height) = buf.dimensions();
            RawImage {
                width,
                height,
                channels: Channels::Rgba,
                pixels: buf.into_raw(),
            }
        }
        other => {
            let rgba = other.to_rgba8();
            let (width, height) = rgba.dimensions();
            RawImage {
                width,
                height,
                channels: Channels::Rgba,
                pixels: rgba.into_raw(),
            }
        }
    })
}

/// Repackages a decoded image into the detector's input layout.
///
/// Extracts exactly the R, G, B channels of every pixel in raster order,
/// discarding alpha when present. The result has shape
/// `[height, width, 3]`.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the pixel buffer does not match the
/// declared dimensions, `ImageError::Tensor` if tensor construction fails.
pub fn detector_tensor(image: &RawImage) -> Result<Tensor<u8>, ImageError> {
    let pixel_count = image.pixel_count();
    let stride = image.channels.count();
    if image.pixels.len() != pixel_count * stride {
        return Err(ImageError::Decode(format!(
            "pixel buffer length {} does not match {}x{} with {} channels",
            image.pixels.len(),
            image.width,
            image.height,
            stride
        )));
    }

    let shape = vec![image.height as usize, image.width as usize, 3];
    let data = match image.channels {
        Channels::Rgb => image.pixels.clone(),
        Channels::Rgba => {
            let mut data = Vec::with_capacity(pixel_count * 3);
            for pixel in image.pixels.chunks_exact(4) {
                data.extend_from_slice(&pixel[..3]);
            }
            data
        }
    };

    Ok(Tensor::new(shape, data)?)
}

/// Encodes an RGB HWC tensor as JPEG at the given quality (1-100).
///
/// # Errors
///
/// Returns `ImageError::Encode` if the tensor is not `[h, w, 3]` or the
/// encoder fails.
pub fn encode_jpeg(frame: &Tensor<u8>, quality: u8) -> Result<Vec<u8>, ImageError> {
    if frame.shape.len() != 3 || frame.shape[2] != 3 {
        return Err(ImageError::Encode(format!(
            "expected [h, w, 3] RGB tensor, got shape {:?}",
            frame.shape
        )));
    }
    let height = frame.shape[0] as u32;
    let width = frame.shape[1] as u32;

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode(&frame.data, width, height, ExtendedColorType::Rgb8)
        .map_err(|err| ImageError::Encode(err.to_string()))?;

    Ok(buffer)
}
