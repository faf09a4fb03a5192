use crate::{ImageTensor, VertexError, VertexResult};
use base64::Engine as _;
use image::{
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    DynamicImage, ExtendedColorType, ImageEncoder,
};

pub const PNG_MIME_TYPE: &str = "image/png";
pub const JPEG_MIME_TYPE: &str = "image/jpeg";
const JPEG_QUALITY: u8 = 90;

/// Encode the first frame of `image` for transport. RGBA frames become PNG,
/// everything else JPEG at quality 90. Returns the base64 payload and the
/// MIME type matching the encoding used.
pub fn encode_image(image: &ImageTensor) -> VertexResult<(String, &'static str)> {
    let values = image.frame_data(0).ok_or_else(|| {
        VertexError::InvalidInput("Cannot encode an image tensor with no frames".to_string())
    })?;
    let bytes = quantize(values);
    let width = dimension(image.width())?;
    let height = dimension(image.height())?;

    let mut buffer = Vec::new();
    let mime_type = match image.channels() {
        4 => {
            PngEncoder::new(&mut buffer)
                .write_image(&bytes, width, height, ExtendedColorType::Rgba8)
                .map_err(|e| VertexError::InvalidInput(format!("Failed to encode PNG: {e}")))?;
            PNG_MIME_TYPE
        }
        channels => {
            let color_type = if channels == 1 {
                ExtendedColorType::L8
            } else {
                ExtendedColorType::Rgb8
            };
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
                .write_image(&bytes, width, height, color_type)
                .map_err(|e| VertexError::InvalidInput(format!("Failed to encode JPEG: {e}")))?;
            JPEG_MIME_TYPE
        }
    };

    Ok((
        base64::engine::general_purpose::STANDARD.encode(buffer),
        mime_type,
    ))
}

/// Decode a base64 PNG/JPEG payload into a single-frame tensor. Images with
/// an alpha channel decode to RGBA, all others to RGB.
pub fn decode_image(b64: &str) -> VertexResult<ImageTensor> {
    let image = load_base64(b64)?;
    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        to_tensor(rgba.width(), rgba.height(), 4, rgba.as_raw())
    } else {
        let rgb = image.to_rgb8();
        to_tensor(rgb.width(), rgb.height(), 3, rgb.as_raw())
    }
}

/// Decode a base64 payload into an RGB frame, dropping any alpha channel.
pub fn decode_image_rgb(b64: &str) -> VertexResult<ImageTensor> {
    let rgb = load_base64(b64)?.to_rgb8();
    to_tensor(rgb.width(), rgb.height(), 3, rgb.as_raw())
}

fn load_base64(b64: &str) -> VertexResult<DynamicImage> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| VertexError::ImageDecode(format!("Failed to decode base64: {e}")))?;
    image::load_from_memory(&bytes)
        .map_err(|e| VertexError::ImageDecode(format!("Failed to decode image bytes: {e}")))
}

fn to_tensor(width: u32, height: u32, channels: usize, raw: &[u8]) -> VertexResult<ImageTensor> {
    let data = raw.iter().map(|&v| f32::from(v) / 255.0).collect();
    ImageTensor::new([1, height as usize, width as usize, channels], data)
}

/// Clamp to [0, 1] and scale to bytes.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(values: &[f32]) -> Vec<u8> {
    values
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect()
}

fn dimension(value: usize) -> VertexResult<u32> {
    u32::try_from(value)
        .map_err(|_| VertexError::InvalidInput(format!("Image dimension {value} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_clamps_out_of_range_values() {
        assert_eq!(quantize(&[-0.5, 0.0, 0.5, 1.0, 3.0]), vec![0, 0, 128, 255, 255]);
    }

    #[test]
    fn quantize_survives_byte_round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let floats: Vec<f32> = bytes.iter().map(|&v| f32::from(v) / 255.0).collect();
        assert_eq!(quantize(&floats), bytes);
    }
}
