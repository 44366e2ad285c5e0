//! Upload validation, performed before any model service call.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::error::{PoetError, PoetResult};

pub const MAX_UPLOAD_MB: usize = 5;
pub const MAX_UPLOAD_BYTES: usize = MAX_UPLOAD_MB * 1024 * 1024;

const ACCEPTED: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Checks size and sniffed content type. The size check runs first so an
/// oversized file is rejected independent of image validity.
pub fn validate_upload(bytes: &[u8]) -> PoetResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(PoetError::invalid_input("no image data received"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(PoetError::invalid_input(format!(
            "image is {} bytes; the limit is {MAX_UPLOAD_MB}MB",
            bytes.len()
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|_| PoetError::invalid_input("unrecognized image data"))?;
    if !ACCEPTED.contains(&format) {
        return Err(PoetError::invalid_input(format!(
            "unsupported image type {format:?}; please upload JPEG, PNG, WEBP or GIF"
        )));
    }
    Ok(format)
}

/// Normalizes the upload to base64 JPEG for the model service, which keeps
/// the inline payload to a single MIME type regardless of what was uploaded.
pub fn to_jpeg_base64(bytes: &[u8]) -> PoetResult<String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| PoetError::decode(format!("could not decode uploaded image: {e}")))?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut Cursor::new(&mut jpeg), 85)
        .encode_image(&img)
        .map_err(|e| PoetError::decode(format!("could not transcode image: {e}")))?;

    Ok(general_purpose::STANDARD.encode(&jpeg))
}
