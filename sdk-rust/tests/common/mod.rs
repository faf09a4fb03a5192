#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use vertex_sdk::{image_utils, ImageTensor};

/// A base64 PNG of a `width` x `height` RGBA image filled with `rgba`.
pub fn png_base64(width: usize, height: usize, rgba: [f32; 4]) -> String {
    let data = rgba.repeat(width * height);
    let tensor = ImageTensor::new([1, height, width, 4], data).unwrap();
    let (data, mime_type) = image_utils::encode_image(&tensor).unwrap();
    assert_eq!(mime_type, image_utils::PNG_MIME_TYPE);
    data
}

/// One response chunk whose first candidate holds `parts`.
pub fn chunk(parts: Value) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": parts},
            "index": 0
        }]
    })
}

pub fn inline_image_part(data: &str) -> Value {
    json!({"inlineData": {"mimeType": "image/png", "data": data}})
}

pub fn service_account_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("service_account.json")
}
