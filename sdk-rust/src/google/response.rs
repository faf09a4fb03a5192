use super::api::{GenerateContentResponse, GenerateContentResponseUsageMetadata};
use crate::{image_utils, ImageTensor, VertexError, VertexResult};
use serde_json::Value;

/// Side of the black image returned when a response carries no image.
pub const PLACEHOLDER_SIZE: usize = 512;

/// A buffered generate response: one chunk for `generateContent`, one per
/// streamed element for `streamGenerateContent`.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    raw: Vec<Value>,
    chunks: Vec<GenerateContentResponse>,
}

impl ParsedResponse {
    /// Parse a response body. A JSON object is one chunk and a JSON array is
    /// a list of chunks. Bodies that are not a single JSON value are read as
    /// newline-delimited JSON objects.
    pub fn parse(body: &str) -> VertexResult<Self> {
        let raw = match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(values)) => values,
            Ok(value @ Value::Object(_)) => vec![value],
            Ok(other) => {
                return Err(VertexError::ResponseFormat(format!(
                    "Expected a JSON object or array, got: {other}"
                )))
            }
            Err(single_error) => parse_json_lines(body).map_err(|line_error| {
                VertexError::ResponseFormat(format!(
                    "Body is neither JSON ({single_error}) nor newline-delimited JSON \
                     ({line_error})"
                ))
            })?,
        };

        let chunks = raw
            .iter()
            .map(|value| {
                if !value.is_object() {
                    return Err(VertexError::ResponseFormat(format!(
                        "Expected each chunk to be a JSON object, got: {value}"
                    )));
                }
                serde_json::from_value::<GenerateContentResponse>(value.clone()).map_err(|e| {
                    VertexError::ResponseFormat(format!("Unexpected chunk shape: {e}"))
                })
            })
            .collect::<VertexResult<Vec<_>>>()?;

        Ok(Self { raw, chunks })
    }

    #[must_use]
    pub fn chunks(&self) -> &[GenerateContentResponse] {
        &self.chunks
    }

    /// Every `text` of the first candidate of every chunk, concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .flat_map(GenerateContentResponse::first_candidate_parts)
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    /// Every inline image of the first candidate of every chunk, decoded to
    /// RGB, in order. Empty when the response holds none.
    pub fn decoded_images(&self) -> VertexResult<Vec<ImageTensor>> {
        self.chunks
            .iter()
            .flat_map(GenerateContentResponse::first_candidate_parts)
            .filter_map(|part| part.inline_data.as_ref())
            .filter(|blob| {
                blob.mime_type
                    .as_deref()
                    .is_none_or(|mime_type| mime_type.starts_with("image/"))
            })
            .filter_map(|blob| blob.data.as_deref().filter(|data| !data.is_empty()))
            .map(image_utils::decode_image_rgb)
            .collect()
    }

    /// Like [`ParsedResponse::decoded_images`] but never empty: a response
    /// without images yields one black placeholder.
    pub fn images(&self) -> VertexResult<Vec<ImageTensor>> {
        let images = self.decoded_images()?;
        if !images.is_empty() {
            return Ok(images);
        }

        match self.block_reason() {
            Some(reason) => tracing::warn!(
                block_reason = reason,
                "prompt was blocked, creating black placeholder"
            ),
            None => tracing::warn!("no image found in response, creating black placeholder"),
        }
        Ok(vec![ImageTensor::black(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)])
    }

    /// The prompt feedback block reason of the first chunk that has one.
    #[must_use]
    pub fn block_reason(&self) -> Option<&str> {
        self.chunks.iter().find_map(|chunk| {
            chunk
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
        })
    }

    /// Usage of the last chunk reporting it; streamed chunks report running
    /// totals.
    #[must_use]
    pub fn usage(&self) -> Option<&GenerateContentResponseUsageMetadata> {
        self.chunks
            .iter()
            .rev()
            .find_map(|chunk| chunk.usage_metadata.as_ref())
    }

    /// The whole chunk list, pretty-printed with 2-space indentation.
    #[must_use]
    pub fn raw_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_default()
    }
}

fn parse_json_lines(body: &str) -> Result<Vec<Value>, String> {
    let values = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str::<Value>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    if values.is_empty() {
        return Err("no JSON lines".to_string());
    }
    Ok(values)
}
