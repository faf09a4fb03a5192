use crate::VertexError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Create a JSON request and buffer the whole response body.
/// Returns an error on non-success status codes, carrying the body.
pub async fn send_json<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
    timeout: Duration,
) -> Result<String, VertexError> {
    let response = client
        .post(url)
        .headers(headers)
        .timeout(timeout)
        .json(data)
        .send()
        .await?;
    let status = response.status();
    if status.is_success() {
        Ok(response.text().await?)
    } else {
        Err(VertexError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ))
    }
}

/// GET a URL and buffer the body, with the same status handling as
/// [`send_json`].
pub async fn get_text(
    client: &Client,
    url: &str,
    headers: reqwest::header::HeaderMap,
    timeout: Duration,
) -> Result<String, VertexError> {
    let response = client
        .get(url)
        .headers(headers)
        .timeout(timeout)
        .send()
        .await?;
    let status = response.status();
    if status.is_success() {
        Ok(response.text().await?)
    } else {
        Err(VertexError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ))
    }
}
