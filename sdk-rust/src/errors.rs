use thiserror::Error;

#[derive(Error, Debug)]
pub enum VertexError {
    /// No credential source yielded a usable bearer token.
    #[error("Auth error: {0}")]
    Auth(String),
    /// A config file exists but is not valid JSON, or holds values outside
    /// their allowed ranges.
    #[error("Config parse error ({0}): {1}")]
    ConfigParse(String, String),
    /// The request to Vertex AI could not be sent or its body could not be
    /// read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-success status code. Carries the response
    /// body when one was readable.
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response body is neither a JSON value nor newline-delimited JSON
    /// objects.
    #[error("Response format error: {0}")]
    ResponseFormat(String),
    /// Inline data is not valid base64 or not a decodable image.
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VertexError {
    /// Whether the error belongs to the network family (transport failure or
    /// non-success status).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::StatusCode(..))
    }
}

pub type VertexResult<T> = Result<T, VertexError>;
