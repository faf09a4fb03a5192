use crate::ValueType;
use thiserror::Error;
use vertex_sdk::VertexError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Vertex(#[from] VertexError),
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Missing required input: {0}")]
    MissingInput(String),
    #[error("Input {name} expects {expected}, got {actual}")]
    InputType {
        name: String,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("Invalid value for input {name}: {message}")]
    InvalidInput { name: String, message: String },
}

impl NodeError {
    pub(crate) fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type NodeResult<T> = Result<T, NodeError>;
