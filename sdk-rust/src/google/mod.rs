mod api;
mod client;
mod payload;
mod response;

pub use api::*;
pub use client::{Endpoint, GenerationKind, VertexClient, VertexClientOptions};
pub use payload::{build_generate_content_parameters, NodeOverrides, Prompt};
pub use response::{ParsedResponse, PLACEHOLDER_SIZE};
