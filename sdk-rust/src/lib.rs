pub mod auth;
mod client_utils;
pub mod config;
mod config_store;
mod errors;
pub mod google;
pub mod image_utils;
mod opentelemetry;
mod tensor;

pub use config::{ConfigFile, GenerationConfig, VertexConfig};
pub use config_store::ConfigStore;
pub use errors::*;
pub use tensor::ImageTensor;
