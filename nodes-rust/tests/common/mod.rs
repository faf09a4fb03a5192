#![allow(dead_code)]

use base64::Engine as _;
use serde_json::{json, Value};
use std::{collections::HashMap, path::Path, sync::Arc};
use vertex_nodes::{ModelCache, NodeContext, NodeContextOptions, NodeValue};
use vertex_sdk::{
    auth::StaticTokenResolver,
    google::{VertexClient, VertexClientOptions},
    ConfigStore, VertexConfig,
};
use wiremock::MockServer;

pub struct ContextOptions<'a> {
    pub server: Option<&'a MockServer>,
    pub config_dir: &'a Path,
    pub token_project: Option<&'a str>,
    pub ambient_credentials: bool,
    pub model_discovery: bool,
}

impl<'a> ContextOptions<'a> {
    pub fn new(config_dir: &'a Path) -> Self {
        Self {
            server: None,
            config_dir,
            token_project: Some("test-project"),
            ambient_credentials: false,
            model_discovery: false,
        }
    }

    pub fn server(mut self, server: &'a MockServer) -> Self {
        self.server = Some(server);
        self
    }

    pub fn build(self) -> NodeContext {
        NodeContext::new(NodeContextOptions {
            client: Some(VertexClient::new(VertexClientOptions {
                base_url: self.server.map(MockServer::uri),
                resolver: Some(Arc::new(StaticTokenResolver::new(
                    "test-token",
                    self.token_project.map(str::to_string),
                ))),
                ..Default::default()
            })),
            store: Some(ConfigStore::new(self.config_dir)),
            model_cache: Some(ModelCache::with_discovery(self.model_discovery)),
            ambient_credentials: Some(self.ambient_credentials),
        })
    }
}

pub fn inputs<const N: usize>(values: [(&str, NodeValue); N]) -> HashMap<String, NodeValue> {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub fn api_key_config() -> VertexConfig {
    VertexConfig {
        api_key: "k-123".to_string(),
        ..Default::default()
    }
}

/// A base64 PNG of a `width` x `height` solid RGB image.
pub fn png_base64(width: u32, height: u32, rgb: [u8; 3]) -> String {
    let tensor = vertex_sdk::ImageTensor::new(
        [1, height as usize, width as usize, 4],
        [rgb[0], rgb[1], rgb[2], 255]
            .map(|v| f32::from(v) / 255.0)
            .repeat((width * height) as usize),
    )
    .unwrap();
    let (data, _) = vertex_sdk::image_utils::encode_image(&tensor).unwrap();
    assert!(base64::engine::general_purpose::STANDARD
        .decode(&data)
        .is_ok());
    data
}

pub fn chunk(parts: Value) -> Value {
    json!({"candidates": [{"content": {"role": "model", "parts": parts}}]})
}

pub fn image_part(data: &str) -> Value {
    json!({"inlineData": {"mimeType": "image/png", "data": data}})
}
