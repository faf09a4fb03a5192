use dotenvy::dotenv;
use std::collections::HashMap;
use vertex_nodes::{NodeContext, NodeRegistry, NodeValue};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vertex_nodes=info,vertex_sdk=info".into()),
        )
        .init();

    let registry = NodeRegistry::new();
    let context = NodeContext::default();

    let mut auth_inputs = HashMap::new();
    if let Ok(api_key) = std::env::var("VERTEX_API_KEY") {
        auth_inputs.insert("api_key".to_string(), NodeValue::String(api_key));
    }
    if let Ok(project_id) = std::env::var("VERTEX_PROJECT_ID") {
        auth_inputs.insert("project_id".to_string(), NodeValue::String(project_id));
    }
    let auth = registry
        .execute("VertexAIAuth", auth_inputs, &context)
        .await
        .expect("auth node failed");

    let text = registry
        .execute(
            "VertexGeminiTextGenerator",
            HashMap::from([
                ("vertex_config".to_string(), auth.values[0].clone()),
                (
                    "prompt".to_string(),
                    NodeValue::string("Describe a lighthouse at dusk in two sentences."),
                ),
                (
                    "model_name".to_string(),
                    NodeValue::string("gemini-3.0-pro-preview"),
                ),
            ]),
            &context,
        )
        .await
        .expect("text node failed");

    println!("{}", text.values[0].as_str().unwrap_or_default());
}
