use vertex_sdk::VertexConfig;

/// Vertex settings from the environment. `VERTEX_API_KEY` selects the
/// key-based endpoint; otherwise `GOOGLE_APPLICATION_CREDENTIALS` or gcloud
/// default credentials are used.
pub fn vertex_config() -> VertexConfig {
    let mut config = VertexConfig::default();
    if let Ok(api_key) = std::env::var("VERTEX_API_KEY") {
        config.api_key = api_key;
    }
    if let Ok(project_id) = std::env::var("VERTEX_PROJECT_ID") {
        config.project_id = project_id;
    }
    if let Ok(location) = std::env::var("VERTEX_LOCATION") {
        config.location = location;
    }
    config
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vertex_sdk=info".into()),
        )
        .init();
}
