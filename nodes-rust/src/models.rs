use std::sync::{Arc, LazyLock};
use tokio::sync::OnceCell;
use vertex_sdk::{auth::CREDENTIALS_ENV, config::DEFAULT_LOCATION, google::VertexClient};

/// Offered when discovery is off or fails.
pub const DEFAULT_MODELS: [&str; 3] = [
    "gemini-3-pro-image-preview",
    "gemini-3.0-pro-preview",
    "gemini-2.5-flash-image",
];

const DISCOVERY_ENV_VARS: [&str; 2] = [CREDENTIALS_ENV, "GOOGLE_CLOUD_PROJECT"];

static SHARED: LazyLock<ModelCache> = LazyLock::new(ModelCache::new);

/// Model ids offered by the generator nodes, computed once and never
/// refreshed.
#[derive(Debug, Clone, Default)]
pub struct ModelCache {
    models: Arc<OnceCell<Vec<String>>>,
    discovery: Option<bool>,
}

impl ModelCache {
    /// Discovery runs only when the credential environment variables are set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force discovery on or off regardless of the environment.
    #[must_use]
    pub fn with_discovery(enabled: bool) -> Self {
        Self {
            discovery: Some(enabled),
            ..Self::default()
        }
    }

    /// The process-wide cache.
    #[must_use]
    pub fn shared() -> Self {
        SHARED.clone()
    }

    fn discovery_enabled(&self) -> bool {
        self.discovery.unwrap_or_else(|| {
            DISCOVERY_ENV_VARS
                .iter()
                .any(|name| std::env::var_os(name).is_some_and(|value| !value.is_empty()))
        })
    }

    /// The cached list, populating it on first use. Never fails: any
    /// discovery error falls back to [`DEFAULT_MODELS`].
    pub async fn models(&self, client: &VertexClient) -> &[String] {
        self.models
            .get_or_init(|| async {
                if !self.discovery_enabled() {
                    return default_models();
                }
                match client.list_publisher_models(DEFAULT_LOCATION).await {
                    Ok(ids) => merge_with_defaults(ids),
                    Err(error) => {
                        tracing::warn!(%error, "failed to fetch model list, using defaults");
                        default_models()
                    }
                }
            })
            .await
    }
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(ToString::to_string).collect()
}

/// Keep Gemini and Imagen ids, add the defaults, dedupe and sort. Without a
/// single generative id the defaults are returned as-is.
fn merge_with_defaults(ids: Vec<String>) -> Vec<String> {
    let mut models: Vec<String> = ids
        .into_iter()
        .filter(|id| id.contains("gemini") || id.contains("imagen"))
        .collect();
    if models.is_empty() {
        return default_models();
    }
    models.extend(default_models());
    models.sort_unstable();
    models.dedup();
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_filters_dedupes_and_sorts() {
        let merged = merge_with_defaults(vec![
            "text-bison".to_string(),
            "imagen-4.0-generate-001".to_string(),
            "gemini-3-pro-image-preview".to_string(),
            "gemini-2.5-flash".to_string(),
        ]);
        assert_eq!(
            merged,
            vec![
                "gemini-2.5-flash",
                "gemini-2.5-flash-image",
                "gemini-3-pro-image-preview",
                "gemini-3.0-pro-preview",
                "imagen-4.0-generate-001",
            ]
        );
    }

    #[test]
    fn merge_without_generative_ids_keeps_defaults() {
        assert_eq!(
            merge_with_defaults(vec!["chirp".to_string()]),
            default_models()
        );
    }
}
