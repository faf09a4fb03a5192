use super::CATEGORY;
use crate::{
    InputKind, InputSpec, Node, NodeContext, NodeInputs, NodeOutput, NodeResult, NodeValue,
    OutputSpec, ValueType,
};
use async_trait::async_trait;
use vertex_sdk::{ConfigStore, VertexConfig, VertexError};

const DEFAULT_CONFIG_FILE: &str = "vertex_config.json";
const MASKED_API_KEY: &str = "***********";
const API_KEYS_DOC_URL: &str =
    "https://docs.cloud.google.com/vertex-ai/generative-ai/docs/start/api-keys";

/// Builds the [`VertexConfig`] the generators consume. Credentials typed into
/// the node are saved to the config file so the key can be cleared from the
/// widget afterwards.
#[derive(Debug, Default)]
pub struct VertexAuthNode;

/// Keys made of `*` only are what the widget shows after a save.
fn is_masked(api_key: &str) -> bool {
    api_key.chars().all(|c| c == '*')
}

#[async_trait]
impl Node for VertexAuthNode {
    fn name(&self) -> &'static str {
        "VertexAIAuth"
    }

    fn display_name(&self) -> &'static str {
        "Vertex AI Auth/Config"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    async fn input_specs(&self, _context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        let text = InputKind::String { multiline: false };
        Ok(vec![
            InputSpec::required("config_file", text.clone()).with_default(DEFAULT_CONFIG_FILE),
            InputSpec::optional("service_account_json", text.clone())
                .with_default("")
                .with_placeholder("Path to JSON (leave empty for env vars)"),
            InputSpec::optional("api_key", text.clone())
                .with_default("")
                .with_placeholder("Optional: Enter to save, then clear"),
            InputSpec::optional("project_id", text.clone())
                .with_default("")
                .with_placeholder("Leave empty to use the credentials' project"),
            InputSpec::optional("location", text)
                .with_default("")
                .with_placeholder("us-central1"),
        ])
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![OutputSpec::new("vertex_config", ValueType::VertexConfig)]
    }

    async fn execute(
        &self,
        inputs: &NodeInputs,
        context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        // A blank name starts a fresh timestamped file.
        let config_file = inputs
            .non_blank_string("config_file")?
            .map_or_else(ConfigStore::generated_vertex_config_name, str::to_string);
        let config_file = config_file.as_str();
        let store = context.store();

        let mut vertex_config = match store.load(config_file) {
            Ok(data) => data.vertex_config.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(config_file, %error, "failed to load saved Vertex config");
                VertexConfig::default()
            }
        };

        let service_account = inputs.non_blank_string("service_account_json")?;
        let api_key = inputs
            .non_blank_string("api_key")?
            .filter(|key| !is_masked(key));

        if api_key.is_none()
            && service_account.is_none()
            && !vertex_config.has_credentials()
            && !context.ambient_credentials().await
        {
            return Err(VertexError::Auth(format!(
                "Credentials missing. Enter an API key or a service account JSON path, or set \
                 up Application Default Credentials. See {API_KEYS_DOC_URL}"
            ))
            .into());
        }

        if let Some(project_id) = inputs.non_blank_string("project_id")? {
            vertex_config.project_id = project_id.to_string();
        }
        if let Some(location) = inputs.non_blank_string("location")? {
            vertex_config.location = location.to_string();
        }
        if let Some(path) = service_account {
            vertex_config.service_account_path = path.to_string();
        }
        if let Some(key) = api_key {
            vertex_config.api_key = key.to_string();
        }

        if service_account.is_none() && api_key.is_none() {
            return Ok(NodeOutput::new(vec![vertex_config.into()]));
        }

        let saved_path = match store.update_vertex_config(config_file, &vertex_config) {
            Ok(path) => path.display().to_string(),
            Err(error) => {
                tracing::warn!(config_file, %error, "failed to save Vertex config");
                config_file.to_string()
            }
        };

        let output = NodeOutput::new(vec![NodeValue::VertexConfig(vertex_config)]);
        if api_key.is_some() {
            Ok(output
                .with_ui("api_key", vec![MASKED_API_KEY.to_string()])
                .with_ui("config_file", vec![saved_path]))
        } else {
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_keys_are_recognised() {
        assert!(is_masked(MASKED_API_KEY));
        assert!(is_masked("***"));
        assert!(!is_masked("AIza***"));
    }
}
