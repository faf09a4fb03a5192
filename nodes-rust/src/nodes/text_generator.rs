use super::{
    custom_model_name_input, model_name_input, safety_level, safety_level_input, target_model,
    CATEGORY,
};
use crate::{
    InputKind, InputSpec, Node, NodeContext, NodeError, NodeInputs, NodeOutput, NodeResult,
    NodeValue, OutputSpec, ValueType,
};
use async_trait::async_trait;
use vertex_sdk::{
    config::HarmBlockThreshold,
    google::{build_generate_content_parameters, GenerationKind, NodeOverrides, Prompt},
    VertexError,
};

const DEFAULT_MODEL: &str = "gemini-1.5-pro-002";

/// Generates text with a Gemini model. Request failures after
/// authentication come back as `Error: ...` text instead of failing the
/// pipeline.
#[derive(Debug, Default)]
pub struct TextGeneratorNode;

/// Errors the node reports as text output rather than failing.
fn reported_as_text(error: &VertexError) -> bool {
    error.is_network() || matches!(error, VertexError::ResponseFormat(_))
}

#[async_trait]
impl Node for TextGeneratorNode {
    fn name(&self) -> &'static str {
        "VertexGeminiTextGenerator"
    }

    fn display_name(&self) -> &'static str {
        "Vertex AI Text (Gemini LLM)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    async fn input_specs(&self, context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        Ok(vec![
            InputSpec::required("vertex_config", InputKind::VertexConfig),
            InputSpec::required("prompt", InputKind::String { multiline: true })
                .with_default("Explain quantum physics in simple terms."),
            model_name_input(context, DEFAULT_MODEL).await,
            InputSpec::required(
                "temperature",
                InputKind::Float {
                    min: 0.0,
                    max: 2.0,
                    step: 0.1,
                },
            )
            .with_default(0.7),
            InputSpec::required(
                "max_tokens",
                InputKind::Int {
                    min: 1,
                    max: 1_000_000,
                },
            )
            .with_default(8192_i64),
            safety_level_input(HarmBlockThreshold::BlockNone),
            InputSpec::optional("generation_config", InputKind::GenerationConfig),
            InputSpec::optional("system_instruction", InputKind::String { multiline: true })
                .with_default("You are a helpful assistant."),
            custom_model_name_input(),
        ])
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![
            OutputSpec::new("text", ValueType::String),
            OutputSpec::new("generation_config", ValueType::GenerationConfig),
        ]
    }

    async fn execute(
        &self,
        inputs: &NodeInputs,
        context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        let vertex_config = inputs.vertex_config("vertex_config")?;
        let model = target_model(inputs)?;
        let max_tokens = u32::try_from(inputs.int("max_tokens")?)
            .map_err(|e| NodeError::invalid("max_tokens", e.to_string()))?;

        let mut overrides = NodeOverrides::text_generation(inputs.float("temperature")?, max_tokens)
            .with_safety_threshold(safety_level(inputs)?);
        if let Some(instruction) = inputs.optional_string("system_instruction")? {
            overrides = overrides.with_system_instruction(instruction);
        }

        let params = build_generate_content_parameters(
            &Prompt::new(inputs.string("prompt")?),
            inputs.generation_config("generation_config")?,
            &overrides,
        )?;
        let generation_config = NodeValue::GenerationConfig(params.effective_generation_config());

        let client = context.client();
        let endpoint = client
            .resolve_endpoint(vertex_config, &model, GenerationKind::Text)
            .await?;

        tracing::info!(model = model.as_str(), "Vertex AI text request");
        let text = match client
            .send(&endpoint, &model, GenerationKind::Text, &params)
            .await
        {
            Ok(response) => response.text(),
            Err(error) if reported_as_text(&error) => {
                tracing::error!(%error, "Vertex AI text request failed");
                format!("Error: {error}")
            }
            Err(error) => return Err(error.into()),
        };

        Ok(NodeOutput::new(vec![NodeValue::String(text), generation_config]))
    }
}
