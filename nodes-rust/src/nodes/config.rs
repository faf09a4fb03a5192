use super::{safety_level, safety_level_input, CONFIG_CATEGORY};
use crate::{
    InputKind, InputSpec, Node, NodeContext, NodeError, NodeInputs, NodeOutput, NodeResult, NodeValue,
    OutputSpec, ValueType,
};
use async_trait::async_trait;
use vertex_sdk::{
    config::{default_safety_settings, HarmBlockThreshold, Modality, ThinkingConfig, ThinkingLevel},
    google::Content,
    ConfigFile, ConfigStore, GenerationConfig,
};

const NO_CONFIG_FILES: &str = "none";

/// Turns widget values into a [`GenerationConfig`].
#[derive(Debug, Default)]
pub struct GenerationConfigNode;

fn thinking_level(value: &str) -> Option<ThinkingLevel> {
    match value {
        "HIGH" => Some(ThinkingLevel::High),
        "LOW" => Some(ThinkingLevel::Low),
        _ => None,
    }
}

fn response_modalities(value: &str) -> Vec<Modality> {
    match value {
        "TEXT" => vec![Modality::Text],
        "IMAGE" => vec![Modality::Image],
        _ => vec![Modality::Text, Modality::Image],
    }
}

#[async_trait]
impl Node for GenerationConfigNode {
    fn name(&self) -> &'static str {
        "VertexGenerationConfig"
    }

    fn display_name(&self) -> &'static str {
        "Vertex Generation Config"
    }

    fn category(&self) -> &'static str {
        CONFIG_CATEGORY
    }

    async fn input_specs(&self, _context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        Ok(vec![
            InputSpec::required(
                "temperature",
                InputKind::Float {
                    min: 0.0,
                    max: 2.0,
                    step: 0.1,
                },
            )
            .with_default(1.0),
            InputSpec::required(
                "top_p",
                InputKind::Float {
                    min: 0.0,
                    max: 1.0,
                    step: 0.01,
                },
            )
            .with_default(0.95),
            InputSpec::required("thinking_level", InputKind::choice(["HIGH", "LOW"]))
                .with_default("HIGH"),
            InputSpec::required("max_output_tokens", InputKind::Int { min: 1, max: 32768 })
                .with_default(8192_i64),
            safety_level_input(HarmBlockThreshold::Off),
            InputSpec::required(
                "response_modalities",
                InputKind::choice(["TEXT_AND_IMAGE", "TEXT", "IMAGE"]),
            )
            .with_default("TEXT_AND_IMAGE"),
            InputSpec::optional("system_instruction", InputKind::String { multiline: true })
                .with_default(""),
        ])
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![OutputSpec::new(
            "generation_config",
            ValueType::GenerationConfig,
        )]
    }

    async fn execute(
        &self,
        inputs: &NodeInputs,
        _context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        let max_output_tokens = u32::try_from(inputs.int("max_output_tokens")?)
            .map_err(|e| NodeError::invalid("max_output_tokens", e.to_string()))?;

        let config = GenerationConfig {
            temperature: Some(inputs.float("temperature")?),
            top_p: Some(inputs.float("top_p")?),
            max_output_tokens: Some(max_output_tokens),
            thinking_config: Some(ThinkingConfig {
                thinking_level: thinking_level(inputs.string("thinking_level")?),
            }),
            response_modalities: Some(response_modalities(
                inputs.string("response_modalities")?,
            )),
            safety_settings: Some(default_safety_settings(safety_level(inputs)?)),
            system_instruction: inputs
                .optional_string("system_instruction")?
                .filter(|instruction| !instruction.is_empty())
                .map(Content::from_text),
        };
        config.validate()?;

        Ok(NodeOutput::new(vec![config.into()]))
    }
}

/// Writes the connected configs to a new timestamped file.
#[derive(Debug, Default)]
pub struct SaveConfigNode;

#[async_trait]
impl Node for SaveConfigNode {
    fn name(&self) -> &'static str {
        "VertexSaveConfig"
    }

    fn display_name(&self) -> &'static str {
        "Vertex Save Config"
    }

    fn category(&self) -> &'static str {
        CONFIG_CATEGORY
    }

    async fn input_specs(&self, _context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        Ok(vec![
            InputSpec::required("filename_prefix", InputKind::String { multiline: false })
                .with_default("vertex_config"),
            InputSpec::optional("vertex_config", InputKind::VertexConfig),
            InputSpec::optional("generation_config", InputKind::GenerationConfig),
        ])
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![OutputSpec::new("filepath", ValueType::String)]
    }

    fn is_output_node(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        inputs: &NodeInputs,
        context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        let prefix = inputs.string("filename_prefix")?;
        let data = ConfigFile {
            vertex_config: inputs.optional_vertex_config("vertex_config")?.cloned(),
            generation_config: inputs
                .generation_config("generation_config")?
                .filter(|config| **config != GenerationConfig::default())
                .cloned(),
            ..Default::default()
        };

        let path = context
            .store()
            .save(&ConfigStore::timestamped_name(prefix), &data)?;
        tracing::info!(path = %path.display(), "Vertex config saved");

        Ok(NodeOutput::new(vec![NodeValue::String(
            path.display().to_string(),
        )]))
    }
}

/// Reads a saved config file back into node values.
#[derive(Debug, Default)]
pub struct LoadConfigNode;

#[async_trait]
impl Node for LoadConfigNode {
    fn name(&self) -> &'static str {
        "VertexLoadConfig"
    }

    fn display_name(&self) -> &'static str {
        "Vertex Load Config"
    }

    fn category(&self) -> &'static str {
        CONFIG_CATEGORY
    }

    async fn input_specs(&self, context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        let mut files = context.store().list()?;
        if files.is_empty() {
            files.push(NO_CONFIG_FILES.to_string());
        }
        let default = files[0].clone();
        Ok(vec![
            InputSpec::required("config_file", InputKind::Choice(files)).with_default(default)
        ])
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![
            OutputSpec::new("vertex_config", ValueType::VertexConfig),
            OutputSpec::new("generation_config", ValueType::GenerationConfig),
        ]
    }

    async fn execute(
        &self,
        inputs: &NodeInputs,
        context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        let config_file = inputs.string("config_file")?;
        let data = if config_file == NO_CONFIG_FILES {
            ConfigFile::default()
        } else {
            context.store().load(config_file)?
        };

        Ok(NodeOutput::new(vec![
            NodeValue::VertexConfig(data.vertex_config.unwrap_or_default()),
            NodeValue::GenerationConfig(data.generation_config.unwrap_or_default()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_choices_map_to_lists() {
        assert_eq!(
            response_modalities("TEXT_AND_IMAGE"),
            vec![Modality::Text, Modality::Image]
        );
        assert_eq!(response_modalities("TEXT"), vec![Modality::Text]);
        assert_eq!(response_modalities("IMAGE"), vec![Modality::Image]);
    }

    #[test]
    fn thinking_levels_parse() {
        assert_eq!(thinking_level("HIGH"), Some(ThinkingLevel::High));
        assert_eq!(thinking_level("LOW"), Some(ThinkingLevel::Low));
        assert_eq!(thinking_level("MEDIUM"), None);
    }
}
