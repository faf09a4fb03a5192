use super::{custom_model_name_input, model_name_input, target_model, CATEGORY};
use crate::{
    InputKind, InputSpec, Node, NodeContext, NodeInputs, NodeOutput, NodeResult, NodeValue,
    OutputSpec, ValueType,
};
use async_trait::async_trait;
use vertex_sdk::{
    google::{
        build_generate_content_parameters, GenerationKind, ImageConfig, ImageOutputOptions,
        NodeOverrides, Prompt,
    },
    ImageTensor,
};

const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
const IMAGE_INPUTS: [&str; 4] = ["image_input", "image_2", "image_3", "image_4"];

/// Generates images with Gemini or Imagen from a prompt and up to four
/// reference image batches.
#[derive(Debug, Default)]
pub struct ImageGeneratorNode;

fn image_config(inputs: &NodeInputs) -> NodeResult<ImageConfig> {
    Ok(ImageConfig {
        aspect_ratio: inputs.string("aspect_ratio")?.to_string(),
        image_size: inputs.string("output_resolution")?.to_string(),
        person_generation: inputs.string("person_generation")?.to_string(),
        image_output_options: ImageOutputOptions {
            mime_type: inputs.string("output_format")?.to_string(),
        },
    })
}

#[async_trait]
impl Node for ImageGeneratorNode {
    fn name(&self) -> &'static str {
        "VertexGeminiImageGenerator"
    }

    fn display_name(&self) -> &'static str {
        "Vertex AI Image (Gemini 3/Imagen)"
    }

    fn category(&self) -> &'static str {
        CATEGORY
    }

    async fn input_specs(&self, context: &NodeContext) -> NodeResult<Vec<InputSpec>> {
        let mut specs = vec![
            InputSpec::required("vertex_config", InputKind::VertexConfig),
            InputSpec::required("prompt", InputKind::String { multiline: true })
                .with_default("A cinematic shot of a cyberpunk detective"),
            model_name_input(context, DEFAULT_MODEL).await,
            InputSpec::required(
                "aspect_ratio",
                InputKind::choice(["1:1", "16:9", "9:16", "4:3", "3:4", "21:9"]),
            )
            .with_default("1:1"),
            InputSpec::required(
                "person_generation",
                InputKind::choice(["ALLOW_ADULT", "ALLOW_ALL", "DONT_ALLOW"]),
            )
            .with_default("ALLOW_ADULT"),
            InputSpec::required("output_resolution", InputKind::choice(["1K", "2K", "4K"]))
                .with_default("1K"),
            InputSpec::required(
                "output_format",
                InputKind::choice(["image/png", "image/jpeg"]),
            )
            .with_default("image/png"),
        ];
        specs.extend(
            IMAGE_INPUTS.map(|name| InputSpec::optional(name, InputKind::Image)),
        );
        specs.extend([
            InputSpec::optional("generation_config", InputKind::GenerationConfig),
            InputSpec::optional("negative_prompt", InputKind::String { multiline: true })
                .with_default(""),
            custom_model_name_input(),
        ]);
        Ok(specs)
    }

    fn output_specs(&self) -> Vec<OutputSpec> {
        vec![
            OutputSpec::new("image", ValueType::Image),
            OutputSpec::new("raw_response", ValueType::String),
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

        let mut prompt = Prompt::new(inputs.string("prompt")?);
        if let Some(negative) = inputs.non_blank_string("negative_prompt")? {
            prompt = prompt.with_negative(negative);
        }
        for name in IMAGE_INPUTS {
            if let Some(image) = inputs.image(name)? {
                prompt = prompt.with_image(image.clone());
            }
        }

        let params = build_generate_content_parameters(
            &prompt,
            inputs.generation_config("generation_config")?,
            &NodeOverrides::image_generation(image_config(inputs)?),
        )?;

        tracing::info!(model = model.as_str(), "Vertex AI image request");
        let response = context
            .client()
            .generate_content(vertex_config, &model, GenerationKind::Image, &params)
            .await?;

        let images = ImageTensor::stack(response.images()?)?;

        Ok(NodeOutput::new(vec![
            NodeValue::Image(images),
            NodeValue::String(response.raw_json()),
            NodeValue::GenerationConfig(params.effective_generation_config()),
        ]))
    }
}
