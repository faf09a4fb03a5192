use super::api::{Content, GenerateContentConfig, GenerateContentParameters, ImageConfig, Part};
use crate::{
    config::{default_safety_settings, HarmBlockThreshold, Modality},
    image_utils, GenerationConfig, ImageTensor, VertexResult,
};

/// What the user asked for: prompt text, an optional negative prompt and any
/// reference images.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub text: String,
    pub negative: Option<String>,
    /// Reference images in input order. Every frame of every batch becomes
    /// its own part.
    pub images: Vec<ImageTensor>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_negative(mut self, negative: impl Into<String>) -> Self {
        self.negative = Some(negative.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: ImageTensor) -> Self {
        self.images.push(image);
        self
    }

    fn full_text(&self) -> String {
        match self.negative.as_deref().map(str::trim) {
            Some(negative) if !negative.is_empty() => {
                format!("{} --negative_prompt={negative}", self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// A generator node's own parameter values. They form the baseline that a
/// supplied [`GenerationConfig`] overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOverrides {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<Modality>,
    pub safety_threshold: HarmBlockThreshold,
    /// Used only when the generation config carries no system instruction.
    pub system_instruction: Option<String>,
    /// Always taken from the node, never from a generation config.
    pub image_config: Option<ImageConfig>,
}

impl NodeOverrides {
    /// Image generation baseline: temperature 1.0, topP 0.95, 32768 output
    /// tokens, text and image output, safety filters off.
    #[must_use]
    pub fn image_generation(image_config: ImageConfig) -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            max_output_tokens: 32768,
            response_modalities: vec![Modality::Text, Modality::Image],
            safety_threshold: HarmBlockThreshold::Off,
            system_instruction: None,
            image_config: Some(image_config),
        }
    }

    /// Text generation baseline: topP 0.95, text output, `BLOCK_NONE`.
    #[must_use]
    pub fn text_generation(temperature: f64, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            top_p: 0.95,
            max_output_tokens,
            response_modalities: vec![Modality::Text],
            safety_threshold: HarmBlockThreshold::BlockNone,
            system_instruction: None,
            image_config: None,
        }
    }

    #[must_use]
    pub fn with_safety_threshold(mut self, threshold: HarmBlockThreshold) -> Self {
        self.safety_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        self.system_instruction = (!instruction.trim().is_empty()).then_some(instruction);
        self
    }
}

/// Build the request body for one generate call. Makes no network call.
pub fn build_generate_content_parameters(
    prompt: &Prompt,
    generation_config: Option<&GenerationConfig>,
    overrides: &NodeOverrides,
) -> VertexResult<GenerateContentParameters> {
    let mut parts = vec![Part::text(prompt.full_text())];
    for image in &prompt.images {
        for frame in image.frames() {
            let (data, mime_type) = image_utils::encode_image(&frame)?;
            parts.push(Part::inline_data(data, mime_type));
        }
    }

    let mut config = GenerateContentConfig {
        temperature: Some(overrides.temperature),
        top_p: Some(overrides.top_p),
        max_output_tokens: Some(overrides.max_output_tokens),
        response_modalities: Some(overrides.response_modalities.clone()),
        thinking_config: None,
        image_config: overrides.image_config.clone(),
    };
    let mut safety_settings = default_safety_settings(overrides.safety_threshold);
    let mut system_instruction = overrides
        .system_instruction
        .as_ref()
        .map(Content::from_text);

    if let Some(generation_config) = generation_config {
        if let Some(temperature) = generation_config.temperature {
            config.temperature = Some(temperature);
        }
        if let Some(top_p) = generation_config.top_p {
            config.top_p = Some(top_p);
        }
        if let Some(max_output_tokens) = generation_config.max_output_tokens {
            config.max_output_tokens = Some(max_output_tokens);
        }
        if let Some(modalities) = &generation_config.response_modalities {
            config.response_modalities = Some(modalities.clone());
        }
        if let Some(thinking_config) = generation_config.thinking_config {
            config.thinking_config = Some(thinking_config);
        }
        if let Some(settings) = &generation_config.safety_settings {
            safety_settings.clone_from(settings);
        }
        if let Some(instruction) = &generation_config.system_instruction {
            system_instruction = Some(instruction.clone());
        }
    }

    Ok(GenerateContentParameters {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: Some(parts),
        }],
        generation_config: Some(config),
        safety_settings,
        system_instruction,
    })
}

impl GenerateContentParameters {
    /// The generation parameters this request actually uses, in the form
    /// nodes pass downstream. `imageConfig` is not part of it.
    #[must_use]
    pub fn effective_generation_config(&self) -> GenerationConfig {
        let config = self.generation_config.clone().unwrap_or_default();
        GenerationConfig {
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
            thinking_config: config.thinking_config,
            response_modalities: config.response_modalities,
            safety_settings: Some(self.safety_settings.clone()),
            system_instruction: self.system_instruction.clone(),
        }
    }
}
