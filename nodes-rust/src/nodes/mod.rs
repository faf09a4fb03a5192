mod auth;
mod config;
mod image_generator;
mod text_generator;

pub use auth::VertexAuthNode;
pub use config::{GenerationConfigNode, LoadConfigNode, SaveConfigNode};
pub use image_generator::ImageGeneratorNode;
pub use text_generator::TextGeneratorNode;

use crate::{InputKind, InputSpec, NodeContext, NodeError, NodeInputs, NodeResult};
use vertex_sdk::config::HarmBlockThreshold;

pub(crate) const CATEGORY: &str = "VertexAI";
pub(crate) const CONFIG_CATEGORY: &str = "VertexAI/Config";

const SAFETY_LEVELS: [HarmBlockThreshold; 4] = [
    HarmBlockThreshold::BlockNone,
    HarmBlockThreshold::BlockOnlyHigh,
    HarmBlockThreshold::BlockMediumAndAbove,
    HarmBlockThreshold::Off,
];

fn safety_level_input(default: HarmBlockThreshold) -> InputSpec {
    InputSpec::required(
        "safety_filter_level",
        InputKind::choice(SAFETY_LEVELS.map(HarmBlockThreshold::as_str)),
    )
    .with_default(default.as_str())
}

fn safety_level(inputs: &NodeInputs) -> NodeResult<HarmBlockThreshold> {
    let level = inputs.string("safety_filter_level")?;
    HarmBlockThreshold::parse(level)
        .ok_or_else(|| NodeError::invalid("safety_filter_level", format!("unknown level {level:?}")))
}

/// The cached model list, with `default` first when discovery did not
/// return it.
async fn model_name_input(context: &NodeContext, default: &'static str) -> InputSpec {
    let models = context.models().await;
    let mut choices = Vec::with_capacity(models.len() + 1);
    if !models.iter().any(|model| model == default) {
        choices.push(default.to_string());
    }
    choices.extend(models.iter().cloned());
    InputSpec::required("model_name", InputKind::Choice(choices)).with_default(default)
}

fn custom_model_name_input() -> InputSpec {
    InputSpec::optional("custom_model_name", InputKind::String { multiline: false })
        .with_default("")
        .with_placeholder("Override model name manually")
}

/// `custom_model_name` when it is not blank, else `model_name`.
fn target_model(inputs: &NodeInputs) -> NodeResult<String> {
    match inputs.non_blank_string("custom_model_name")? {
        Some(custom) => Ok(custom.to_string()),
        None => Ok(inputs.string("model_name")?.to_string()),
    }
}
