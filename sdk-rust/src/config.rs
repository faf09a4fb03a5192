use crate::{google::Content, VertexError, VertexResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Project id placeholder meaning "use the project the credentials belong to".
pub const AUTO_DETECT_PROJECT: &str = "auto-detect";
pub const DEFAULT_LOCATION: &str = "us-central1";

const AUTO_DETECT_ALIASES: [&str; 2] = [AUTO_DETECT_PROJECT, "auto-detect-if-empty"];

/// Where and how to reach Vertex AI. Produced by the auth node or loaded from
/// a config file, consumed by the generator nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct VertexConfig {
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default = "default_location")]
    pub location: String,
    /// Path to a service account key file. Older config files store it as
    /// `service_account_json`.
    #[serde(default, alias = "service_account_json")]
    pub service_account_path: String,
    #[serde(default)]
    pub api_key: String,
}

fn default_project_id() -> String {
    AUTO_DETECT_PROJECT.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            location: default_location(),
            service_account_path: String::new(),
            api_key: String::new(),
        }
    }
}

impl VertexConfig {
    /// The configured project, or `None` when it should be taken from the
    /// resolved credentials.
    #[must_use]
    pub fn explicit_project_id(&self) -> Option<&str> {
        let project_id = self.project_id.trim();
        if project_id.is_empty() || AUTO_DETECT_ALIASES.contains(&project_id) {
            None
        } else {
            Some(project_id)
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        let location = self.location.trim();
        if location.is_empty() {
            DEFAULT_LOCATION
        } else {
            location
        }
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    #[must_use]
    pub fn service_account_path(&self) -> Option<&Path> {
        non_blank(&self.service_account_path).map(Path::new)
    }

    /// Whether this config names a credential of its own. Ambient credentials
    /// are checked separately.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.api_key().is_some() || self.service_account_path().is_some()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Output modalities a generation request may ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThinkingLevel {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_level: Option<ThinkingLevel>,
}

/// Harm categories a safety setting can target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY")]
    CivicIntegrity,
}

/// Probability threshold at which content is blocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
    Off,
}

impl HarmBlockThreshold {
    pub const ALL: [Self; 5] = [
        Self::BlockNone,
        Self::BlockOnlyHigh,
        Self::BlockMediumAndAbove,
        Self::BlockLowAndAbove,
        Self::Off,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockNone => "BLOCK_NONE",
            Self::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            Self::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            Self::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            Self::Off => "OFF",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// The four categories every request filters on, all at `threshold`.
#[must_use]
pub fn default_safety_settings(threshold: HarmBlockThreshold) -> Vec<SafetySetting> {
    [
        HarmCategory::HateSpeech,
        HarmCategory::DangerousContent,
        HarmCategory::SexuallyExplicit,
        HarmCategory::Harassment,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold,
    })
    .collect()
}

/// Generation parameters passed between nodes. Every field is optional; a
/// present field overrides the generator node's own value when the request
/// is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "top_p")]
    pub top_p: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "max_output_tokens"
    )]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
    /// Replaces the node's safety list wholesale when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerationConfig {
    /// Check numeric ranges: temperature in [0, 2], topP in [0, 1],
    /// maxOutputTokens at least 1.
    pub fn validate(&self) -> VertexResult<()> {
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(VertexError::InvalidInput(format!(
                    "temperature must be between 0 and 2, got {temperature}"
                )));
            }
        }
        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(VertexError::InvalidInput(format!(
                    "topP must be between 0 and 1, got {top_p}"
                )));
            }
        }
        if self.max_output_tokens == Some(0) {
            return Err(VertexError::InvalidInput(
                "maxOutputTokens must be at least 1".to_string(),
            ));
        }
        if self.response_modalities.as_ref().is_some_and(Vec::is_empty) {
            return Err(VertexError::InvalidInput(
                "responseModalities must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk config file. Keys other than `vertex_config` and
/// `generation_config` are kept as-is across load and save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_config: Option<VertexConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigFile {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_config.is_none() && self.generation_config.is_none() && self.extra.is_empty()
    }
}
