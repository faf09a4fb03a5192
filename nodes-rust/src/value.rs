use crate::{NodeError, NodeResult};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};
use vertex_sdk::{GenerationConfig, ImageTensor, VertexConfig};

/// A value flowing along a pipeline edge or held by a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    String(String),
    Float(f64),
    Int(i64),
    Image(ImageTensor),
    VertexConfig(VertexConfig),
    GenerationConfig(GenerationConfig),
}

impl NodeValue {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Float(_) => ValueType::Float,
            Self::Int(_) => ValueType::Int,
            Self::Image(_) => ValueType::Image,
            Self::VertexConfig(_) => ValueType::VertexConfig,
            Self::GenerationConfig(_) => ValueType::GenerationConfig,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&ImageTensor> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vertex_config(&self) -> Option<&VertexConfig> {
        match self {
            Self::VertexConfig(config) => Some(config),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_generation_config(&self) -> Option<&GenerationConfig> {
        match self {
            Self::GenerationConfig(config) => Some(config),
            _ => None,
        }
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for NodeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for NodeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<ImageTensor> for NodeValue {
    fn from(value: ImageTensor) -> Self {
        Self::Image(value)
    }
}

impl From<VertexConfig> for NodeValue {
    fn from(value: VertexConfig) -> Self {
        Self::VertexConfig(value)
    }
}

impl From<GenerationConfig> for NodeValue {
    fn from(value: GenerationConfig) -> Self {
        Self::GenerationConfig(value)
    }
}

/// Socket and widget types, named the way the host names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Float,
    Int,
    Image,
    VertexConfig,
    GenerationConfig,
}

impl ValueType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Float => "FLOAT",
            Self::Int => "INT",
            Self::Image => "IMAGE",
            Self::VertexConfig => "VERTEX_CONFIG",
            Self::GenerationConfig => "GENERATION_CONFIG",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an input accepts, with widget hints.
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    String { multiline: bool },
    Float { min: f64, max: f64, step: f64 },
    Int { min: i64, max: i64 },
    /// One of a fixed list of strings, rendered as a dropdown.
    Choice(Vec<String>),
    Image,
    VertexConfig,
    GenerationConfig,
}

impl InputKind {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String { .. } | Self::Choice(_) => ValueType::String,
            Self::Float { .. } => ValueType::Float,
            Self::Int { .. } => ValueType::Int,
            Self::Image => ValueType::Image,
            Self::VertexConfig => ValueType::VertexConfig,
            Self::GenerationConfig => ValueType::GenerationConfig,
        }
    }

    pub fn choice<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choice(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: InputKind,
    pub required: bool,
    pub default: Option<NodeValue>,
    pub placeholder: Option<&'static str>,
}

impl InputSpec {
    #[must_use]
    pub fn required(name: &'static str, kind: InputKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            placeholder: None,
        }
    }

    #[must_use]
    pub fn optional(name: &'static str, kind: InputKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<NodeValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Coerce and range-check a supplied value. Integers are accepted for
    /// float inputs.
    #[allow(clippy::cast_precision_loss)]
    fn check(&self, value: NodeValue) -> NodeResult<NodeValue> {
        let value = match (&self.kind, value) {
            (InputKind::Float { .. }, NodeValue::Int(int)) => NodeValue::Float(int as f64),
            (_, value) => value,
        };

        let expected = self.kind.value_type();
        if value.value_type() != expected {
            return Err(NodeError::InputType {
                name: self.name.to_string(),
                expected,
                actual: value.value_type(),
            });
        }

        match (&self.kind, &value) {
            (InputKind::Float { min, max, .. }, NodeValue::Float(float))
                if !(*min..=*max).contains(float) =>
            {
                Err(NodeError::invalid(
                    self.name,
                    format!("{float} is outside [{min}, {max}]"),
                ))
            }
            (InputKind::Int { min, max }, NodeValue::Int(int)) if !(*min..=*max).contains(int) => {
                Err(NodeError::invalid(
                    self.name,
                    format!("{int} is outside [{min}, {max}]"),
                ))
            }
            (InputKind::Choice(choices), NodeValue::String(choice))
                if !choices.iter().any(|c| c == choice) =>
            {
                Err(NodeError::invalid(
                    self.name,
                    format!("{choice:?} is not one of {choices:?}"),
                ))
            }
            _ => Ok(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub name: &'static str,
    pub value_type: ValueType,
}

impl OutputSpec {
    #[must_use]
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        Self { name, value_type }
    }
}

/// Inputs of one invocation, checked against the node's input specs.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, NodeValue>,
}

impl NodeInputs {
    /// Check `provided` against `specs`: fill defaults, reject missing
    /// required inputs, wrong types, out-of-range numbers and unknown
    /// choices. Values without a spec are dropped.
    pub fn resolve(specs: &[InputSpec], mut provided: HashMap<String, NodeValue>) -> NodeResult<Self> {
        let mut values = HashMap::with_capacity(specs.len());
        for spec in specs {
            let value = match provided.remove(spec.name).or_else(|| spec.default.clone()) {
                Some(value) => value,
                None if spec.required => return Err(NodeError::MissingInput(spec.name.to_string())),
                None => continue,
            };
            values.insert(spec.name.to_string(), spec.check(value)?);
        }
        for name in provided.keys() {
            tracing::debug!(input = name.as_str(), "ignoring undeclared input");
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values.get(name)
    }

    fn typed<'a, T: ?Sized>(
        &'a self,
        name: &str,
        expected: ValueType,
        extract: impl FnOnce(&'a NodeValue) -> Option<&'a T>,
    ) -> NodeResult<Option<&'a T>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| NodeError::InputType {
                name: name.to_string(),
                expected,
                actual: value.value_type(),
            }),
        }
    }

    pub fn optional_string(&self, name: &str) -> NodeResult<Option<&str>> {
        self.typed(name, ValueType::String, NodeValue::as_str)
    }

    pub fn string(&self, name: &str) -> NodeResult<&str> {
        self.optional_string(name)?
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    /// A string input trimmed, or `None` when absent or blank.
    pub fn non_blank_string(&self, name: &str) -> NodeResult<Option<&str>> {
        Ok(self
            .optional_string(name)?
            .map(str::trim)
            .filter(|value| !value.is_empty()))
    }

    pub fn float(&self, name: &str) -> NodeResult<f64> {
        match self.values.get(name) {
            Some(NodeValue::Float(value)) => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            Some(NodeValue::Int(value)) => Ok(*value as f64),
            Some(value) => Err(NodeError::InputType {
                name: name.to_string(),
                expected: ValueType::Float,
                actual: value.value_type(),
            }),
            None => Err(NodeError::MissingInput(name.to_string())),
        }
    }

    pub fn int(&self, name: &str) -> NodeResult<i64> {
        match self.values.get(name) {
            Some(NodeValue::Int(value)) => Ok(*value),
            Some(value) => Err(NodeError::InputType {
                name: name.to_string(),
                expected: ValueType::Int,
                actual: value.value_type(),
            }),
            None => Err(NodeError::MissingInput(name.to_string())),
        }
    }

    pub fn image(&self, name: &str) -> NodeResult<Option<&ImageTensor>> {
        self.typed(name, ValueType::Image, NodeValue::as_image)
    }

    pub fn optional_vertex_config(&self, name: &str) -> NodeResult<Option<&VertexConfig>> {
        self.typed(name, ValueType::VertexConfig, NodeValue::as_vertex_config)
    }

    pub fn vertex_config(&self, name: &str) -> NodeResult<&VertexConfig> {
        self.optional_vertex_config(name)?
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    pub fn generation_config(&self, name: &str) -> NodeResult<Option<&GenerationConfig>> {
        self.typed(
            name,
            ValueType::GenerationConfig,
            NodeValue::as_generation_config,
        )
    }
}

/// Result of one invocation: output values in declared order, plus widget
/// updates for the host UI keyed by input name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeOutput {
    pub values: Vec<NodeValue>,
    pub ui: BTreeMap<String, Vec<String>>,
}

impl NodeOutput {
    #[must_use]
    pub fn new(values: Vec<NodeValue>) -> Self {
        Self {
            values,
            ui: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_ui(mut self, widget: &str, values: Vec<String>) -> Self {
        self.ui.insert(widget.to_string(), values);
        self
    }
}
