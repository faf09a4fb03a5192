mod errors;
mod models;
mod node;
pub mod nodes;
mod opentelemetry;
mod registry;
mod value;

pub use errors::{NodeError, NodeResult};
pub use models::{ModelCache, DEFAULT_MODELS};
pub use node::{Node, NodeContext, NodeContextOptions};
pub use registry::NodeRegistry;
pub use value::{InputKind, InputSpec, NodeInputs, NodeOutput, NodeValue, OutputSpec, ValueType};
