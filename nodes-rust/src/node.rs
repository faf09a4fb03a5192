use crate::{InputSpec, ModelCache, NodeInputs, NodeOutput, NodeResult, OutputSpec};
use async_trait::async_trait;
use std::fmt::Debug;
use vertex_sdk::{
    google::{VertexClient, VertexClientOptions},
    ConfigStore,
};

/**
 * A pipeline node. Any type implementing `Node` can be put in a
 * [`crate::NodeRegistry`] and invoked by the host.
 */
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique name the host registers the node under.
    fn name(&self) -> &'static str;
    /// Name shown in the host UI.
    fn display_name(&self) -> &'static str;
    /// Menu path, e.g. `VertexAI/Config`.
    fn category(&self) -> &'static str;
    /// Declared inputs. Async because some choice lists come from disk or
    /// the network.
    async fn input_specs(&self, context: &NodeContext) -> NodeResult<Vec<InputSpec>>;
    /// Declared outputs, in the order [`NodeOutput::values`] holds them.
    fn output_specs(&self) -> Vec<OutputSpec>;
    /// Nodes with side effects the host must run even when nothing consumes
    /// their outputs.
    fn is_output_node(&self) -> bool {
        false
    }
    /// Run the node on inputs already checked against
    /// [`Node::input_specs`].
    async fn execute(&self, inputs: &NodeInputs, context: &NodeContext)
        -> NodeResult<NodeOutput>;
}

impl Debug for dyn Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("display_name", &self.display_name())
            .field("category", &self.category())
            .field("outputs", &self.output_specs())
            .field("execute", &"Function")
            .finish()
    }
}

#[derive(Default)]
pub struct NodeContextOptions {
    pub client: Option<VertexClient>,
    pub store: Option<ConfigStore>,
    /// Defaults to [`ModelCache::shared`].
    pub model_cache: Option<ModelCache>,
    /// Whether ambient Google credentials exist. Asked of the client's
    /// credential resolver when unset.
    pub ambient_credentials: Option<bool>,
}

/// Collaborators shared by every node invocation.
pub struct NodeContext {
    client: VertexClient,
    store: ConfigStore,
    model_cache: ModelCache,
    ambient_credentials: Option<bool>,
}

impl Default for NodeContext {
    fn default() -> Self {
        Self::new(NodeContextOptions::default())
    }
}

impl NodeContext {
    #[must_use]
    pub fn new(options: NodeContextOptions) -> Self {
        let NodeContextOptions {
            client,
            store,
            model_cache,
            ambient_credentials,
        } = options;

        Self {
            client: client.unwrap_or_else(|| VertexClient::new(VertexClientOptions::default())),
            store: store.unwrap_or_default(),
            model_cache: model_cache.unwrap_or_else(ModelCache::shared),
            ambient_credentials,
        }
    }

    #[must_use]
    pub fn client(&self) -> &VertexClient {
        &self.client
    }

    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub async fn models(&self) -> &[String] {
        self.model_cache.models(&self.client).await
    }

    pub async fn ambient_credentials(&self) -> bool {
        match self.ambient_credentials {
            Some(available) => available,
            None => self.client.resolver().has_ambient_credentials().await,
        }
    }
}
