use crate::{
    nodes::{
        GenerationConfigNode, ImageGeneratorNode, LoadConfigNode, SaveConfigNode, TextGeneratorNode,
        VertexAuthNode,
    },
    opentelemetry::trace_execute,
    Node, NodeContext, NodeError, NodeInputs, NodeOutput, NodeResult, NodeValue,
};
use std::collections::HashMap;

type NodeFactory = fn() -> Box<dyn Node>;

fn boxed<N: Node + Default + 'static>() -> Box<dyn Node> {
    Box::new(N::default())
}

/// Every node the plugin exposes, in registration order.
const NODE_FACTORIES: [NodeFactory; 6] = [
    boxed::<VertexAuthNode>,
    boxed::<ImageGeneratorNode>,
    boxed::<TextGeneratorNode>,
    boxed::<GenerationConfigNode>,
    boxed::<SaveConfigNode>,
    boxed::<LoadConfigNode>,
];

/// Holds all available nodes and dispatches invocations by node name.
#[derive(Debug)]
pub struct NodeRegistry {
    nodes: Vec<Box<dyn Node>>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: NODE_FACTORIES.iter().map(|factory| factory()).collect(),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &dyn Node> {
        self.nodes.iter().map(|node| node.as_ref())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Node> {
        self.nodes().find(|node| node.name() == name)
    }

    /// `(name, display name)` of every node.
    #[must_use]
    pub fn display_names(&self) -> Vec<(&'static str, &'static str)> {
        self.nodes()
            .map(|node| (node.name(), node.display_name()))
            .collect()
    }

    /// Check `inputs` against the node's declared inputs and run it.
    pub async fn execute(
        &self,
        name: &str,
        inputs: HashMap<String, NodeValue>,
        context: &NodeContext,
    ) -> NodeResult<NodeOutput> {
        let node = self
            .get(name)
            .ok_or_else(|| NodeError::UnknownNode(name.to_string()))?;

        trace_execute(node.name(), node.category(), async {
            let specs = node.input_specs(context).await?;
            let inputs = NodeInputs::resolve(&specs, inputs)?;
            node.execute(&inputs, context).await
        })
        .await
    }
}
