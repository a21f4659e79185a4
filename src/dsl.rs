//! DSL module: builder API for pipelines with named nodes.

use crate::block::Block;
use crate::graph::{Graph, GraphError, NodeId};
use std::collections::HashMap;
use thiserror::Error;

/// Handle to a node in the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub NodeId);

/// The graph builder.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    node_names: HashMap<String, NodeId>,
}

/// DSL-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    /// The underlying graph rejected the operation.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A node with this name already exists.
    #[error("duplicate node name `{0}`")]
    DuplicateName(String),
    /// No node has this name.
    #[error("no node named `{0}`")]
    UnknownName(String),
}

impl GraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block under a unique instance name.
    pub fn node<B: Block>(&mut self, name: &str, block: B) -> Result<NodeHandle, DslError> {
        if self.node_names.contains_key(name) {
            return Err(DslError::DuplicateName(name.to_string()));
        }
        let id = self.graph.add_node(name, block);
        self.node_names.insert(name.to_string(), id);
        Ok(NodeHandle(id))
    }

    /// Handle of a previously added node.
    pub fn handle(&self, name: &str) -> Result<NodeHandle, DslError> {
        self.node_names
            .get(name)
            .copied()
            .map(NodeHandle)
            .ok_or_else(|| DslError::UnknownName(name.to_string()))
    }

    /// Connect `from`'s output to the input of `to` named `port`.
    pub fn connect(
        &mut self,
        from: NodeHandle,
        to: NodeHandle,
        port: &str,
    ) -> Result<(), DslError> {
        self.graph.connect(from.0, to.0, port)?;
        Ok(())
    }

    /// Connect by node names, `"producer"` to `"consumer"`'s `port`.
    pub fn connect_named(&mut self, from: &str, to: &str, port: &str) -> Result<(), DslError> {
        let from = self.handle(from)?;
        let to = self.handle(to)?;
        self.connect(from, to, port)
    }

    /// Build the graph.
    pub fn build(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{ConstantSource, Multiply, StreamSink};

    #[test]
    fn dsl_equivalence() {
        let mut builder = GraphBuilder::new();
        let a = builder.node("a", ConstantSource::new(1.0f32)).unwrap();
        let b = builder.node("b", ConstantSource::new(2.0f32)).unwrap();
        let mul = builder.node("mul", Multiply::<f32>::new()).unwrap();
        builder.connect(a, mul, "left").unwrap();
        builder.connect_named("b", "mul", "right").unwrap();
        let dsl_graph = builder.build();

        let mut manual_graph = Graph::new();
        let ma = manual_graph.add_node("a", ConstantSource::new(1.0f32));
        let mb = manual_graph.add_node("b", ConstantSource::new(2.0f32));
        let mmul = manual_graph.add_node("mul", Multiply::<f32>::new());
        manual_graph.connect(ma, mmul, "left").unwrap();
        manual_graph.connect(mb, mmul, "right").unwrap();

        assert_eq!(b.0, mb);
        assert_eq!(dsl_graph.nodes.len(), manual_graph.nodes.len());
        assert_eq!(dsl_graph.edges, manual_graph.edges);
    }

    #[test]
    fn ui_tests() {
        let mut builder = GraphBuilder::new();
        let sink = builder
            .node("sink", StreamSink::<f32, Vec<u8>>::new(Vec::new()))
            .unwrap();
        let src = builder.node("src", ConstantSource::new(1.0f64)).unwrap();

        assert_eq!(
            builder.node("src", ConstantSource::new(0.0f64)).unwrap_err(),
            DslError::DuplicateName("src".to_string())
        );
        assert_eq!(
            builder.handle("nope").unwrap_err(),
            DslError::UnknownName("nope".to_string())
        );
        assert!(matches!(
            builder.connect(src, sink, "in"),
            Err(DslError::Graph(GraphError::TypeMismatch { .. }))
        ));
    }
}
