//! Graph module: correct-by-construction pipelines.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use crate::block::{Block, DynBlock};
use crate::invariant_ppt::{assert_invariant, GRAPH_LEGALITY, GRAPH_REJECTS_INVALID};
use crate::port::{ItemType, PortSpec};
use thiserror::Error;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of an input port within its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub usize);

/// An edge: "read `from_node`'s output as `to_node`'s input `to_port`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// The producing node.
    pub from_node: NodeId,
    /// The consuming node.
    pub to_node: NodeId,
    /// The consumer's input port.
    pub to_port: PortId,
}

/// A node in the graph.
pub struct NodeData {
    /// The unique ID of this node.
    pub id: NodeId,
    /// Instance name, used in logs and errors.
    pub name: String,
    /// The input ports of this node, in index order.
    pub inputs: Vec<PortSpec>,
    /// The output port, `None` for sinks.
    pub output: Option<PortSpec>,
    /// The block itself.
    pub block: Box<dyn DynBlock>,
}

impl std::fmt::Debug for NodeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeData")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.block.type_name())
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish()
    }
}

/// The pipeline graph: a DAG of blocks and edges.
#[derive(Debug, Default)]
pub struct Graph {
    /// All nodes, indexed by `NodeId`.
    pub nodes: Vec<NodeData>,
    /// All edges connecting nodes.
    pub edges: Vec<Edge>,
}

/// Errors that can occur when building the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Connected ports carry different element types.
    #[error("type mismatch: output carries {from}, input expects {to}")]
    TypeMismatch {
        /// Producer element type.
        from: &'static str,
        /// Consumer element type.
        to: &'static str,
    },
    /// Adding the edge would create a cycle.
    #[error("edge would create a cycle")]
    CycleDetected,
    /// The consumer has no such input port.
    #[error("node {node} has no input port `{port}`")]
    InvalidPort {
        /// Node instance name.
        node: String,
        /// Requested port.
        port: String,
    },
    /// The producer has no output (it is a sink).
    #[error("node {0} has no output port")]
    NoOutput(String),
    /// Node does not exist.
    #[error("node does not exist")]
    InvalidNode,
    /// Input port already has a connection.
    #[error("input port already connected")]
    PortAlreadyConnected,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a block under an instance name.
    pub fn add_node<B: Block>(&mut self, name: impl Into<String>, block: B) -> NodeId {
        self.add_boxed(name.into(), Box::new(block))
    }

    /// Add an already boxed block.
    pub fn add_boxed(&mut self, name: String, block: Box<dyn DynBlock>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let inputs = block.input_ports();
        let output = block.output_port();
        debug!(
            "graph: node {} `{}` ({}), {} input(s)",
            id.0,
            name,
            block.type_name(),
            inputs.len()
        );
        self.nodes.push(NodeData {
            id,
            name,
            inputs,
            output,
            block,
        });
        id
    }

    /// Look up an input port of `node` by name.
    pub fn port(&self, node: NodeId, name: &str) -> Result<PortId, GraphError> {
        let data = self.nodes.get(node.0).ok_or(GraphError::InvalidNode)?;
        data.inputs
            .iter()
            .position(|p| p.name == name)
            .map(PortId)
            .ok_or_else(|| GraphError::InvalidPort {
                node: data.name.clone(),
                port: name.to_string(),
            })
    }

    /// Connect `from`'s output to the input of `to` named `port`.
    pub fn connect(&mut self, from: NodeId, to: NodeId, port: &str) -> Result<(), GraphError> {
        let to_port = self.port(to, port)?;
        self.add_edge(Edge {
            from_node: from,
            to_node: to,
            to_port,
        })
    }

    /// Add an edge, validating types and acyclicity.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let from_data = self.nodes.get(edge.from_node.0).ok_or(GraphError::InvalidNode)?;
        let to_data = self.nodes.get(edge.to_node.0).ok_or(GraphError::InvalidNode)?;

        let from_item = from_data
            .output
            .map(|p| p.item)
            .ok_or_else(|| GraphError::NoOutput(from_data.name.clone()))?;

        let to_item = to_data
            .inputs
            .get(edge.to_port.0)
            .map(|p| p.item)
            .ok_or_else(|| GraphError::InvalidPort {
                node: to_data.name.clone(),
                port: format!("#{}", edge.to_port.0),
            })?;

        check_types(from_item, to_item)?;

        if self.would_create_cycle(&edge) {
            assert_invariant(
                GRAPH_REJECTS_INVALID,
                self.would_create_cycle(&edge),
                "Cycle detected, rejecting",
                Some("add_edge"),
            );
            return Err(GraphError::CycleDetected);
        }

        if self
            .edges
            .iter()
            .any(|e| e.to_node == edge.to_node && e.to_port == edge.to_port)
        {
            return Err(GraphError::PortAlreadyConnected);
        }

        debug!(
            "graph: {} -> {}.{}",
            from_data.name, to_data.name, to_data.inputs[edge.to_port.0].name
        );
        self.edges.push(edge);

        assert_invariant(
            GRAPH_LEGALITY,
            true,
            "Edge added successfully, graph remains legal",
            Some("add_edge"),
        );

        Ok(())
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn would_create_cycle(&self, edge: &Edge) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        self.dfs(edge.to_node, edge.from_node, &mut visited)
    }

    fn dfs(&self, current: NodeId, target: NodeId, visited: &mut [bool]) -> bool {
        if current == target {
            return true;
        }
        if visited[current.0] {
            return false;
        }
        visited[current.0] = true;
        for edge in &self.edges {
            if edge.from_node == current && self.dfs(edge.to_node, target, visited) {
                return true;
            }
        }
        false
    }
}

fn check_types(from: ItemType, to: ItemType) -> Result<(), GraphError> {
    if from == to {
        Ok(())
    } else {
        Err(GraphError::TypeMismatch {
            from: from.name(),
            to: to.name(),
        })
    }
}
