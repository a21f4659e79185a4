//! Plan module: compile a graph into a static execution order.

use crate::graph::{Graph, NodeId, PortId};
use crate::invariant_ppt::{assert_invariant, INPUTS_BOUND, PLAN_SOUNDNESS};
use std::collections::VecDeque;
use thiserror::Error;

/// A connection as seen from one end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    /// The node at the other end.
    pub node: NodeId,
    /// The consumer's input port.
    pub port: PortId,
}

/// The compiled plan: topological order and per-node adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Nodes in the order they are processed each tick.
    pub order: Vec<NodeId>,
    /// For each node, the producers feeding it, one per input port.
    pub node_inputs: Vec<Vec<Link>>,
    /// For each node, the consumers reading its output.
    pub node_outputs: Vec<Vec<Link>>,
}

/// Errors during plan compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The graph is not acyclic.
    #[error("graph contains a cycle")]
    CycleDetected,
    /// An input port has no producer.
    #[error("input `{port}` of node `{node}` is not connected")]
    UnconnectedInput {
        /// Node instance name.
        node: String,
        /// Port name.
        port: &'static str,
    },
    /// The graph has no blocks, so a tick could never advance anything.
    #[error("graph has no nodes")]
    EmptyGraph,
}

impl Plan {
    /// Create a plan from a graph.
    pub fn compile(graph: &Graph) -> Result<Self, PlanError> {
        let n = graph.nodes.len();
        let mut node_inputs: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut node_outputs: Vec<Vec<Link>> = vec![Vec::new(); n];

        for edge in &graph.edges {
            node_inputs[edge.to_node.0].push(Link {
                node: edge.from_node,
                port: edge.to_port,
            });
            node_outputs[edge.from_node.0].push(Link {
                node: edge.to_node,
                port: edge.to_port,
            });
        }

        // Every input port needs exactly one producer.
        for node in &graph.nodes {
            let inputs = &mut node_inputs[node.id.0];
            inputs.sort_by_key(|l| l.port);
            for (i, spec) in node.inputs.iter().enumerate() {
                if !inputs.iter().any(|l| l.port == PortId(i)) {
                    return Err(PlanError::UnconnectedInput {
                        node: node.name.clone(),
                        port: spec.name,
                    });
                }
            }
        }
        assert_invariant(INPUTS_BOUND, true, "All inputs have a producer", Some("compile"));

        let order = topo_sort(graph)?;
        assert_invariant(
            PLAN_SOUNDNESS,
            order.len() == n,
            "Execution order covers every node once",
            Some("compile"),
        );

        debug!(
            "plan: {} nodes, {} edges, order {:?}",
            n,
            graph.edges.len(),
            order.iter().map(|id| id.0).collect::<Vec<_>>()
        );

        Ok(Self {
            order,
            node_inputs,
            node_outputs,
        })
    }

    /// Position of `node` in the execution order.
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.order.iter().position(|&n| n == node)
    }
}

/// Topological sort of nodes; ties resolved by node id, so the order is
/// deterministic.
fn topo_sort(graph: &Graph) -> Result<Vec<NodeId>, PlanError> {
    let mut in_degree = vec![0; graph.nodes.len()];
    let mut adj: Vec<Vec<NodeId>> = vec![vec![]; graph.nodes.len()];

    for edge in &graph.edges {
        adj[edge.from_node.0].push(edge.to_node);
        in_degree[edge.to_node.0] += 1;
    }

    let mut queue = VecDeque::new();
    for (i, &deg) in in_degree.iter().enumerate() {
        if deg == 0 {
            queue.push_back(NodeId(i));
        }
    }

    let mut order = Vec::new();
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &neighbor in &adj[node.0] {
            in_degree[neighbor.0] -= 1;
            if in_degree[neighbor.0] == 0 {
                queue.push_back(neighbor);
            }
        }
    }

    if order.len() == graph.nodes.len() {
        Ok(order)
    } else {
        Err(PlanError::CycleDetected)
    }
}
