use proptest::prelude::*;
use sdrchain::blocks::{ConstantSource, Multiply, StreamSink};
use sdrchain::graph::{Graph, NodeId};
use sdrchain::invariant_ppt::{contract_test, INPUTS_BOUND, PLAN_SOUNDNESS};
use sdrchain::plan::Plan;
use sdrchain::{build_transmitter, TxConfig};

#[test]
fn transmitter_order_respects_edges() {
    let tx = build_transmitter(&TxConfig::default(), Vec::new()).unwrap();
    let rt = tx.runtime();
    let nodes = tx.nodes();
    let pos = |id: NodeId| rt.plan.position(id).unwrap();

    assert!(pos(nodes.data) < pos(nodes.repeat));
    assert!(pos(nodes.repeat) < pos(nodes.to_complex));
    assert!(pos(nodes.zero) < pos(nodes.to_complex));
    assert!(pos(nodes.carrier) < pos(nodes.throttle));
    assert!(pos(nodes.to_complex) < pos(nodes.multiply));
    assert!(pos(nodes.throttle) < pos(nodes.multiply));
    assert_eq!(pos(nodes.sink), 7);
    contract_test("plan topology", &[INPUTS_BOUND, PLAN_SOUNDNESS]);
}

// Random DAG of multiplies: node i reads two earlier nodes.
fn random_dag(picks: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new();
    let mut ids = vec![graph.add_node("c0", ConstantSource::new(1.0f64))];
    for (i, &(l, r)) in picks.iter().enumerate() {
        let id = graph.add_node(format!("m{i}"), Multiply::<f64>::new());
        graph.connect(ids[l % ids.len()], id, "left").unwrap();
        graph.connect(ids[r % ids.len()], id, "right").unwrap();
        ids.push(id);
    }
    let sink = graph.add_node("sink", StreamSink::<f64, Vec<u8>>::new(Vec::new()));
    graph.connect(ids[ids.len() - 1], sink, "in").unwrap();
    graph
}

proptest! {
    #[test]
    fn producers_always_precede_consumers(
        picks in prop::collection::vec((0..64usize, 0..64usize), 0..16)
    ) {
        let graph = random_dag(&picks);
        let plan = Plan::compile(&graph).unwrap();
        prop_assert_eq!(plan.order.len(), graph.nodes.len());
        for edge in &graph.edges {
            prop_assert!(plan.position(edge.from_node) < plan.position(edge.to_node));
        }
    }
}
