use num_complex::Complex32;
use sdrchain::blocks::{ConstantSource, Multiply, Repeat, StreamSink, ToComplex, VectorSource};
use sdrchain::graph::{Edge, Graph, GraphError, NodeId, PortId};
use sdrchain::invariant_ppt::{contract_test, GRAPH_REJECTS_INVALID};
use sdrchain::plan::{Plan, PlanError};
use sdrchain::rt::{RunLimit, Runtime};

#[test]
fn no_cycles() {
    let mut graph = Graph::new();
    let a = graph.add_node("a", Repeat::<f32>::new(2).unwrap());
    let b = graph.add_node("b", Repeat::<f32>::new(2).unwrap());
    graph.connect(a, b, "in").unwrap();
    assert_eq!(graph.connect(b, a, "in"), Err(GraphError::CycleDetected));
    contract_test("graph rejects cycles", &[GRAPH_REJECTS_INVALID]);
}

#[test]
fn input_ports_must_be_connected() {
    let mut graph = Graph::new();
    let tc = graph.add_node("tc", ToComplex::<f32>::new());
    assert!(matches!(
        Plan::compile(&graph),
        Err(PlanError::UnconnectedInput { port: "real", .. })
    ));

    let re = graph.add_node("re", ConstantSource::new(1.0f32));
    let im = graph.add_node("im", ConstantSource::new(2.0f32));
    graph.connect(re, tc, "real").unwrap();
    assert!(matches!(
        Plan::compile(&graph),
        Err(PlanError::UnconnectedInput { port: "imag", .. })
    ));
    graph.connect(im, tc, "imag").unwrap();
    assert!(Plan::compile(&graph).is_ok());
}

#[test]
fn output_ports_fan_out() {
    let mut graph = Graph::new();
    let x = graph.add_node("x", VectorSource::new(vec![1.0f32, 2.0, 3.0], false));
    let square = graph.add_node("square", Multiply::<f32>::new());
    let sink = graph.add_node("sink", StreamSink::<f32, Vec<u8>>::new(Vec::new()));
    graph.connect(x, square, "left").unwrap();
    graph.connect(x, square, "right").unwrap();
    graph.connect(square, sink, "in").unwrap();

    let mut rt = Runtime::new(graph).unwrap();
    rt.run(RunLimit::until_exhausted()).unwrap();
    let bytes = rt.block::<StreamSink<f32, Vec<u8>>>(sink).unwrap().get_ref();
    let out: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(out, vec![1.0, 4.0, 9.0]);
}

#[test]
fn element_types_must_match() {
    let mut graph = Graph::new();
    let real = graph.add_node("real", ConstantSource::new(1.0f32));
    let wide = graph.add_node("wide", ConstantSource::new(1.0f64));
    let sink = graph.add_node("sink", StreamSink::<Complex32, Vec<u8>>::new(Vec::new()));
    let tc = graph.add_node("tc", ToComplex::<f32>::new());

    assert!(matches!(graph.connect(real, sink, "in"), Err(GraphError::TypeMismatch { .. })));
    assert!(matches!(graph.connect(wide, tc, "imag"), Err(GraphError::TypeMismatch { .. })));
    graph.connect(tc, sink, "in").unwrap();
}

#[test]
fn raw_edges_are_validated() {
    let mut graph = Graph::new();
    let a = graph.add_node("a", ConstantSource::new(1.0f32));
    let b = graph.add_node("b", Repeat::<f32>::new(1).unwrap());
    assert!(matches!(
        graph.add_edge(Edge {
            from_node: a,
            to_node: b,
            to_port: PortId(3),
        }),
        Err(GraphError::InvalidPort { .. })
    ));
    assert_eq!(
        graph.add_edge(Edge {
            from_node: NodeId(42),
            to_node: b,
            to_port: PortId(0),
        }),
        Err(GraphError::InvalidNode)
    );
    assert!(graph.edges.is_empty());
}
