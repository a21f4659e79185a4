use proptest::prelude::*;
use sdrchain::blocks::{Repeat, StreamSink, VectorSource};
use sdrchain::graph::Graph;
use sdrchain::rt::{RunLimit, Runtime, StopReason};

proptest! {
    #[test]
    fn chains_run_to_exhaustion(
        data in prop::collection::vec(-1.0f32..1.0, 0..20),
        counts in prop::collection::vec(1..5usize, 0..4),
    ) {
        let mut graph = Graph::new();
        let src = graph.add_node("src", VectorSource::new(data.clone(), false));
        let mut prev = src;
        for (i, &n) in counts.iter().enumerate() {
            let rep = graph.add_node(format!("rep{i}"), Repeat::<f32>::new(n).unwrap());
            graph.connect(prev, rep, "in").unwrap();
            prev = rep;
        }
        let sink = graph.add_node("sink", StreamSink::<f32, Vec<u8>>::new(Vec::new()));
        graph.connect(prev, sink, "in").unwrap();

        let mut rt = Runtime::new(graph).unwrap();
        let report = rt.run(RunLimit::until_exhausted().with_max_ticks(10_000)).unwrap();

        let expected = data.len() as u64 * counts.iter().product::<usize>() as u64;
        prop_assert_eq!(report.stop, StopReason::SourceExhausted { node: src });
        prop_assert_eq!(report.ticks, expected);
        let written = rt.block::<StreamSink<f32, Vec<u8>>>(sink).unwrap().samples_written();
        prop_assert_eq!(written, expected);
    }
}
