//! RT module: the driving loop.
//!
//! One tick advances the pipeline by one logical sample. Each tick runs a
//! demand pass in reverse topological order, then a forward pass that calls
//! `process` on every demanded block and binds its output to the consumers
//! that asked for input.

// Invariants are only asserted at run boundaries, never per tick.

use crate::block::{Block, DynBlock};
use crate::error::Error;
use crate::graph::{Graph, NodeId};
use crate::invariant_ppt::{assert_invariant, RUN_STOPPED_CLEANLY};
use crate::plan::{Plan, PlanError};
use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// When a run stops, short of a block failure or source exhaustion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimit {
    deadline: Option<Duration>,
    max_ticks: Option<u64>,
}

impl RunLimit {
    /// Stop once `duration` of wall-clock time has passed.
    pub fn for_duration(duration: Duration) -> Self {
        Self {
            deadline: Some(duration),
            max_ticks: None,
        }
    }

    /// Stop after `n` ticks.
    pub fn ticks(n: u64) -> Self {
        Self {
            deadline: None,
            max_ticks: Some(n),
        }
    }

    /// Run until a source exhausts.
    pub fn until_exhausted() -> Self {
        Self::default()
    }

    /// Also stop after `n` ticks.
    pub fn with_max_ticks(mut self, n: u64) -> Self {
        self.max_ticks = Some(n);
        self
    }

    /// Also stop once `duration` has passed.
    pub fn with_deadline(mut self, duration: Duration) -> Self {
        self.deadline = Some(duration);
        self
    }

    /// Wall-clock budget, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Tick budget, if any.
    pub fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    fn reached(&self, elapsed: Duration, ticks: u64) -> bool {
        self.deadline.map_or(false, |d| elapsed >= d)
            || self.max_ticks.map_or(false, |n| ticks >= n)
    }
}

/// Why a run stopped. Both reasons are a normal shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The wall-clock or tick budget was used up.
    TimeBudget,
    /// A source the pipeline still needed will never produce again.
    SourceExhausted {
        /// The exhausted node.
        node: NodeId,
    },
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Ticks executed during this run.
    pub ticks: u64,
    /// Wall-clock time spent in the run.
    pub elapsed: Duration,
    /// Why the run stopped.
    pub stop: StopReason,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Blocks advanced by one sample.
    Advanced,
    /// A demanded source is exhausted; the pipeline cannot advance further.
    Exhausted(NodeId),
}

/// The runtime engine.
pub struct Runtime {
    /// The compiled plan.
    pub plan: Plan,
    blocks: Vec<Box<dyn DynBlock>>,
    names: Vec<String>,
    demanded: Vec<bool>,
    wants_input: Vec<bool>,
    produced: Vec<bool>,
    ticks: u64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("plan", &self.plan)
            .field("nodes", &self.names)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Runtime {
    /// Compile `graph` and take ownership of its blocks.
    ///
    /// An empty graph is rejected: no tick could advance it, so no run limit
    /// counted in ticks would ever be reached.
    pub fn new(graph: Graph) -> Result<Self, PlanError> {
        if graph.nodes.is_empty() {
            return Err(PlanError::EmptyGraph);
        }
        let plan = Plan::compile(&graph)?;
        let n = graph.nodes.len();
        let (names, blocks) = graph
            .nodes
            .into_iter()
            .map(|node| (node.name, node.block))
            .unzip();
        Ok(Self {
            plan,
            blocks,
            names,
            demanded: vec![false; n],
            wants_input: vec![false; n],
            produced: vec![false; n],
            ticks: 0,
        })
    }

    /// Ticks executed since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Instance name of a node.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Node by instance name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.iter().position(|n| n == name).map(NodeId)
    }

    /// Typed access to a block, `None` if `id` is not a `B`.
    pub fn block<B: Block>(&self, id: NodeId) -> Option<&B> {
        self.blocks.get(id.0)?.as_any().downcast_ref::<B>()
    }

    /// Typed mutable access to a block, for reconfiguration between runs.
    pub fn block_mut<B: Block>(&mut self, id: NodeId) -> Option<&mut B> {
        self.blocks.get_mut(id.0)?.as_any_mut().downcast_mut::<B>()
    }

    /// Advance the pipeline by one sample.
    pub fn tick(&mut self) -> Result<Tick, Error> {
        self.mark_demand();

        // Stop before anything moves, so no block is left half advanced.
        for &id in &self.plan.order {
            if self.demanded[id.0] && self.blocks[id.0].is_exhausted() {
                return Ok(Tick::Exhausted(id));
            }
        }

        let mut exhausted = None;
        let mut advanced = false;
        for &id in &self.plan.order {
            let i = id.0;
            self.produced[i] = false;
            if !self.demanded[i] {
                continue;
            }
            if self.wants_input[i]
                && self.plan.node_inputs[i].iter().any(|l| !self.produced[l.node.0])
            {
                trace!("tick {}: `{}` starved", self.ticks, self.names[i]);
                continue;
            }

            let (before, rest) = self.blocks.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else {
                continue;
            };
            let output = current.process_dyn().map_err(|source| Error::Block {
                node: self.names[i].clone(),
                source,
            })?;
            advanced = true;

            match output {
                Some(value) => {
                    self.produced[i] = true;
                    for link in &self.plan.node_outputs[i] {
                        let j = link.node.0;
                        if !self.wants_input[j] {
                            continue;
                        }
                        let consumer = match j.cmp(&i) {
                            Ordering::Less => before.get_mut(j),
                            Ordering::Greater => after.get_mut(j - i - 1),
                            Ordering::Equal => None,
                        };
                        let Some(port) = consumer.and_then(|c| c.input_mut(link.port.0)) else {
                            continue;
                        };
                        port.bind_any(value).map_err(|source| Error::Block {
                            node: self.names[j].clone(),
                            source,
                        })?;
                    }
                }
                None => {
                    if current.is_exhausted() && exhausted.is_none() {
                        exhausted = Some(id);
                    }
                }
            }
        }

        if advanced {
            self.ticks += 1;
        }
        Ok(match exhausted {
            Some(id) => Tick::Exhausted(id),
            None => Tick::Advanced,
        })
    }

    /// Tick until `limit` is reached or a source exhausts, then flush every
    /// block.
    pub fn run(&mut self, limit: RunLimit) -> Result<RunReport, Error> {
        info!(
            "run: {} nodes, deadline {:?}, max ticks {:?}",
            self.blocks.len(),
            limit.deadline,
            limit.max_ticks
        );
        let start = Instant::now();
        let first_tick = self.ticks;

        let stop = loop {
            if limit.reached(start.elapsed(), self.ticks - first_tick) {
                break StopReason::TimeBudget;
            }
            match self.tick() {
                Ok(Tick::Advanced) => {}
                Ok(Tick::Exhausted(node)) => {
                    debug!("run: `{}` exhausted", self.names[node.0]);
                    break StopReason::SourceExhausted { node };
                }
                Err(e) => {
                    error!("run: stopped after {} ticks: {}", self.ticks - first_tick, e);
                    return Err(e);
                }
            }
        };

        self.flush()?;

        let report = RunReport {
            ticks: self.ticks - first_tick,
            elapsed: start.elapsed(),
            stop,
        };
        assert_invariant(
            RUN_STOPPED_CLEANLY,
            match stop {
                StopReason::TimeBudget => limit.deadline.is_some() || limit.max_ticks.is_some(),
                StopReason::SourceExhausted { node } => self.blocks[node.0].is_exhausted(),
            },
            "Run stopped for a legitimate reason",
            Some("run"),
        );
        info!(
            "run: executed {} ticks in {:.3?} ({:?})",
            report.ticks, report.elapsed, report.stop
        );
        Ok(report)
    }

    /// Flush every block in execution order.
    pub fn flush(&mut self) -> Result<(), Error> {
        for &id in &self.plan.order {
            self.blocks[id.0].flush().map_err(|source| Error::Block {
                node: self.names[id.0].clone(),
                source,
            })?;
        }
        Ok(())
    }

    // A node is demanded if it is terminal or feeds a demanded consumer that
    // needs a fresh input. Consumers come later in the order, so walking it
    // backwards settles every consumer before its producers.
    fn mark_demand(&mut self) {
        for &id in self.plan.order.iter().rev() {
            let i = id.0;
            let consumers = &self.plan.node_outputs[i];
            let demanded = consumers.is_empty()
                || consumers
                    .iter()
                    .any(|l| self.demanded[l.node.0] && self.wants_input[l.node.0]);
            self.demanded[i] = demanded;
            self.wants_input[i] = demanded && !self.blocks[i].is_output_available();
        }
    }
}
