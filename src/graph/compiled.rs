use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::{GraphError, Result};
use crate::state::{ConversationState, Schema};

use super::edge::{Edge, Route};
use super::node::{Node, NodeEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Target {
    Node(String),
    End,
}

pub(super) enum Transition {
    Direct(Target),
    Conditional {
        edge: Arc<dyn Edge>,
        targets: HashMap<Route, Target>,
    },
}

pub(super) struct GraphInner {
    pub(super) schema: Arc<Schema>,
    pub(super) nodes: HashMap<String, Arc<dyn Node>>,
    pub(super) entry: String,
    pub(super) transitions: HashMap<String, Transition>,
    pub(super) max_iterations: usize,
}

impl GraphInner {
    fn next_target(&self, current: &str, state: &ConversationState) -> Result<Target> {
        match self.transitions.get(current) {
            Some(Transition::Direct(target)) => Ok(target.clone()),
            Some(Transition::Conditional { edge, targets }) => {
                let route = edge.route(state)?;
                tracing::debug!(node = %current, route = %route, "route selected");
                targets.get(&route).cloned().ok_or_else(|| {
                    GraphError::InvariantViolation(format!(
                        "route '{route}' from '{current}' has no target"
                    ))
                })
            }
            None => Err(GraphError::InvariantViolation(format!(
                "node '{current}' has no transition"
            ))),
        }
    }
}

/// Item yielded while a compiled graph runs.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOutput {
    /// Text produced by a node, in production order.
    Chunk { node: String, text: String },
    /// State after a node's update was merged.
    Snapshot {
        node: String,
        state: ConversationState,
    },
}

/// Validated, immutable graph ready to run.
#[derive(Clone)]
pub struct CompiledGraph {
    inner: Arc<GraphInner>,
}

impl CompiledGraph {
    pub(super) fn new(inner: GraphInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.inner.schema
    }

    pub fn entry(&self) -> &str {
        &self.inner.entry
    }

    pub fn max_iterations(&self) -> usize {
        self.inner.max_iterations
    }

    /// Run from the entry node, yielding chunks and snapshots in order.
    ///
    /// Each node's chunks are yielded before its update is merged; routing
    /// only happens after the node's stream has ended. The stream ends after
    /// the first error.
    pub fn stream(&self, initial: ConversationState) -> BoxStream<'static, Result<GraphOutput>> {
        let inner = Arc::clone(&self.inner);
        let stream = async_stream::stream! {
            let mut state = initial;
            let mut current = inner.entry.clone();
            let mut executions = 0usize;

            loop {
                if executions >= inner.max_iterations {
                    tracing::warn!(limit = inner.max_iterations, node = %current, "iteration limit reached");
                    yield Err(GraphError::IterationLimit { limit: inner.max_iterations });
                    return;
                }
                executions += 1;

                let node = match inner.nodes.get(&current) {
                    Some(node) => Arc::clone(node),
                    None => {
                        yield Err(GraphError::InvariantViolation(format!("unknown node '{current}'")));
                        return;
                    }
                };
                tracing::debug!(node = %current, execution = executions, "node start");

                let mut events = match node.run(&state).await {
                    Ok(events) => events,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };

                let mut update = None;
                while let Some(event) = events.next().await {
                    match event {
                        Ok(NodeEvent::Chunk(text)) => {
                            if update.is_some() {
                                yield Err(GraphError::InvariantViolation(format!(
                                    "node '{current}' produced a chunk after completing"
                                )));
                                return;
                            }
                            yield Ok(GraphOutput::Chunk { node: current.clone(), text });
                        }
                        Ok(NodeEvent::Complete(node_update)) => {
                            if update.is_some() {
                                yield Err(GraphError::InvariantViolation(format!(
                                    "node '{current}' completed twice"
                                )));
                                return;
                            }
                            update = Some(node_update);
                        }
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }

                let update = match update {
                    Some(update) => update,
                    None => {
                        yield Err(GraphError::InvariantViolation(format!(
                            "node '{current}' ended without completing"
                        )));
                        return;
                    }
                };
                if let Err(err) = state.merge(update) {
                    yield Err(err);
                    return;
                }
                yield Ok(GraphOutput::Snapshot { node: current.clone(), state: state.clone() });

                match inner.next_target(&current, &state) {
                    Ok(Target::End) => {
                        tracing::debug!(node = %current, executions, "graph finished");
                        return;
                    }
                    Ok(Target::Node(next)) => current = next,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        };
        Box::pin(stream)
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<_> = self.inner.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("CompiledGraph")
            .field("entry", &self.inner.entry)
            .field("nodes", &nodes)
            .field("max_iterations", &self.inner.max_iterations)
            .finish()
    }
}
