use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::state::Schema;

use super::compiled::{CompiledGraph, GraphInner, Target, Transition};
use super::edge::{Edge, Route};
use super::node::Node;

/// Virtual entry point; the target of its single edge runs first.
pub const START: &str = "__start__";
/// Virtual terminal; routing here ends the run.
pub const END: &str = "__end__";

/// Node executions allowed per run unless overridden.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

struct ConditionalEdges {
    edge: Arc<dyn Edge>,
    targets: HashMap<Route, String>,
}

/// Graph definition under construction.
///
/// Node identifiers are checked as they are added; edge targets are checked
/// by [`StateGraph::compile`], once every node is known.
pub struct StateGraph {
    schema: Arc<Schema>,
    nodes: Vec<(String, Arc<dyn Node>)>,
    edges: Vec<(String, String)>,
    conditional: Vec<(String, ConditionalEdges)>,
    max_iterations: usize,
}

impl StateGraph {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
            nodes: Vec::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn add_node(mut self, id: impl Into<String>, node: Arc<dyn Node>) -> Result<Self> {
        let id = id.into();
        if id == START || id == END {
            return Err(GraphError::Construction(format!(
                "node id '{id}' is reserved"
            )));
        }
        if id.trim().is_empty() {
            return Err(GraphError::Construction("node id must not be blank".into()));
        }
        if self.nodes.iter().any(|(existing, _)| *existing == id) {
            return Err(GraphError::Construction(format!(
                "duplicate node id '{id}'"
            )));
        }
        self.nodes.push((id, node));
        Ok(self)
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Result<Self> {
        let from = from.into();
        if from == END {
            return Err(GraphError::Construction("edge cannot leave END".into()));
        }
        if self.has_outgoing(&from) {
            return Err(GraphError::Construction(format!(
                "'{from}' already has an outgoing edge"
            )));
        }
        self.edges.push((from, to.into()));
        Ok(self)
    }

    pub fn add_conditional_edges<T>(
        mut self,
        from: impl Into<String>,
        edge: Arc<dyn Edge>,
        targets: impl IntoIterator<Item = (Route, T)>,
    ) -> Result<Self>
    where
        T: Into<String>,
    {
        let from = from.into();
        if from == START || from == END {
            return Err(GraphError::Construction(format!(
                "conditional edges cannot leave '{from}'"
            )));
        }
        if self.has_outgoing(&from) {
            return Err(GraphError::Construction(format!(
                "'{from}' already has an outgoing edge"
            )));
        }
        let targets: HashMap<Route, String> = targets
            .into_iter()
            .map(|(route, target)| (route, target.into()))
            .collect();
        self.conditional
            .push((from, ConditionalEdges { edge, targets }));
        Ok(self)
    }

    /// Cap on node executions per run; the run fails once it is exceeded.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn has_outgoing(&self, from: &str) -> bool {
        self.edges.iter().any(|(source, _)| source == from)
            || self.conditional.iter().any(|(source, _)| source == from)
    }

    fn resolve(&self, owner: &str, target: &str) -> Result<Target> {
        if target == END {
            return Ok(Target::End);
        }
        if self.nodes.iter().any(|(id, _)| id == target) {
            return Ok(Target::Node(target.to_string()));
        }
        Err(GraphError::Construction(format!(
            "edge from '{owner}' points at unknown node '{target}'"
        )))
    }

    /// Validate the definition and freeze it.
    pub fn compile(self) -> Result<CompiledGraph> {
        if self.max_iterations == 0 {
            return Err(GraphError::Construction(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.nodes.is_empty() {
            return Err(GraphError::Construction("graph has no nodes".into()));
        }

        let mut entry = None;
        let mut transitions = HashMap::new();
        for (from, to) in &self.edges {
            let target = self.resolve(from, to)?;
            if from == START {
                match target {
                    Target::Node(id) => entry = Some(id),
                    Target::End => {
                        return Err(GraphError::Construction(
                            "START cannot route directly to END".into(),
                        ))
                    }
                }
                continue;
            }
            self.resolve(START, from).map_err(|_| {
                GraphError::Construction(format!("edge leaves unknown node '{from}'"))
            })?;
            transitions.insert(from.clone(), Transition::Direct(target));
        }

        for (from, conditional) in &self.conditional {
            self.resolve(START, from).map_err(|_| {
                GraphError::Construction(format!("conditional edges leave unknown node '{from}'"))
            })?;
            let mut targets = HashMap::new();
            for route in Route::ALL {
                let target = conditional.targets.get(&route).ok_or_else(|| {
                    GraphError::Construction(format!(
                        "conditional edges from '{from}' do not map route '{route}'"
                    ))
                })?;
                targets.insert(route, self.resolve(from, target)?);
            }
            transitions.insert(
                from.clone(),
                Transition::Conditional {
                    edge: Arc::clone(&conditional.edge),
                    targets,
                },
            );
        }

        let entry = entry.ok_or_else(|| {
            GraphError::Construction("graph has no edge from START".into())
        })?;

        for (id, node) in &self.nodes {
            if !transitions.contains_key(id) {
                return Err(GraphError::Construction(format!(
                    "node '{id}' has no outgoing edge"
                )));
            }
            self.schema
                .ensure_registered(&node.writes(), &format!("node '{id}'"))?;
        }

        tracing::debug!(
            entry = %entry,
            nodes = self.nodes.len(),
            max_iterations = self.max_iterations,
            "graph compiled"
        );

        Ok(CompiledGraph::new(GraphInner {
            schema: self.schema,
            nodes: self.nodes.into_iter().collect(),
            entry,
            transitions,
            max_iterations: self.max_iterations,
        }))
    }
}
