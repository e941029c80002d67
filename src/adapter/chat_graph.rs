use std::sync::Arc;

use crate::agent::AgentNode;
use crate::error::Result;
use crate::graph::{Route, StateGraph, DEFAULT_MAX_ITERATIONS, END, START};
use crate::routing::RoutingEdge;
use crate::state::Schema;

/// Anything that can describe the graph a prompt runs through.
pub trait PromptGraph: Send + Sync {
    fn build_graph(&self) -> Result<StateGraph>;
}

/// The agent loop: `START -> agent`, then `agent -> agent` while the routing
/// edge says `next`, `agent -> END` on `exit`.
#[derive(Debug, Clone)]
pub struct ChatGraph {
    agent: Arc<AgentNode>,
    routing: Arc<RoutingEdge>,
    max_iterations: usize,
}

impl ChatGraph {
    pub const AGENT: &'static str = "agent";

    pub fn new(agent: AgentNode, routing: RoutingEdge) -> Self {
        Self {
            agent: Arc::new(agent),
            routing: Arc::new(routing),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl PromptGraph for ChatGraph {
    fn build_graph(&self) -> Result<StateGraph> {
        let graph = StateGraph::new(Schema::chat())
            .add_node(Self::AGENT, self.agent.clone())?
            .add_edge(START, Self::AGENT)?
            .add_conditional_edges(
                Self::AGENT,
                self.routing.clone(),
                [(Route::Next, Self::AGENT), (Route::Exit, END)],
            )?
            .with_max_iterations(self.max_iterations);
        Ok(graph)
    }
}
